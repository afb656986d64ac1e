use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod catalog;

pub use catalog::CatalogItem;

/// Which of a user's two lists a media entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "list_kind", rename_all = "lowercase")]
pub enum ListKind {
    Watched,
    Wishlist,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Watched => "watched",
            ListKind::Wishlist => "wishlist",
        }
    }
}

/// Whether a catalog item is a movie or a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

/// Public user record, keyed by account id
///
/// Profiles are created at signup and immutable afterwards; there is no
/// rename flow, which is what lets friend edges denormalize the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub account_id: Uuid,
    pub display_name: String,
}

/// One tracked title in a user's watched or wish list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediaEntry {
    pub item_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub media_kind: MediaKind,
    pub release_date: Option<String>,
    pub runtime_minutes: i32,
    pub added_at: DateTime<Utc>,
}

/// A pending, directed friendship proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendRequest {
    pub sender_id: Uuid,
    pub sender_display_name: String,
    pub added_at: DateTime<Utc>,
}

/// Derived feed element: a friend's watched entry tagged with who added it
///
/// Never persisted; recomputed on every feed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub friend: Profile,
    pub entry: MediaEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_kind_serde() {
        assert_eq!(serde_json::to_string(&ListKind::Watched).unwrap(), r#""watched""#);
        let parsed: ListKind = serde_json::from_str(r#""wishlist""#).unwrap();
        assert_eq!(parsed, ListKind::Wishlist);
    }

    #[test]
    fn test_media_kind_serde() {
        assert_eq!(serde_json::to_string(&MediaKind::Series).unwrap(), r#""series""#);
        let parsed: MediaKind = serde_json::from_str(r#""movie""#).unwrap();
        assert_eq!(parsed, MediaKind::Movie);
    }

    #[test]
    fn test_media_kind_as_str() {
        assert_eq!(MediaKind::Movie.as_str(), "movie");
        assert_eq!(MediaKind::Series.as_str(), "series");
    }

    #[test]
    fn test_media_entry_serde_roundtrip() {
        let entry = MediaEntry {
            item_id: 603,
            title: "The Matrix".to_string(),
            poster_path: Some("/matrix.jpg".to_string()),
            media_kind: MediaKind::Movie,
            release_date: Some("1999-03-31".to_string()),
            runtime_minutes: 136,
            added_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: MediaEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
