use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{FeedItem, ListKind, MediaEntry, Profile},
};

/// Each friend contributes at most this many entries per feed build.
/// Caps fan-out cost; not user-configurable.
pub const PER_FRIEND_LIMIT: usize = 5;

/// Builds the friends-activity feed
///
/// The feed is the union of each friend's own most recent watched entries,
/// re-sorted by recency. It is deliberately NOT a global top-K: a prolific
/// friend is capped at [`PER_FRIEND_LIMIT`] entries no matter how recent the
/// rest of theirs are, and a quiet friend contributes whatever they have.
#[derive(Clone)]
pub struct FeedService {
    db: PgPool,
}

impl FeedService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Recomputes the feed for the given friend set
    ///
    /// Per-friend fetches run concurrently and the merge waits for all of
    /// them. A friend whose fetch fails is dropped from this build with a
    /// warning; one bad fetch never fails the whole feed.
    pub async fn build(&self, friends: Vec<Profile>) -> AppResult<Vec<FeedItem>> {
        if friends.is_empty() {
            return Ok(Vec::new());
        }

        let mut tasks = Vec::with_capacity(friends.len());
        for friend in friends {
            let db = self.db.clone();
            tasks.push(tokio::spawn(async move {
                let entries = recent_watched(&db, &friend).await;
                (friend, entries)
            }));
        }

        let mut per_friend = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok((friend, Ok(entries))) => per_friend.push((friend, entries)),
                Ok((friend, Err(e))) => {
                    tracing::warn!(
                        friend_id = %friend.account_id,
                        error = %e,
                        "Dropping friend's feed contribution"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Feed fetch task failed");
                }
            }
        }

        Ok(merge_recent(per_friend))
    }
}

/// Fetches one friend's most recent watched entries
async fn recent_watched(db: &PgPool, friend: &Profile) -> AppResult<Vec<MediaEntry>> {
    let entries = sqlx::query_as::<_, MediaEntry>(
        "SELECT item_id, title, poster_path, media_kind, release_date, \
                runtime_minutes, added_at \
         FROM media_entries \
         WHERE account_id = $1 AND list_kind = $2 \
         ORDER BY added_at DESC \
         LIMIT $3",
    )
    .bind(friend.account_id)
    .bind(ListKind::Watched)
    .bind(PER_FRIEND_LIMIT as i64)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

/// Merges per-friend entry lists into one reverse-chronological feed
///
/// Pure fan-in step: tag every entry with its friend, cap each friend at
/// [`PER_FRIEND_LIMIT`], and sort the union newest-first.
pub fn merge_recent(per_friend: Vec<(Profile, Vec<MediaEntry>)>) -> Vec<FeedItem> {
    let mut feed: Vec<FeedItem> = per_friend
        .into_iter()
        .flat_map(|(friend, entries)| {
            entries
                .into_iter()
                .take(PER_FRIEND_LIMIT)
                .map(move |entry| FeedItem {
                    friend: friend.clone(),
                    entry,
                })
        })
        .collect();

    feed.sort_by(|a, b| b.entry.added_at.cmp(&a.entry.added_at));
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn profile(name: &str) -> Profile {
        Profile {
            account_id: Uuid::new_v4(),
            display_name: name.to_string(),
        }
    }

    fn entry(item_id: i64, added_at: DateTime<Utc>) -> MediaEntry {
        MediaEntry {
            item_id,
            title: format!("Title {}", item_id),
            poster_path: None,
            media_kind: MediaKind::Movie,
            release_date: None,
            runtime_minutes: 100,
            added_at,
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn test_merge_empty_input_is_empty_feed() {
        assert!(merge_recent(Vec::new()).is_empty());
    }

    #[test]
    fn test_merge_sorts_union_newest_first() {
        let f1 = profile("alice");
        let f2 = profile("bob");

        let merged = merge_recent(vec![
            (f1.clone(), vec![entry(1, at(100)), entry(2, at(50))]),
            (f2.clone(), vec![entry(3, at(75))]),
        ]);

        let order: Vec<i64> = merged.iter().map(|i| i.entry.item_id).collect();
        assert_eq!(order, vec![1, 3, 2]);
        assert_eq!(merged[0].friend, f1);
        assert_eq!(merged[1].friend, f2);
    }

    // A quiet friend keeps all their items while a
    // prolific friend is capped at their own top five, even when every one
    // of the prolific friend's items is newer.
    #[test]
    fn test_merge_caps_each_friend_not_globally() {
        let f1 = profile("quiet");
        let f2 = profile("prolific");

        // F1: 3 items, older
        let f1_entries = vec![entry(11, at(30)), entry(12, at(20)), entry(13, at(10))];
        // F2: 6 items, all newer than F1's; newest first as the per-friend
        // fetch delivers them
        let f2_entries = vec![
            entry(21, at(600)),
            entry(22, at(500)),
            entry(23, at(400)),
            entry(24, at(300)),
            entry(25, at(200)),
            entry(26, at(100)),
        ];

        let merged = merge_recent(vec![(f1, f1_entries), (f2, f2_entries)]);

        assert_eq!(merged.len(), 8);

        let ids: Vec<i64> = merged.iter().map(|i| i.entry.item_id).collect();
        // F2's oldest (6th) item is excluded despite outranking all of F1's
        assert!(!ids.contains(&26));
        // All five kept F2 items precede every F1 item
        assert_eq!(ids, vec![21, 22, 23, 24, 25, 11, 12, 13]);
    }

    #[test]
    fn test_merge_friend_with_fewer_items_contributes_fewer() {
        let f1 = profile("one-item");
        let merged = merge_recent(vec![(f1, vec![entry(1, at(10))])]);
        assert_eq!(merged.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_friend_set_issues_no_fetches() {
        // A lazy pool never connects, so any fetch attempt would surface a
        // connection error instead of an empty feed.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap();
        let feed = FeedService::new(pool);

        let items = feed.build(Vec::new()).await.unwrap();
        assert!(items.is_empty());
    }
}
