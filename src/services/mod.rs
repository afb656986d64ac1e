pub mod catalog;
pub mod feed;
pub mod identity;
pub mod lists;
pub mod social;

pub use feed::FeedService;
pub use identity::IdentityService;
pub use lists::ListService;
pub use social::SocialService;
