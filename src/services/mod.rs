pub mod auth;
pub mod cascade;
pub mod chapter_content;
pub mod chapters;
pub mod characters;
pub mod error;
pub mod miscs;
pub mod novels;
pub mod registration_keys;
pub mod snapshots;
pub mod token_blacklist;
pub mod validate;
pub mod world_events;
pub mod world_views;

pub use auth::AuthService;
pub use chapter_content::{ChapterContentStore, ChapterLocation, ContentError};
pub use chapters::ChapterService;
pub use characters::CharacterService;
pub use error::{ServiceError, ServiceResult};
pub use miscs::MiscService;
pub use novels::NovelService;
pub use registration_keys::RegistrationKeyService;
pub use snapshots::SnapshotService;
pub use token_blacklist::TokenBlacklistService;
pub use world_events::WorldEventService;
pub use world_views::WorldViewService;
