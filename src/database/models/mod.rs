pub mod chapter;
pub mod character;
pub mod misc;
pub mod novel;
pub mod registration_key;
pub mod snapshot;
pub mod token_blacklist;
pub mod user;
pub mod world_event;
pub mod world_view;

pub use chapter::{Chapter, ChapterChanges, ChapterFile, NewChapter};
pub use character::{Character, CharacterChanges, NewCharacter};
pub use misc::{Misc, MiscChanges, NewMisc};
pub use novel::{NewNovel, Novel, NovelChanges};
pub use registration_key::RegistrationKey;
pub use snapshot::{CharacterSnapshot, NewSnapshot, SnapshotChanges, SnapshotFilter};
pub use token_blacklist::BlacklistedToken;
pub use user::{User, UserSummary};
pub use world_event::{NewWorldEvent, WorldEvent, WorldEventChanges};
pub use world_view::{NewWorldView, WorldView, WorldViewChanges};
