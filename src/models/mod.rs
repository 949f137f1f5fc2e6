pub mod catalog;
pub mod folder;
pub mod ids;
pub mod message;
pub mod preset;
pub mod session;

pub use catalog::{Genre, ModelInfo};
pub use folder::Folder;
pub use ids::{FolderId, MessageId, SessionId};
pub use message::{Message, Role};
pub use preset::CoachPreset;
pub use session::Session;
