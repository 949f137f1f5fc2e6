pub mod archive;
pub mod chat;
pub mod database;
pub mod export;
pub mod favourites;
pub mod presets;
pub mod settings;
pub mod store;

pub use archive::SessionArchive;
pub use chat::ConversationEngine;
pub use database::Database;
pub use favourites::FavouritesRegistry;
pub use presets::PresetService;
pub use settings::SettingsService;
pub use store::{KeyValueStore, MemoryStore};
