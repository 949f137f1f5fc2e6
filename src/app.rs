use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::models::catalog;
use crate::models::{CoachPreset, FolderId, Message, SessionId};
use crate::providers::CompletionClient;
use crate::services::chat::{ConversationEngine, SendError};
use crate::services::export::ExportFormat;
use crate::services::settings::{ColorScheme, DisplayMode};
use crate::services::store::KeyValueStore;
use crate::services::{FavouritesRegistry, PresetService, SessionArchive, SettingsService};

/// Everything the user can ask for, already resolved to ids.
#[derive(Debug, Clone)]
pub enum AppMsg {
    Start,
    SetApiKey(String),
    ClearApiKey,
    SelectModel(String),
    SelectGenre(String),
    SetTheme(ColorScheme),
    SetMode(DisplayMode),
    SendMessage(String),
    ClearConversation,
    Export(ExportFormat),
    AddFavourite(String),
    RemoveFavourite(String),
    SelectFavourite(String),
    RestoreSession(SessionId),
    RenameSession(SessionId, String),
    DeleteSession(SessionId),
    MoveSession(SessionId, Option<FolderId>),
    CreateFolder(String),
    RenameFolder(FolderId, String),
    ToggleFolder(FolderId),
    DeleteFolder(FolderId),
    SavePreset(CoachPreset),
    RemovePreset(String),
}

#[derive(Debug)]
pub enum AppOutput {
    Done,
    Reply(Message),
    Rejected(SendError),
    Exported { format: ExportFormat, payload: String },
    Notice(String),
}

pub struct App {
    settings: SettingsService,
    favourites: FavouritesRegistry,
    archive: SessionArchive,
    presets: PresetService,
    engine: ConversationEngine,
    show_welcome: bool,
}

impl App {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn CompletionClient>,
        config: &AppConfig,
    ) -> Self {
        let settings = SettingsService::new(store.clone());
        let mut engine = ConversationEngine::new(client).with_timeout(config.request_timeout);
        engine.set_api_key(settings.api_key().or_else(|| config.fallback_api_key.clone()));

        Self {
            show_welcome: !settings.has_started(),
            favourites: FavouritesRegistry::load(store.clone()),
            archive: SessionArchive::load(store.clone()),
            presets: PresetService::load(store),
            settings,
            engine,
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    pub fn archive(&self) -> &SessionArchive {
        &self.archive
    }

    pub fn favourites(&self) -> &FavouritesRegistry {
        &self.favourites
    }

    pub fn presets(&self) -> &PresetService {
        &self.presets
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn show_welcome(&self) -> bool {
        self.show_welcome
    }

    pub async fn update(&mut self, msg: AppMsg, cancel: &CancellationToken) -> AppOutput {
        tracing::debug!("update: {:?}", msg);
        match msg {
            AppMsg::Start => {
                self.show_welcome = false;
                if let Err(e) = self.settings.mark_started() {
                    tracing::error!("Failed to record first start: {}", e);
                }
                AppOutput::Done
            }
            AppMsg::SetApiKey(key) => match self.settings.set_api_key(&key) {
                Ok(true) => {
                    self.engine.set_api_key(self.settings.api_key());
                    AppOutput::Notice("API key saved.".to_string())
                }
                Ok(false) => AppOutput::Notice("API key required".to_string()),
                Err(e) => AppOutput::Notice(format!("Failed to save API key: {}", e)),
            },
            AppMsg::ClearApiKey => {
                if let Err(e) = self.settings.clear_api_key() {
                    tracing::error!("Failed to clear API key: {}", e);
                }
                self.engine.set_api_key(None);
                AppOutput::Notice("API key cleared.".to_string())
            }
            AppMsg::SelectModel(id) => {
                if let Some(preset) = self.presets.find(&id) {
                    let prompt = preset.system_prompt.clone();
                    self.engine.set_model(id, Some(prompt));
                } else if catalog::find_model(&id).is_some() {
                    self.engine.set_model(id, None);
                } else {
                    return AppOutput::Notice(format!("Unknown model: {}", id));
                }
                AppOutput::Done
            }
            AppMsg::SelectGenre(id) => {
                if catalog::find_genre(&id).is_none() {
                    return AppOutput::Notice(format!("Unknown genre: {}", id));
                }
                self.engine.set_genre(id);
                AppOutput::Done
            }
            AppMsg::SetTheme(theme) => {
                if let Err(e) = self.settings.set_theme(theme) {
                    tracing::error!("Failed to save theme: {}", e);
                }
                AppOutput::Done
            }
            AppMsg::SetMode(mode) => {
                if let Err(e) = self.settings.set_mode(mode) {
                    tracing::error!("Failed to save mode: {}", e);
                }
                AppOutput::Done
            }
            AppMsg::SendMessage(text) => match self.engine.send(&text, cancel).await {
                Ok(reply) => AppOutput::Reply(reply.clone()),
                Err(e) => AppOutput::Rejected(e),
            },
            AppMsg::ClearConversation => {
                self.engine.clear(&mut self.archive);
                AppOutput::Done
            }
            AppMsg::Export(format) => match self.engine.export(&mut self.archive, format) {
                Some(payload) => AppOutput::Exported { format, payload },
                None => AppOutput::Notice("Nothing to export.".to_string()),
            },
            AppMsg::AddFavourite(prompt) => {
                self.favourites.add(&prompt);
                AppOutput::Done
            }
            AppMsg::RemoveFavourite(prompt) => {
                self.favourites.remove(&prompt);
                AppOutput::Done
            }
            AppMsg::SelectFavourite(prompt) => {
                self.engine.set_draft(prompt);
                AppOutput::Done
            }
            AppMsg::RestoreSession(id) => match self.archive.get(&id) {
                Some(session) => {
                    let messages = session.messages.clone();
                    self.engine.restore(messages);
                    AppOutput::Done
                }
                None => AppOutput::Notice(format!("No such session: {}", id)),
            },
            AppMsg::RenameSession(id, name) => {
                self.archive.rename(&id, &name);
                AppOutput::Done
            }
            AppMsg::DeleteSession(id) => {
                self.archive.delete(&id);
                AppOutput::Done
            }
            AppMsg::MoveSession(id, folder) => {
                self.archive.move_to_folder(&id, folder);
                AppOutput::Done
            }
            AppMsg::CreateFolder(name) => {
                self.archive.create_folder(&name);
                AppOutput::Done
            }
            AppMsg::RenameFolder(id, name) => {
                self.archive.rename_folder(&id, &name);
                AppOutput::Done
            }
            AppMsg::ToggleFolder(id) => {
                self.archive.toggle_folder(&id);
                AppOutput::Done
            }
            AppMsg::DeleteFolder(id) => {
                self.archive.delete_folder(&id);
                AppOutput::Done
            }
            AppMsg::SavePreset(preset) => {
                if self.settings.mode() != DisplayMode::Admin {
                    return AppOutput::Notice("Coach presets can only be edited in admin mode.".to_string());
                }
                if self.engine.model() == preset.id {
                    self.engine
                        .set_model(preset.id.clone(), Some(preset.system_prompt.clone()));
                }
                self.presets.upsert(preset);
                AppOutput::Done
            }
            AppMsg::RemovePreset(id) => {
                if self.settings.mode() != DisplayMode::Admin {
                    return AppOutput::Notice("Coach presets can only be edited in admin mode.".to_string());
                }
                self.presets.remove(&id);
                if self.engine.model() == id {
                    self.engine.set_model(catalog::default_model().id, None);
                    return AppOutput::Notice(format!(
                        "Removed the selected coach; switched to {}.",
                        catalog::default_model().name
                    ));
                }
                AppOutput::Done
            }
        }
    }
}
