use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Folder, FolderId, Message, Session, SessionId};

use super::store::{load_json, persist_json, KeyValueStore, KEY_FOLDERS, KEY_SESSIONS};

/// Archived sessions and the folders that group them.
///
/// Sessions are kept newest first. A session's folder is a weak
/// reference: deleting a folder detaches its sessions, and a reference to
/// a folder that no longer exists is read as "no folder".
pub struct SessionArchive {
    store: Arc<dyn KeyValueStore>,
    sessions: Vec<Session>,
    folders: Vec<Folder>,
}

impl SessionArchive {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut sessions: Vec<Session> =
            load_json(store.as_ref(), KEY_SESSIONS).unwrap_or_default();
        let folders: Vec<Folder> = load_json(store.as_ref(), KEY_FOLDERS).unwrap_or_default();

        // A crash between the two writes of delete_folder can leave
        // references to a folder that is gone.
        let known: HashSet<&FolderId> = folders.iter().map(|f| &f.id).collect();
        let mut dropped = 0;
        for session in &mut sessions {
            if session.folder.as_ref().is_some_and(|id| !known.contains(id)) {
                session.folder = None;
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!("Dropped {} dangling folder references", dropped);
        }

        Self {
            store,
            sessions,
            folders,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == session_id)
    }

    pub fn folder(&self, folder_id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| &f.id == folder_id)
    }

    /// Store a finished conversation as a new session. Empty sequences are
    /// not archived.
    pub fn archive(&mut self, messages: Vec<Message>) -> Option<SessionId> {
        if messages.is_empty() {
            return None;
        }
        let session = Session::new(messages);
        let id = session.id.clone();
        tracing::debug!("Archiving {} messages as session {}", session.messages.len(), id);
        self.sessions.insert(0, session);
        self.persist_sessions();
        Some(id)
    }

    pub fn rename(&mut self, session_id: &SessionId, name: &str) {
        if let Some(session) = self.session_mut(session_id) {
            session.name = Some(name.to_string());
            self.persist_sessions();
        }
    }

    pub fn delete(&mut self, session_id: &SessionId) {
        let before = self.sessions.len();
        self.sessions.retain(|s| &s.id != session_id);
        if self.sessions.len() != before {
            self.persist_sessions();
        }
    }

    /// Assign a session to a folder, or detach it with `None`. The folder id
    /// is not checked; unknown ids group as root.
    pub fn move_to_folder(&mut self, session_id: &SessionId, folder_id: Option<FolderId>) {
        if let Some(session) = self.session_mut(session_id) {
            session.folder = folder_id;
            self.persist_sessions();
        }
    }

    pub fn create_folder(&mut self, name: &str) -> Option<FolderId> {
        if name.trim().is_empty() {
            return None;
        }
        let folder = Folder::new(name);
        let id = folder.id.clone();
        self.folders.push(folder);
        self.persist_folders();
        Some(id)
    }

    pub fn rename_folder(&mut self, folder_id: &FolderId, name: &str) {
        if let Some(folder) = self.folder_mut(folder_id) {
            folder.name = name.to_string();
            self.persist_folders();
        }
    }

    pub fn toggle_folder(&mut self, folder_id: &FolderId) {
        if let Some(folder) = self.folder_mut(folder_id) {
            folder.expanded = !folder.expanded;
            self.persist_folders();
        }
    }

    pub fn delete_folder(&mut self, folder_id: &FolderId) {
        self.folders.retain(|f| &f.id != folder_id);
        for session in &mut self.sessions {
            if session.folder.as_ref() == Some(folder_id) {
                session.folder = None;
            }
        }
        self.persist_folders();
        self.persist_sessions();
    }

    /// Sessions not in any existing folder.
    pub fn list_root(&self) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| match &s.folder {
                None => true,
                Some(id) => self.folder(id).is_none(),
            })
            .collect()
    }

    pub fn list_in_folder(&self, folder_id: &FolderId) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.folder.as_ref() == Some(folder_id))
            .collect()
    }

    fn session_mut(&mut self, session_id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id == session_id)
    }

    fn folder_mut(&mut self, folder_id: &FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| &f.id == folder_id)
    }

    fn persist_sessions(&self) {
        persist_json(self.store.as_ref(), KEY_SESSIONS, &self.sessions);
    }

    fn persist_folders(&self) {
        persist_json(self.store.as_ref(), KEY_FOLDERS, &self.folders);
    }
}
