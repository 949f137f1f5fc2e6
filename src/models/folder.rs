use serde::{Deserialize, Serialize};

use super::ids::FolderId;

/// A named, collapsible group of archived sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub expanded: bool,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::new(),
            name: name.into(),
            expanded: true,
        }
    }
}
