use std::fmt::Write;

use crate::models::Session;
use crate::services::{FavouritesRegistry, SessionArchive};

pub fn render_favourites(favourites: &FavouritesRegistry) -> String {
    if favourites.list().is_empty() {
        return "Favourite Prompts\n  No favourites yet.".to_string();
    }
    let mut out = String::from("Favourite Prompts");
    for (i, prompt) in favourites.list().iter().enumerate() {
        let _ = write!(out, "\n  {:>2}. {}", i + 1, prompt);
    }
    out
}

fn session_line(out: &mut String, number: usize, session: &Session, indent: &str) {
    let _ = write!(out, "\n{}#{} {}", indent, number, session.title());
}

/// Folder tree followed by unfiled sessions. Numbers are positions in the
/// full, newest-first session list so they stay stable across folders.
pub fn render_sessions(archive: &SessionArchive) -> String {
    if archive.sessions().is_empty() && archive.folders().is_empty() {
        return "Session History\n  No sessions yet.".to_string();
    }

    let number_of = |session: &Session| {
        archive
            .sessions()
            .iter()
            .position(|s| s.id == session.id)
            .map(|i| i + 1)
            .unwrap_or(0)
    };

    let mut out = String::from("Session History");
    for (i, folder) in archive.folders().iter().enumerate() {
        let sessions = archive.list_in_folder(&folder.id);
        let marker = if folder.expanded { "▾" } else { "▸" };
        let _ = write!(
            out,
            "\n  {} [{}] {} ({})",
            marker,
            i + 1,
            folder.name,
            sessions.len()
        );
        if folder.expanded {
            for session in sessions {
                session_line(&mut out, number_of(session), session, "      ");
            }
        }
    }
    for session in archive.list_root() {
        session_line(&mut out, number_of(session), session, "  ");
    }
    out
}
