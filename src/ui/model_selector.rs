use std::fmt::Write;

use crate::models::catalog::{self, GENRES, MODELS};
use crate::services::{ConversationEngine, PresetService};

fn marker(selected: bool) -> &'static str {
    if selected {
        "*"
    } else {
        " "
    }
}

pub fn render_models(engine: &ConversationEngine, presets: &PresetService) -> String {
    let mut out = String::from("Models");
    for model in MODELS {
        let _ = write!(
            out,
            "\n {} {:<34} {}\n     {}",
            marker(model.id == engine.model()),
            model.id,
            model.name,
            model.desc
        );
    }

    let coaches = presets.for_genre(engine.genre());
    if !coaches.is_empty() {
        out.push_str("\n\nCoach presets");
        for preset in coaches {
            let _ = write!(
                out,
                "\n {} {:<34} {}",
                marker(preset.id == engine.model()),
                preset.id,
                preset.name
            );
            if let Some(desc) = &preset.desc {
                let _ = write!(out, "\n     {}", desc);
            }
        }
    }

    let recommended: Vec<_> = catalog::recommended_models(engine.genre())
        .iter()
        .map(|m| m.name)
        .collect();
    if !recommended.is_empty() {
        let _ = write!(
            out,
            "\n\nRecommended models for this genre: {}",
            recommended.join(", ")
        );
    }
    out
}

pub fn render_genres(engine: &ConversationEngine) -> String {
    let mut out = String::from("Genres");
    for genre in GENRES {
        let _ = write!(
            out,
            "\n {} {:<12} {}",
            marker(genre.id == engine.genre()),
            genre.id,
            genre.desc
        );
    }
    out
}

/// Every preset, regardless of genre, with its system prompt.
pub fn render_presets(presets: &PresetService) -> String {
    if presets.list().is_empty() {
        return "No coach presets.".to_string();
    }
    let mut out = String::from("Coach presets");
    for preset in presets.list() {
        let genres = if preset.genres.is_empty() {
            "all genres".to_string()
        } else {
            preset.genres.join(", ")
        };
        let _ = write!(
            out,
            "\n  {} ({}) [{}]\n    {}",
            preset.id, preset.name, genres, preset.system_prompt
        );
    }
    out
}
