use std::fmt::Write;

use crate::config::API_KEY_LINK;
use crate::models::catalog::{EXAMPLE_PROMPTS, WELCOME_TEXT, WELCOME_TITLE};
use crate::services::FavouritesRegistry;

/// First-run screen. Example prompts already saved as favourites are
/// starred.
pub fn render_welcome(favourites: &FavouritesRegistry) -> String {
    let mut out = format!("{}\n\n{}\n\nTry an example prompt:", WELCOME_TITLE, WELCOME_TEXT);
    for prompt in EXAMPLE_PROMPTS {
        let star = if favourites.contains(prompt) { "★" } else { "☆" };
        let _ = write!(out, "\n  {} {}", star, prompt);
    }
    let _ = write!(
        out,
        "\n\nSave one with /fav <prompt>. Get an API key at {} and set it with /key.\n\
Type /start to begin chatting.",
        API_KEY_LINK
    );
    out
}
