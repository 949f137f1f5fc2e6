use serde::{Deserialize, Serialize};

/// Admin-defined coach preset, selectable in place of a built-in model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub system_prompt: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl CoachPreset {
    /// A preset with no genres applies to every genre.
    pub fn applies_to(&self, genre: &str) -> bool {
        self.genres.is_empty() || self.genres.iter().any(|g| g == genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_camel_case_keys() {
        let raw = r#"{"id":"noir","name":"Noir Coach","systemPrompt":"Be terse.","genres":["mystery"]}"#;
        let preset: CoachPreset = serde_json::from_str(raw).unwrap();
        assert_eq!(preset.system_prompt, "Be terse.");
        assert!(preset.applies_to("mystery"));
        assert!(!preset.applies_to("romance"));
    }
}
