/// A chat model offered in the model picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
}

/// A writing genre the coach can specialise in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
}

pub const GENERAL_GENRE: &str = "general";

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "openai/gpt-4o",
        name: "GPT-4o",
        desc: "Excellent for nuanced, creative writing and brainstorming. Fast and reliable.",
    },
    ModelInfo {
        id: "anthropic/claude-3.5-sonnet",
        name: "Claude 3.5 Sonnet",
        desc: "Great for character development, dialogue, and literary style.",
    },
    ModelInfo {
        id: "meta-llama/llama-3-70b-instruct",
        name: "Llama 3.1 (70B)",
        desc: "Open-source, creative, and cost-effective for long-form writing.",
    },
    ModelInfo {
        id: "google/gemini-pro",
        name: "Gemini Pro",
        desc: "Strong at idea generation and plot structure.",
    },
    ModelInfo {
        id: "mistralai/mistral-large",
        name: "Mistral Large",
        desc: "Balanced, creative, and good for brainstorming.",
    },
    ModelInfo {
        id: "openai/gpt-3.5-turbo",
        name: "GPT-3.5 Turbo",
        desc: "Fast, affordable, and solid for quick creative tasks.",
    },
];

pub const GENRES: &[Genre] = &[
    Genre { id: "fantasy", name: "Fantasy", desc: "Epic quests, magic, and imaginative worlds." },
    Genre { id: "scifi", name: "Sci-Fi", desc: "Futuristic tech, space, and speculative ideas." },
    Genre { id: "mystery", name: "Mystery", desc: "Whodunits, suspense, and clever twists." },
    Genre { id: "romance", name: "Romance", desc: "Love stories, relationships, and emotional arcs." },
    Genre { id: "nonfiction", name: "Nonfiction", desc: "Essays, memoir, and real-world topics." },
    Genre { id: "horror", name: "Horror", desc: "Chilling tales, fear, and the supernatural." },
    Genre { id: "historical", name: "Historical", desc: "Stories set in the past, real or imagined." },
    Genre { id: "thriller", name: "Thriller", desc: "High stakes, suspense, and fast-paced action." },
    Genre { id: "adventure", name: "Adventure", desc: "Exciting journeys, exploration, and daring feats." },
    Genre { id: "ya", name: "Young Adult", desc: "Coming-of-age, teen protagonists, and growth." },
    Genre { id: "childrens", name: "Children's", desc: "Stories for young readers, often with lessons." },
    Genre { id: "poetry", name: "Poetry", desc: "Verse, rhythm, and expressive language." },
    Genre { id: "satire", name: "Satire", desc: "Humor, irony, and social commentary." },
    Genre { id: "dystopian", name: "Dystopian", desc: "Dark futures, societal collapse, and control." },
    Genre { id: GENERAL_GENRE, name: "General", desc: "Any genre or mixed styles." },
];

const RECOMMENDATIONS: &[(&str, &[&str])] = &[
    ("fantasy", &["openai/gpt-4o", "meta-llama/llama-3-70b-instruct"]),
    ("scifi", &["openai/gpt-4o", "google/gemini-pro"]),
    ("mystery", &["anthropic/claude-3.5-sonnet", "openai/gpt-4o"]),
    ("romance", &["anthropic/claude-3.5-sonnet", "openai/gpt-3.5-turbo"]),
    ("nonfiction", &["mistralai/mistral-large", "openai/gpt-4o"]),
    ("horror", &["openai/gpt-4o", "meta-llama/llama-3-70b-instruct"]),
    (
        GENERAL_GENRE,
        &[
            "openai/gpt-4o",
            "anthropic/claude-3.5-sonnet",
            "meta-llama/llama-3-70b-instruct",
        ],
    ),
];

pub const WELCOME_TITLE: &str = "Welcome to the Creative Writing Assistant";

pub const WELCOME_TEXT: &str = "Your AI-powered writing coach for brainstorming, character \
development, overcoming writer's block, and refining your craft. Get inspired and make your \
stories shine!";

pub const EXAMPLE_PROMPTS: &[&str] = &[
    "Help me brainstorm a fantasy plot about a lost city.",
    "Suggest a unique character flaw for my protagonist.",
    "Give me a writing exercise to overcome writer's block.",
    "How can I make my dialogue more realistic?",
    "Help me develop a villain with depth and motivation.",
    "Suggest a twist ending for a mystery story.",
];

pub fn default_model() -> &'static ModelInfo {
    &MODELS[0]
}

pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

pub fn find_genre(id: &str) -> Option<&'static Genre> {
    GENRES.iter().find(|g| g.id == id)
}

/// Recommended models for a genre, in preference order. Genres without a
/// recommendation entry yield an empty list.
pub fn recommended_models(genre: &str) -> Vec<&'static ModelInfo> {
    RECOMMENDATIONS
        .iter()
        .find(|(id, _)| *id == genre)
        .map(|(_, ids)| ids.iter().filter_map(|id| find_model(id)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_genre_is_listed() {
        assert_eq!(find_genre(GENERAL_GENRE).map(|g| g.name), Some("General"));
    }

    #[test]
    fn recommendations_resolve_to_known_models() {
        let names: Vec<_> = recommended_models("mystery").iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Claude 3.5 Sonnet", "GPT-4o"]);
    }

    #[test]
    fn genre_without_recommendations_is_empty() {
        assert!(recommended_models("poetry").is_empty());
        assert!(recommended_models("no-such-genre").is_empty());
    }

    #[test]
    fn default_model_is_first() {
        assert_eq!(default_model().id, "openai/gpt-4o");
    }
}
