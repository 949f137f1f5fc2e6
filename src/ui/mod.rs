pub mod chat_view;
pub mod input_area;
pub mod model_selector;
pub mod onboarding;
pub mod prompt;
pub mod sidebar;
