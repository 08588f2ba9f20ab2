mod screens;

pub use screens::{CharacterForm, QuizCursor, ScreenUi, SettingsItem, SettingsPanel, TitleChoice, TitleMenu, UiAction};
