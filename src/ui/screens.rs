//! Per-screen widget state and the key handling that drives the session.
//!
//! Nothing here draws; the renderer reads these widgets each frame.

use crate::audio::VolumeControl;
use crate::content::ContentLoader;
use crate::game::{Gender, GameFlow, Screen};
use crate::input::{InputFrame, MAX_TEXT_LEN};
use crate::quiz::{ActiveQuiz, QuizStep, TestKind, OPTION_COUNT};
use crate::save::SaveStore;

/// Result of a UI update - tells the frame loop what to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Continue,
    /// Leave the frame loop (after the session was saved)
    Quit,
}

// ============================================================================
// Title
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleChoice {
    Continue,
    StartOver,
}

#[derive(Debug, Default)]
pub struct TitleMenu {
    pub selected: usize,
}

impl TitleMenu {
    /// Entries shown; "start over" only makes sense with a save
    pub fn choices(has_save: bool) -> &'static [TitleChoice] {
        if has_save {
            &[TitleChoice::Continue, TitleChoice::StartOver]
        } else {
            &[TitleChoice::Continue]
        }
    }

    fn update<C: ContentLoader, S: SaveStore>(&mut self, flow: &mut GameFlow<C, S>, input: &InputFrame) {
        let choices = Self::choices(flow.progress().has_save);
        self.selected = self.selected.min(choices.len() - 1);
        if input.nav_up && self.selected > 0 {
            self.selected -= 1;
        }
        if input.nav_down && self.selected + 1 < choices.len() {
            self.selected += 1;
        }
        if input.confirm {
            match choices[self.selected] {
                TitleChoice::Continue => flow.continue_from_title(),
                TitleChoice::StartOver => flow.start_over(),
            }
            self.selected = 0;
        }
    }
}

// ============================================================================
// Character select
// ============================================================================

#[derive(Debug)]
pub struct CharacterForm {
    pub name: String,
    pub gender: Gender,
    pub error: Option<String>,
}

impl Default for CharacterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: Gender::Boy,
            error: None,
        }
    }
}

impl CharacterForm {
    fn update<C: ContentLoader, S: SaveStore>(&mut self, flow: &mut GameFlow<C, S>, input: &InputFrame) {
        for &c in &input.typed {
            if self.name.chars().count() < MAX_TEXT_LEN {
                self.name.push(c);
            }
        }
        if input.backspace {
            self.name.pop();
        }
        if input.tab || input.nav_left || input.nav_right {
            self.gender = self.gender.toggled();
        }
        if input.confirm {
            if flow.select_character(&self.name, self.gender) {
                *self = Self::default();
            } else {
                self.error = Some("Please enter a name".to_string());
            }
        }
    }
}

// ============================================================================
// Quiz
// ============================================================================

/// Which blank (fill-in-gap) or selector (drop-down) has focus
#[derive(Debug, Default)]
pub struct QuizCursor {
    pub focus: usize,
}

impl QuizCursor {
    fn update<C: ContentLoader, S: SaveStore>(&mut self, flow: &mut GameFlow<C, S>, input: &InputFrame) {
        let Some(quiz) = flow.quiz_mut() else {
            return;
        };

        match quiz {
            ActiveQuiz::MultipleChoice(engine) => {
                if input.nav_up {
                    engine.select_previous();
                }
                if input.nav_down {
                    engine.select_next();
                }
                if let Some(n) = input.number.filter(|&n| n < OPTION_COUNT) {
                    engine.select_option(n);
                }
            }
            ActiveQuiz::FillInGap(engine) => {
                let blanks = engine.blank_count();
                if blanks > 0 {
                    if input.tab || input.nav_down {
                        self.focus = (self.focus + 1) % blanks;
                    }
                    if input.nav_up {
                        self.focus = (self.focus + blanks - 1) % blanks;
                    }
                    for &c in &input.typed {
                        engine.push_char(self.focus, c);
                    }
                    if input.backspace {
                        engine.pop_char(self.focus);
                    }
                }
            }
            ActiveQuiz::DropDown(engine) => {
                let blanks = engine.blank_count();
                if blanks > 0 {
                    if input.tab || input.nav_down {
                        self.focus = (self.focus + 1) % blanks;
                    }
                    if input.nav_up {
                        self.focus = (self.focus + blanks - 1) % blanks;
                    }
                    if input.nav_right {
                        engine.cycle(self.focus, true);
                    }
                    if input.nav_left {
                        engine.cycle(self.focus, false);
                    }
                }
            }
        }

        if input.confirm {
            if let Some(QuizStep::Finished(verdict)) = flow.advance_quiz() {
                log::debug!("Quiz finished with {}/{}", verdict.score, verdict.total());
            }
            self.focus = 0;
        }
    }
}

// ============================================================================
// Settings panel
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    MusicVolume,
    Mute,
    Save,
    SaveAndQuit,
    Close,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 5] = [
        SettingsItem::MusicVolume,
        SettingsItem::Mute,
        SettingsItem::Save,
        SettingsItem::SaveAndQuit,
        SettingsItem::Close,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsItem::MusicVolume => "Music volume",
            SettingsItem::Mute => "Mute",
            SettingsItem::Save => "Save",
            SettingsItem::SaveAndQuit => "Save and quit",
            SettingsItem::Close => "Close",
        }
    }
}

#[derive(Debug, Default)]
pub struct SettingsPanel {
    pub open: bool,
    pub selected: usize,
    /// Feedback from the last save
    pub message: Option<String>,
}

impl SettingsPanel {
    fn update<C: ContentLoader, S: SaveStore>(
        &mut self,
        flow: &mut GameFlow<C, S>,
        input: &InputFrame,
        audio: &mut dyn VolumeControl,
    ) -> UiAction {
        if input.cancel || input.settings {
            self.close();
            return UiAction::Continue;
        }
        if input.nav_up && self.selected > 0 {
            self.selected -= 1;
        }
        if input.nav_down && self.selected + 1 < SettingsItem::ALL.len() {
            self.selected += 1;
        }

        let item = SettingsItem::ALL[self.selected];
        if item == SettingsItem::MusicVolume && (input.nav_left || input.nav_right) {
            audio.step_music_volume(input.nav_right);
        }
        if !input.confirm {
            return UiAction::Continue;
        }

        match item {
            SettingsItem::MusicVolume => {}
            SettingsItem::Mute => audio.toggle_mute(),
            SettingsItem::Save => {
                self.message = Some(match flow.save() {
                    Ok(()) => "Progress saved".to_string(),
                    Err(e) => format!("Save failed: {}", e),
                });
            }
            SettingsItem::SaveAndQuit => match flow.save() {
                Ok(()) => {
                    self.close();
                    return UiAction::Quit;
                }
                Err(e) => self.message = Some(format!("Save failed: {}", e)),
            },
            SettingsItem::Close => self.close(),
        }
        UiAction::Continue
    }

    fn close(&mut self) {
        self.open = false;
        self.selected = 0;
        self.message = None;
    }
}

// ============================================================================
// Screen router
// ============================================================================

/// Widget state for every screen, routed by the session's active screen
#[derive(Debug, Default)]
pub struct ScreenUi {
    pub title: TitleMenu,
    pub character: CharacterForm,
    pub quiz: QuizCursor,
    pub settings: SettingsPanel,
}

impl ScreenUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the active screen takes typed text (letters are not shortcuts)
    pub fn wants_text<C: ContentLoader, S: SaveStore>(&self, flow: &GameFlow<C, S>) -> bool {
        match flow.screen() {
            Screen::CharacterSelect => true,
            Screen::TestInProgress { quiz, .. } => quiz.kind() == TestKind::FillInGap,
            _ => false,
        }
    }

    pub fn update<C: ContentLoader, S: SaveStore>(
        &mut self,
        flow: &mut GameFlow<C, S>,
        input: &InputFrame,
        delta: f32,
        audio: &mut dyn VolumeControl,
    ) -> UiAction {
        match flow.screen() {
            Screen::Title => self.title.update(flow, input),
            Screen::CharacterSelect => self.character.update(flow, input),
            Screen::Overworld => {
                // An error banner swallows the next confirm/cancel
                if flow.last_error().is_some() && (input.confirm || input.cancel) {
                    flow.clear_error();
                    return UiAction::Continue;
                }
                if self.settings.open {
                    return self.settings.update(flow, input, audio);
                }
                if input.settings && flow.dialogue().is_none() && !flow.player().is_some_and(|p| p.is_moving()) {
                    self.settings.open = true;
                    return UiAction::Continue;
                }
                flow.update_overworld(delta, &input.overworld());
            }
            Screen::TestInProgress { .. } => self.quiz.update(flow, input),
            Screen::TestResult { .. } => {
                if input.confirm || input.cancel {
                    flow.return_to_overworld();
                }
            }
            Screen::GameOver | Screen::Victory => {
                if input.cancel {
                    flow.shutdown();
                    return UiAction::Quit;
                }
                if input.confirm {
                    flow.restart_run();
                }
            }
        }
        UiAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::content::{MemoryContent, TestDefinition};
    use crate::game::{Npc, Tilemap};
    use crate::quiz::{DropDownQuestion, FillInGapQuestion, MultipleChoiceQuestion, QuestionSet};
    use crate::save::{MemorySaveStore, SaveRecord};

    #[derive(Default)]
    struct FakeVolume {
        volume: f32,
        muted: bool,
    }

    impl VolumeControl for FakeVolume {
        fn music_volume(&self) -> f32 {
            self.volume
        }

        fn step_music_volume(&mut self, up: bool) {
            self.volume += if up { 0.1 } else { -0.1 };
        }

        fn toggle_mute(&mut self) {
            self.muted = !self.muted;
        }

        fn is_muted(&self) -> bool {
            self.muted
        }
    }

    type Flow = GameFlow<MemoryContent, MemorySaveStore>;

    fn flow() -> Flow {
        GameFlow::start(GameConfig::default(), Tilemap::bordered(140, 100), flow_content(), MemorySaveStore::new()).unwrap()
    }

    fn flow_content() -> MemoryContent {
        MemoryContent::new()
            .with_test(
                TestDefinition::new(1, TestKind::FillInGap, "spanish", "LANTERN"),
                QuestionSet::FillInGap(vec![FillInGapQuestion::new("___ y ___", &["sal", "pimienta"])]),
            )
            .with_test(
                TestDefinition::new(2, TestKind::DropDown, "grammar", "OWL"),
                QuestionSet::DropDown(vec![DropDownQuestion::new("I ___ it", &["likes", "like"], &["like"])]),
            )
            .with_test(
                TestDefinition::new(3, TestKind::MultipleChoice, "history", "KEY"),
                QuestionSet::MultipleChoice(vec![MultipleChoiceQuestion::new("?", ["a", "b", "c", "d"], "c")]),
            )
            .with_npc(Npc::test("Marta", 13, 69, 1, "Spanish first.", "Marta is south."))
    }

    fn key(f: impl FnOnce(&mut InputFrame)) -> InputFrame {
        let mut frame = InputFrame::default();
        f(&mut frame);
        frame
    }

    fn typed(text: &str) -> InputFrame {
        InputFrame { typed: text.chars().collect(), ..Default::default() }
    }

    fn run(ui: &mut ScreenUi, flow: &mut Flow, frame: InputFrame) -> UiAction {
        ui.update(flow, &frame, 0.016, &mut FakeVolume::default())
    }

    fn into_overworld(ui: &mut ScreenUi, flow: &mut Flow) {
        run(ui, flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
        run(ui, flow, typed("Ana"));
        run(ui, flow, key(|f| f.tab = true));
        run(ui, flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::Overworld));
    }

    #[test]
    fn test_character_form_requires_name() {
        let mut ui = ScreenUi::new();
        let mut flow = flow();
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
        assert!(ui.character.error.is_some());
        assert!(ui.wants_text(&flow));

        run(&mut ui, &mut flow, typed("Anaa"));
        run(&mut ui, &mut flow, key(|f| f.backspace = true));
        run(&mut ui, &mut flow, key(|f| f.tab = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        let player = flow.player().unwrap();
        assert_eq!(player.name, "Ana");
        assert_eq!(player.gender, Gender::Girl);
    }

    #[test]
    fn test_fill_in_gap_typing_and_focus() {
        let mut ui = ScreenUi::new();
        let mut flow = flow();
        into_overworld(&mut ui, &mut flow);

        // talk to Marta below the start tile: open, reveal, confirm
        for _ in 0..3 {
            run(&mut ui, &mut flow, key(|f| f.interact = true));
        }
        assert!(matches!(flow.screen(), Screen::TestInProgress { .. }));
        assert!(ui.wants_text(&flow));

        run(&mut ui, &mut flow, typed("sal"));
        run(&mut ui, &mut flow, key(|f| f.tab = true));
        run(&mut ui, &mut flow, typed("pimienta"));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));

        match flow.screen() {
            Screen::TestResult { verdict, unlock_key, .. } => {
                assert!(verdict.passed);
                assert_eq!(unlock_key.as_deref(), Some("LANTERN"));
            }
            other => panic!("unexpected screen {}", other.name()),
        }
        assert_eq!(ui.quiz.focus, 0);

        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::Overworld));
        assert_eq!(flow.progress().next_test, 2);
    }

    #[test]
    fn test_drop_down_cycles_focused_selector() {
        let mut ui = ScreenUi::new();
        let mut flow = flow();
        into_overworld(&mut ui, &mut flow);
        assert!(flow.request_test(1).unwrap());
        if let Some(ActiveQuiz::FillInGap(quiz)) = flow.quiz_mut() {
            quiz.set_blank(0, "sal");
            quiz.set_blank(1, "pimienta");
        }
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(flow.request_test(2).unwrap());

        run(&mut ui, &mut flow, key(|f| f.nav_right = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::TestResult { verdict, .. } if verdict.passed));
    }

    #[test]
    fn test_settings_save_and_quit() {
        let mut ui = ScreenUi::new();
        let mut flow = flow();
        into_overworld(&mut ui, &mut flow);

        run(&mut ui, &mut flow, key(|f| f.settings = true));
        assert!(ui.settings.open);

        let mut volume = FakeVolume::default();
        ui.update(&mut flow, &key(|f| f.nav_right = true), 0.016, &mut volume);
        assert!((volume.music_volume() - 0.1).abs() < 1e-5);

        // Save
        run(&mut ui, &mut flow, key(|f| f.nav_down = true));
        run(&mut ui, &mut flow, key(|f| f.nav_down = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert_eq!(ui.settings.message.as_deref(), Some("Progress saved"));
        assert_eq!(flow.store().writes(), 1);

        // Save and quit
        run(&mut ui, &mut flow, key(|f| f.nav_down = true));
        assert_eq!(run(&mut ui, &mut flow, key(|f| f.confirm = true)), UiAction::Quit);
        assert_eq!(flow.store().writes(), 2);
        assert!(!ui.settings.open);
    }

    #[test]
    fn test_escape_on_victory_saves_and_quits() {
        let player = crate::game::Player::new("Leo".to_string(), Gender::Boy, 50, 50, crate::game::Direction::Up);
        let store = MemorySaveStore::with_record(SaveRecord::snapshot(2, 4, &player));
        let mut flow = GameFlow::start(GameConfig::default(), Tilemap::bordered(140, 100), flow_content(), store).unwrap();
        let mut ui = ScreenUi::new();

        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::Victory));
        assert_eq!(run(&mut ui, &mut flow, key(|f| f.cancel = true)), UiAction::Quit);
        assert_eq!(flow.store().writes(), 1);
        assert_eq!(flow.store().record().next_test(), Some(4));
    }

    #[test]
    fn test_title_offers_start_over_with_save() {
        let player = crate::game::Player::new("Leo".to_string(), Gender::Boy, 50, 50, crate::game::Direction::Up);
        let content = MemoryContent::new().with_test(
            TestDefinition::new(1, TestKind::MultipleChoice, "history", "KEY"),
            QuestionSet::MultipleChoice(vec![MultipleChoiceQuestion::new("?", ["a", "b", "c", "d"], "a")]),
        );
        let store = MemorySaveStore::with_record(SaveRecord::snapshot(2, 1, &player));
        let mut flow = GameFlow::start(GameConfig::default(), Tilemap::bordered(140, 100), content, store).unwrap();
        let mut ui = ScreenUi::new();

        assert_eq!(TitleMenu::choices(true).len(), 2);
        run(&mut ui, &mut flow, key(|f| f.nav_down = true));
        run(&mut ui, &mut flow, key(|f| f.confirm = true));
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
        assert_eq!(flow.progress().lives, 3);
    }
}
