//! Session controller: lives, the next required test, persistence, and
//! which screen is active.
//!
//! Every screen change goes through a method here. Out-of-order test
//! requests are ignored; missing test definitions and broken content are
//! reported to the caller and leave the player in the overworld.

use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::content::{ContentLoader, TestDefinition};
use crate::error::{GameError, GameResult};
use crate::quiz::{ActiveQuiz, QuizStep, Verdict};
use crate::save::{SaveRecord, SaveStore};

use super::entities::{Gender, Player};
use super::movement::World;
use super::state::{ActiveDialogue, Overworld, OverworldEvent, OverworldInput};
use super::tilemap::Tilemap;

/// The single active screen
#[derive(Debug, Clone)]
pub enum Screen {
    Title,
    CharacterSelect,
    Overworld,
    TestInProgress {
        test_id: u32,
        quiz: ActiveQuiz,
    },
    TestResult {
        test_id: u32,
        verdict: Verdict,
        /// Present only on a pass
        unlock_key: Option<String>,
    },
    GameOver,
    Victory,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Title => "Title",
            Screen::CharacterSelect => "CharacterSelect",
            Screen::Overworld => "Overworld",
            Screen::TestInProgress { .. } => "TestInProgress",
            Screen::TestResult { .. } => "TestResult",
            Screen::GameOver => "GameOver",
            Screen::Victory => "Victory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub lives: u8,
    pub next_test: u32,
    /// A resumable save was found at session start
    pub has_save: bool,
}

impl Progress {
    pub fn fresh(max_lives: u8) -> Self {
        Self {
            lives: max_lives,
            next_test: 1,
            has_save: false,
        }
    }
}

pub struct GameFlow<C: ContentLoader, S: SaveStore> {
    config: GameConfig,
    content: C,
    store: S,
    tests: BTreeMap<u32, TestDefinition>,
    world: World,
    progress: Progress,
    /// Player restored from the save, used by `continue_from_title`
    saved_player: Option<Player>,
    session: Option<Overworld>,
    screen: Screen,
    last_error: Option<String>,
}

impl<C: ContentLoader, S: SaveStore> GameFlow<C, S> {
    /// Load content and any prior save, landing on the title screen
    pub fn start(config: GameConfig, tilemap: Tilemap, content: C, store: S) -> GameResult<Self> {
        let config = config.validated();
        let tests = content.load_tests()?;
        if tests.is_empty() {
            return Err(GameError::malformed("tests", "no tests defined"));
        }
        let npcs = content.load_npcs()?;
        let world = World::new(tilemap, npcs, config.teleports.clone());

        let record = store.load().unwrap_or_else(|e| {
            log::warn!("Could not read save, starting fresh: {}", e);
            SaveRecord::new()
        });

        let mut flow = Self {
            config,
            content,
            store,
            tests,
            world,
            progress: Progress::fresh(0),
            saved_player: None,
            session: None,
            screen: Screen::Title,
            last_error: None,
        };
        flow.restore(&record);
        Ok(flow)
    }

    fn restore(&mut self, record: &SaveRecord) {
        let max_lives = self.config.max_lives;
        match (record.lives(), record.next_test()) {
            (Some(lives), Some(next_test)) => {
                self.progress = Progress {
                    lives: lives.clamp(1, max_lives.max(1)),
                    next_test: next_test.max(1),
                    has_save: true,
                };
                let (x, y) = record.position().unwrap_or((self.config.start_x, self.config.start_y));
                self.saved_player = Some(Player::new(
                    record.name().unwrap_or_default().to_string(),
                    record.gender().unwrap_or_default(),
                    x,
                    y,
                    record.direction().unwrap_or(self.config.start_direction),
                ));
                log::info!(
                    "Resumed session: lives={}, next test={}",
                    self.progress.lives,
                    self.progress.next_test
                );
            }
            _ => {
                self.progress = Progress::fresh(max_lives);
                self.saved_player = None;
                log::info!("New session: lives={}", max_lives);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> Option<&Player> {
        self.session.as_ref().map(|s| &s.player)
    }

    pub fn dialogue(&self) -> Option<&ActiveDialogue> {
        self.session.as_ref().and_then(|s| s.dialogue.as_ref())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Id of the final test; passing it wins the run
    pub fn last_test_id(&self) -> u32 {
        self.tests.keys().next_back().copied().unwrap_or(0)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn quiz_mut(&mut self) -> Option<&mut ActiveQuiz> {
        match &mut self.screen {
            Screen::TestInProgress { quiz, .. } => Some(quiz),
            _ => None,
        }
    }

    fn enter(&mut self, screen: Screen) {
        log::info!("Screen: {} -> {}", self.screen.name(), screen.name());
        self.screen = screen;
    }

    fn fresh_player(&self, name: String, gender: Gender) -> Player {
        Player::new(
            name,
            gender,
            self.config.start_x,
            self.config.start_y,
            self.config.start_direction,
        )
    }

    // ------------------------------------------------------------------------
    // Title and character select
    // ------------------------------------------------------------------------

    /// Resume the saved session, or go pick a character when there is none
    pub fn continue_from_title(&mut self) {
        if !matches!(self.screen, Screen::Title) {
            return;
        }
        match self.saved_player.take() {
            Some(player) if self.progress.has_save => {
                self.session = Some(Overworld::new(player));
                if self.progress.next_test > self.last_test_id() {
                    self.enter(Screen::Victory);
                } else {
                    self.enter(Screen::Overworld);
                }
            }
            _ => self.enter(Screen::CharacterSelect),
        }
    }

    /// Forget the saved run and pick a new character
    pub fn start_over(&mut self) {
        if !matches!(self.screen, Screen::Title) {
            return;
        }
        self.progress = Progress::fresh(self.config.max_lives);
        self.saved_player = None;
        log::info!("Starting over");
        self.enter(Screen::CharacterSelect);
    }

    /// Returns false when the name is blank
    pub fn select_character(&mut self, name: &str, gender: Gender) -> bool {
        if !matches!(self.screen, Screen::CharacterSelect) {
            return false;
        }
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        log::info!("New player {} ({})", name, gender.as_str());
        self.session = Some(Overworld::new(self.fresh_player(name.to_string(), gender)));
        self.enter(Screen::Overworld);
        true
    }

    // ------------------------------------------------------------------------
    // Overworld
    // ------------------------------------------------------------------------

    /// One overworld frame. A failure to enter a test is kept in `last_error`.
    pub fn update_overworld(&mut self, delta: f32, input: &OverworldInput) -> Option<OverworldEvent> {
        if !matches!(self.screen, Screen::Overworld) {
            return None;
        }
        let session = self.session.as_mut()?;
        let event = session.update(
            &self.world,
            input,
            self.progress.next_test,
            self.config.move_duration,
            self.config.text_reveal_rate,
            delta,
        );

        if let Some(OverworldEvent::RequestTest(test_id)) = event {
            if let Err(e) = self.request_test(test_id) {
                log::error!("Could not start test {}: {}", test_id, e);
                self.last_error = Some(e.to_string());
            }
        }
        event
    }

    /// Enter a test if it is the next required one.
    ///
    /// Returns `Ok(false)` for an out-of-order request. A missing definition
    /// or broken question set is an error and the overworld stays active.
    pub fn request_test(&mut self, test_id: u32) -> GameResult<bool> {
        if !matches!(self.screen, Screen::Overworld) {
            return Ok(false);
        }
        if test_id != self.progress.next_test {
            log::debug!(
                "Ignoring request for test {} (next is {})",
                test_id,
                self.progress.next_test
            );
            return Ok(false);
        }

        let definition = self.tests.get(&test_id).cloned().ok_or(GameError::UnknownTest(test_id))?;

        self.persist_logged();

        let set = self.content.load_questions(definition.kind, &definition.content)?;
        if set.kind() != definition.kind {
            return Err(GameError::malformed(
                &definition.content,
                format!("test {} is {} but its questions are {}", test_id, definition.kind.label(), set.kind().label()),
            ));
        }
        let quiz = ActiveQuiz::from_set(set)?;

        log::info!("Starting test {} ({}, {} questions)", test_id, definition.kind.label(), quiz.total());
        self.last_error = None;
        self.enter(Screen::TestInProgress { test_id, quiz });
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    /// Confirm the current question. Finishing the last one completes the test.
    pub fn advance_quiz(&mut self) -> Option<QuizStep> {
        let step = self.quiz_mut()?.advance();
        if let QuizStep::Finished(verdict) = &step {
            self.complete_test(verdict.clone());
        }
        Some(step)
    }

    /// Apply a verdict: a pass moves the pointer on, a fail costs a life.
    /// Ignored unless a test is in progress.
    pub fn complete_test(&mut self, verdict: Verdict) {
        let test_id = match &self.screen {
            Screen::TestInProgress { test_id, .. } => *test_id,
            other => {
                log::warn!("Ignoring verdict outside a test (screen {})", other.name());
                return;
            }
        };
        log::info!(
            "Test {} {}: {}/{}",
            test_id,
            if verdict.passed { "passed" } else { "failed" },
            verdict.score,
            verdict.total()
        );

        if verdict.passed {
            self.progress.next_test += 1;
        } else {
            self.progress.lives = self.progress.lives.saturating_sub(1);
            log::info!("Lives left: {}", self.progress.lives);
        }

        if self.progress.lives == 0 {
            self.progress.lives = self.config.max_lives;
            self.progress.next_test = 1;
            self.persist_logged();
            self.enter(Screen::GameOver);
            return;
        }

        self.persist_logged();

        if self.progress.next_test > self.last_test_id() {
            self.enter(Screen::Victory);
            return;
        }

        let unlock_key = if verdict.passed {
            self.tests.get(&test_id).map(|t| t.key.clone())
        } else {
            None
        };
        self.enter(Screen::TestResult {
            test_id,
            verdict,
            unlock_key,
        });
    }

    pub fn return_to_overworld(&mut self) {
        if matches!(self.screen, Screen::TestResult { .. }) {
            self.enter(Screen::Overworld);
        }
    }

    /// Back to the overworld after GameOver or Victory, at the start tile
    pub fn restart_run(&mut self) {
        match self.screen {
            Screen::GameOver => {}
            Screen::Victory => {
                self.progress.lives = self.config.max_lives;
                self.progress.next_test = 1;
            }
            _ => return,
        }

        let (name, gender) = match &self.session {
            Some(session) => (session.player.name.clone(), session.player.gender),
            None => (String::new(), Gender::default()),
        };
        self.session = Some(Overworld::new(self.fresh_player(name, gender)));
        self.persist_logged();
        self.enter(Screen::Overworld);
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Write progress and the player snapshot as one record.
    /// Nothing is written before a player exists.
    pub fn persist(&mut self) -> GameResult<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        let record = SaveRecord::snapshot(self.progress.lives, self.progress.next_test, &session.player);
        self.store.save(&record)?;
        log::info!(
            "Saved progress: lives={}, next test={}",
            self.progress.lives,
            self.progress.next_test
        );
        Ok(())
    }

    fn persist_logged(&mut self) {
        if let Err(e) = self.persist() {
            log::error!("Failed to save progress: {}", e);
            self.last_error = Some(e.to_string());
        }
    }

    /// Explicit save from the settings panel
    pub fn save(&mut self) -> GameResult<()> {
        self.persist()
    }

    /// Final flush on teardown
    pub fn shutdown(&mut self) {
        log::info!("Shutting down");
        self.persist_logged();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContent;
    use crate::game::entities::Direction;
    use crate::game::npc::Npc;
    use crate::quiz::{DropDownQuestion, FillInGapQuestion, MultipleChoiceQuestion, QuestionSet, TestKind};
    use crate::save::MemorySaveStore;

    fn content() -> MemoryContent {
        MemoryContent::new()
            .with_test(
                TestDefinition::new(1, TestKind::MultipleChoice, "history", "OWL"),
                QuestionSet::MultipleChoice(vec![MultipleChoiceQuestion::new(
                    "Oldest building?",
                    ["Library", "Chapel", "Gym", "Lab"],
                    "b",
                )]),
            )
            .with_test(
                TestDefinition::new(2, TestKind::FillInGap, "spanish", "LANTERN"),
                QuestionSet::FillInGap(vec![FillInGapQuestion::new("___ mundo", &["hola"])]),
            )
            .with_test(
                TestDefinition::new(3, TestKind::DropDown, "grammar", "KEYSTONE"),
                QuestionSet::DropDown(vec![DropDownQuestion::new("I ___ it", &["like", "likes"], &["like"])]),
            )
            .with_npc(Npc::test("Marta", 13, 69, 1, "History first.", "Marta waits south."))
            .with_npc(Npc::test("Luis", 15, 70, 2, "Spanish now.", "Luis is east."))
    }

    fn start(content: MemoryContent, store: MemorySaveStore) -> GameResult<GameFlow<MemoryContent, MemorySaveStore>> {
        GameFlow::start(GameConfig::default(), Tilemap::bordered(140, 100), content, store)
    }

    fn flow_with(record: SaveRecord) -> GameFlow<MemoryContent, MemorySaveStore> {
        start(content(), MemorySaveStore::with_record(record)).unwrap()
    }

    fn new_game() -> GameFlow<MemoryContent, MemorySaveStore> {
        let mut flow = flow_with(SaveRecord::new());
        flow.continue_from_title();
        assert!(flow.select_character("Ana", Gender::Girl));
        flow
    }

    fn pass() -> Verdict {
        Verdict::from_results(vec![1])
    }

    fn fail() -> Verdict {
        Verdict::from_results(vec![0])
    }

    fn saved(lives: u8, next_test: u32) -> SaveRecord {
        let player = Player::new("Ana".to_string(), Gender::Girl, 40, 40, Direction::Left);
        SaveRecord::snapshot(lives, next_test, &player)
    }

    #[test]
    fn test_new_session_without_save() {
        let flow = flow_with(SaveRecord::new());
        assert_eq!(flow.progress(), Progress { lives: 3, next_test: 1, has_save: false });
        assert!(matches!(flow.screen(), Screen::Title));
    }

    #[test]
    fn test_resumed_session_restores_progress_and_player() {
        let mut flow = flow_with(saved(2, 3));
        assert_eq!(flow.progress(), Progress { lives: 2, next_test: 3, has_save: true });

        flow.continue_from_title();
        assert!(matches!(flow.screen(), Screen::Overworld));
        let player = flow.player().unwrap();
        assert_eq!(player.tile(), (40, 40));
        assert_eq!(player.direction, Direction::Left);
    }

    #[test]
    fn test_partial_save_is_a_new_game() {
        let mut record = SaveRecord::new();
        record.set("lives", "2");
        let mut flow = flow_with(record);
        assert!(!flow.progress().has_save);
        flow.continue_from_title();
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
    }

    #[test]
    fn test_start_over_discards_save() {
        let mut flow = flow_with(saved(1, 3));
        flow.start_over();
        assert_eq!(flow.progress(), Progress { lives: 3, next_test: 1, has_save: false });
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
        assert!(!flow.select_character("   ", Gender::Boy));
        assert!(flow.select_character("Leo", Gender::Boy));
        assert_eq!(flow.player().unwrap().tile(), (13, 70));
    }

    #[test]
    fn test_out_of_order_request_is_ignored() {
        let mut flow = new_game();
        assert!(!flow.request_test(2).unwrap());
        assert!(!flow.request_test(0).unwrap());
        assert!(matches!(flow.screen(), Screen::Overworld));
        assert_eq!(flow.store().writes(), 0);
    }

    #[test]
    fn test_ordering_holds_after_a_pass() {
        let mut flow = new_game();
        flow.request_test(1).unwrap();
        flow.complete_test(pass());
        flow.return_to_overworld();
        let writes = flow.store().writes();

        assert!(!flow.request_test(1).unwrap());
        assert!(!flow.request_test(3).unwrap());
        assert!(matches!(flow.screen(), Screen::Overworld));
        assert_eq!(flow.progress().next_test, 2);
        assert_eq!(flow.store().writes(), writes);
    }

    #[test]
    fn test_verdict_outside_a_test_is_ignored() {
        let mut flow = flow_with(SaveRecord::new());
        flow.complete_test(fail());
        assert!(matches!(flow.screen(), Screen::Title));
        assert_eq!(flow.progress(), Progress { lives: 3, next_test: 1, has_save: false });

        let mut flow = new_game();
        flow.complete_test(pass());
        assert!(matches!(flow.screen(), Screen::Overworld));
        assert_eq!(flow.progress().next_test, 1);
        assert_eq!(flow.store().writes(), 0);
    }

    #[test]
    fn test_zero_max_lives_does_not_end_every_run() {
        let config = GameConfig { max_lives: 0, ..GameConfig::default() };
        let mut flow = GameFlow::start(config, Tilemap::bordered(140, 100), content(), MemorySaveStore::new()).unwrap();
        assert_eq!(flow.progress().lives, 3);

        flow.continue_from_title();
        flow.select_character("Ana", Gender::Girl);
        flow.request_test(1).unwrap();
        flow.complete_test(pass());
        assert!(matches!(flow.screen(), Screen::TestResult { .. }));
        assert_eq!(flow.progress().next_test, 2);
    }

    #[test]
    fn test_request_persists_then_enters_quiz() {
        let mut flow = new_game();
        assert!(flow.request_test(1).unwrap());
        assert_eq!(flow.store().writes(), 1);
        match flow.screen() {
            Screen::TestInProgress { test_id, quiz } => {
                assert_eq!(*test_id, 1);
                assert_eq!(quiz.kind(), TestKind::MultipleChoice);
            }
            other => panic!("unexpected screen {}", other.name()),
        }
    }

    #[test]
    fn test_unknown_test_is_an_error() {
        let mut flow = new_game();
        flow.progress.next_test = 3;
        flow.tests.remove(&3);
        assert!(matches!(flow.request_test(3), Err(GameError::UnknownTest(3))));
        assert!(matches!(flow.screen(), Screen::Overworld));
    }

    #[test]
    fn test_pass_advances_pointer_and_shows_key() {
        let mut flow = new_game();
        flow.request_test(1).unwrap();
        if let Some(ActiveQuiz::MultipleChoice(quiz)) = flow.quiz_mut() {
            quiz.select_option(1);
        }
        let step = flow.advance_quiz().unwrap();
        assert!(matches!(step, QuizStep::Finished(Verdict { passed: true, .. })));
        assert_eq!(flow.progress().next_test, 2);
        assert_eq!(flow.progress().lives, 3);
        match flow.screen() {
            Screen::TestResult { unlock_key, verdict, .. } => {
                assert_eq!(unlock_key.as_deref(), Some("OWL"));
                assert_eq!(verdict.results, vec![1]);
            }
            other => panic!("unexpected screen {}", other.name()),
        }
        assert_eq!(flow.store().record().next_test(), Some(2));

        flow.return_to_overworld();
        assert!(matches!(flow.screen(), Screen::Overworld));
    }

    #[test]
    fn test_fail_costs_exactly_one_life() {
        let mut flow = new_game();
        flow.request_test(1).unwrap();
        // default selection 'a' is wrong
        flow.advance_quiz();
        assert_eq!(flow.progress().lives, 2);
        assert_eq!(flow.progress().next_test, 1);
        match flow.screen() {
            Screen::TestResult { unlock_key, .. } => assert!(unlock_key.is_none()),
            other => panic!("unexpected screen {}", other.name()),
        }
    }

    #[test]
    fn test_last_life_lost_resets_run() {
        let mut flow = flow_with(saved(1, 2));
        flow.continue_from_title();
        flow.request_test(2).unwrap();
        flow.complete_test(fail());

        assert!(matches!(flow.screen(), Screen::GameOver));
        assert_eq!(flow.progress().lives, 3);
        assert_eq!(flow.progress().next_test, 1);
        assert_eq!(flow.store().record().lives(), Some(3));
        assert_eq!(flow.store().record().next_test(), Some(1));

        flow.restart_run();
        assert!(matches!(flow.screen(), Screen::Overworld));
        assert_eq!(flow.player().unwrap().tile(), (13, 70));
        assert_eq!(flow.player().unwrap().name, "Ana");
    }

    #[test]
    fn test_passing_final_test_is_victory() {
        let mut flow = flow_with(saved(3, 3));
        flow.continue_from_title();
        flow.request_test(3).unwrap();
        flow.complete_test(pass());
        assert!(matches!(flow.screen(), Screen::Victory));
        assert_eq!(flow.store().record().next_test(), Some(4));

        flow.restart_run();
        assert_eq!(flow.progress().next_test, 1);
        assert_eq!(flow.progress().lives, 3);
        assert!(matches!(flow.screen(), Screen::Overworld));
    }

    #[test]
    fn test_finished_save_resumes_to_victory() {
        let mut flow = flow_with(saved(2, 4));
        flow.continue_from_title();
        assert!(matches!(flow.screen(), Screen::Victory));
    }

    #[test]
    fn test_broken_content_reported_and_stays_in_overworld() {
        let content = MemoryContent::new().with_test(
            TestDefinition::new(1, TestKind::DropDown, "grammar", "K"),
            QuestionSet::FillInGap(vec![FillInGapQuestion::new("___", &["x"])]),
        );
        let mut flow = start(content, MemorySaveStore::new()).unwrap();
        flow.continue_from_title();
        flow.select_character("Ana", Gender::Girl);
        assert!(flow.request_test(1).is_err());
        assert!(matches!(flow.screen(), Screen::Overworld));
    }

    #[test]
    fn test_dialogue_confirm_starts_test_through_update() {
        let mut flow = new_game();
        // Marta stands right below the start tile
        let talk = OverworldInput { interact: true, ..Default::default() };
        assert_eq!(flow.update_overworld(0.016, &talk), Some(OverworldEvent::DialogueOpened));
        assert_eq!(flow.dialogue().map(|d| d.text.as_str()), Some("Marta: History first."));
        flow.update_overworld(0.016, &talk);
        assert_eq!(flow.update_overworld(0.016, &talk), Some(OverworldEvent::RequestTest(1)));
        assert!(matches!(flow.screen(), Screen::TestInProgress { .. }));
    }

    #[test]
    fn test_save_and_shutdown_write_whole_record() {
        let mut flow = flow_with(SaveRecord::new());
        // no player yet, nothing to write
        flow.shutdown();
        assert_eq!(flow.store().writes(), 0);

        flow.continue_from_title();
        flow.select_character("Ana", Gender::Girl);
        flow.save().unwrap();
        flow.shutdown();
        assert_eq!(flow.store().writes(), 2);
        assert_eq!(flow.store().record().name(), Some("Ana"));
        assert_eq!(flow.store().record().position(), Some((13, 70)));
    }
}
