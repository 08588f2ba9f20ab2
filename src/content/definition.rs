//! Content Definition Structures
//!
//! Raw records as they appear in the TOML data files, and their conversion
//! into the validated game types.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{GameError, GameResult};
use crate::game::Npc;
use crate::quiz::{DropDownQuestion, FillInGapQuestion, MultipleChoiceQuestion, QuestionSet, TestKind, OPTION_COUNT};

// ============================================================================
// Tests
// ============================================================================

/// `tests.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct RawTestsFile {
    #[serde(rename = "test", default)]
    pub tests: Vec<RawTest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTest {
    pub id: u32,
    pub kind: TestKind,
    /// Name of the question set under `questions/`
    pub content: String,
    /// Unlock key revealed on a pass
    #[serde(default)]
    pub key: String,
}

/// One gated test in the required order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    pub id: u32,
    pub kind: TestKind,
    pub content: String,
    pub key: String,
}

impl TestDefinition {
    pub fn new(id: u32, kind: TestKind, content: &str, key: &str) -> Self {
        Self {
            id,
            kind,
            content: content.to_string(),
            key: key.to_string(),
        }
    }

    pub fn from_raw(raw: RawTest) -> Self {
        Self {
            id: raw.id,
            kind: raw.kind,
            content: raw.content,
            key: raw.key,
        }
    }
}

/// Index tests by id, rejecting duplicates and any gap in `1..=K`
pub fn index_tests(tests: Vec<TestDefinition>) -> GameResult<BTreeMap<u32, TestDefinition>> {
    let mut by_id = BTreeMap::new();
    for test in tests {
        let id = test.id;
        if by_id.insert(id, test).is_some() {
            return Err(GameError::malformed("tests", format!("test {} is defined twice", id)));
        }
    }

    for (expected, id) in (1u32..).zip(by_id.keys()) {
        if *id != expected {
            return Err(GameError::malformed(
                "tests",
                format!("test ids must run 1..={} without gaps, found {} where {} was expected", by_id.len(), id, expected),
            ));
        }
    }

    Ok(by_id)
}

// ============================================================================
// NPCs
// ============================================================================

/// `npcs.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct RawNpcsFile {
    #[serde(rename = "npc", default)]
    pub npcs: Vec<RawNpc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNpc {
    pub name: String,
    pub x: i32,
    pub y: i32,
    /// Test this NPC gates; without one the NPC is a flavor character
    pub test: Option<u32>,
    #[serde(default)]
    pub dialog: String,
    #[serde(default)]
    pub rest_dialog: String,
}

impl RawNpc {
    pub fn to_npc(&self) -> Npc {
        match self.test {
            Some(test_id) => Npc::test(&self.name, self.x, self.y, test_id, &self.dialog, &self.rest_dialog),
            None => Npc::flavor(&self.name, self.x, self.y, &self.dialog),
        }
    }
}

// ============================================================================
// Questions
// ============================================================================

/// `questions/<content>.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestionFile {
    #[serde(rename = "question", default)]
    pub questions: Vec<RawQuestion>,
}

/// Union of the fields the three shapes use; which ones matter depends on the test kind
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct: String,
    /// Declared blank count; defaults to the number of answers given
    pub blanks: Option<usize>,
    /// Declared drop-down option count; defaults to the number of options given
    pub option_count: Option<usize>,
    #[serde(default)]
    pub answers: Vec<String>,
}

/// Stretch a list to its declared length. Short lists are padded with empty
/// strings; long lists are rejected.
fn fit_declared(mut values: Vec<String>, declared: usize, context: &str, what: &str) -> GameResult<Vec<String>> {
    if values.len() > declared {
        return Err(GameError::malformed(
            context,
            format!("{} {} given but {} declared", values.len(), what, declared),
        ));
    }
    if values.len() < declared {
        log::warn!(
            "{}: only {} of {} {} given, padding with empty entries",
            context,
            values.len(),
            declared,
            what
        );
        values.resize(declared, String::new());
    }
    Ok(values)
}

impl RawQuestion {
    fn into_multiple_choice(self, context: &str) -> GameResult<MultipleChoiceQuestion> {
        let options = fit_declared(self.options, OPTION_COUNT, context, "options")?;
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| GameError::malformed(context, "multiple choice needs exactly four options"))?;
        if self.correct.is_empty() {
            log::warn!("{}: no correct answer stored, no option can match", context);
        }
        Ok(MultipleChoiceQuestion {
            prompt: self.prompt,
            options,
            correct: self.correct,
        })
    }

    fn into_fill_in_gap(self, context: &str) -> GameResult<FillInGapQuestion> {
        let blanks = self.blanks.unwrap_or(self.answers.len());
        let answers = fit_declared(self.answers, blanks, context, "answers")?;
        Ok(FillInGapQuestion {
            prompt: self.prompt,
            answers,
        })
    }

    fn into_drop_down(self, context: &str) -> GameResult<DropDownQuestion> {
        let option_count = self.option_count.unwrap_or(self.options.len());
        if option_count == 0 {
            return Err(GameError::malformed(context, "drop-down question has no options"));
        }
        let options = fit_declared(self.options, option_count, context, "options")?;

        let blanks = self.blanks.unwrap_or(self.answers.len());
        let answers = fit_declared(self.answers, blanks, context, "answers")?;

        if let Some(stray) = answers.iter().find(|answer| !options.contains(answer)) {
            return Err(GameError::malformed(
                context,
                format!("answer {:?} is not one of the options", stray),
            ));
        }

        Ok(DropDownQuestion {
            prompt: self.prompt,
            options,
            answers,
        })
    }
}

/// Convert raw records into a question set of the given shape, keeping file order
pub fn build_question_set(kind: TestKind, raw: Vec<RawQuestion>, source: &str) -> GameResult<QuestionSet> {
    if raw.is_empty() {
        return Err(GameError::malformed(source, "question set is empty"));
    }

    let context = |index: usize| format!("{} question {}", source, index + 1);

    let set = match kind {
        TestKind::MultipleChoice => QuestionSet::MultipleChoice(
            raw.into_iter()
                .enumerate()
                .map(|(i, q)| q.into_multiple_choice(&context(i)))
                .collect::<GameResult<_>>()?,
        ),
        TestKind::FillInGap => QuestionSet::FillInGap(
            raw.into_iter()
                .enumerate()
                .map(|(i, q)| q.into_fill_in_gap(&context(i)))
                .collect::<GameResult<_>>()?,
        ),
        TestKind::DropDown => QuestionSet::DropDown(
            raw.into_iter()
                .enumerate()
                .map(|(i, q)| q.into_drop_down(&context(i)))
                .collect::<GameResult<_>>()?,
        ),
    };

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_questions(toml_src: &str) -> Vec<RawQuestion> {
        toml::from_str::<RawQuestionFile>(toml_src).unwrap().questions
    }

    #[test]
    fn test_contiguous_ids_accepted() {
        let tests = vec![
            TestDefinition::new(2, TestKind::FillInGap, "t2", "KEY-2"),
            TestDefinition::new(1, TestKind::MultipleChoice, "t1", "KEY-1"),
        ];
        let indexed = index_tests(tests).unwrap();
        assert_eq!(indexed.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_gap_in_ids_rejected() {
        let tests = vec![
            TestDefinition::new(1, TestKind::MultipleChoice, "t1", ""),
            TestDefinition::new(3, TestKind::MultipleChoice, "t3", ""),
        ];
        assert!(matches!(index_tests(tests), Err(GameError::MalformedContent { .. })));

        let dup = vec![
            TestDefinition::new(1, TestKind::MultipleChoice, "a", ""),
            TestDefinition::new(1, TestKind::DropDown, "b", ""),
        ];
        assert!(index_tests(dup).is_err());
    }

    #[test]
    fn test_npc_without_test_is_flavor() {
        let file: RawNpcsFile = toml::from_str(
            r#"
            [[npc]]
            name = "Marta"
            x = 10
            y = 12
            test = 1
            dialog = "Ready?"
            rest_dialog = "Find Marta by the library"

            [[npc]]
            name = "Porter"
            x = 3
            y = 4
            dialog = "Mind the step."
            "#,
        )
        .unwrap();
        let npcs: Vec<Npc> = file.npcs.iter().map(RawNpc::to_npc).collect();
        assert_eq!(npcs[0].test_id(), Some(1));
        assert_eq!(npcs[1].test_id(), None);
    }

    #[test]
    fn test_multiple_choice_pads_missing_options() {
        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "Pick one"
            options = ["x", "y", "z"]
            correct = "c"
            "#,
        );
        let QuestionSet::MultipleChoice(questions) = build_question_set(TestKind::MultipleChoice, raw, "t1").unwrap() else {
            panic!("wrong shape");
        };
        assert_eq!(questions[0].options[3], "");
        assert_eq!(questions[0].correct_letter(), Some('c'));
    }

    #[test]
    fn test_extra_entries_rejected() {
        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "Pick one"
            options = ["a", "b", "c", "d", "e"]
            correct = "a"
            "#,
        );
        assert!(matches!(
            build_question_set(TestKind::MultipleChoice, raw, "t1"),
            Err(GameError::MalformedContent { .. })
        ));

        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "___"
            blanks = 1
            answers = ["one", "two"]
            "#,
        );
        assert!(build_question_set(TestKind::FillInGap, raw, "t2").is_err());
    }

    #[test]
    fn test_fill_in_gap_declared_blanks_govern() {
        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "___ and ___"
            blanks = 2
            answers = ["salt"]
            "#,
        );
        let QuestionSet::FillInGap(questions) = build_question_set(TestKind::FillInGap, raw, "t2").unwrap() else {
            panic!("wrong shape");
        };
        assert_eq!(questions[0].answers, vec!["salt".to_string(), String::new()]);
    }

    #[test]
    fn test_drop_down_answers_must_be_options() {
        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "I ___ it"
            option_count = 2
            options = ["like", "likes"]
            answers = ["liked"]
            "#,
        );
        assert!(matches!(
            build_question_set(TestKind::DropDown, raw, "t3"),
            Err(GameError::MalformedContent { .. })
        ));
    }

    #[test]
    fn test_drop_down_loads_in_order() {
        let raw = parse_questions(
            r#"
            [[question]]
            prompt = "first ___"
            options = ["a", "b"]
            answers = ["b"]

            [[question]]
            prompt = "second ___ ___"
            options = ["a", "b"]
            answers = ["a", "b"]
            "#,
        );
        let set = build_question_set(TestKind::DropDown, raw, "t3").unwrap();
        assert_eq!(set.prompts(), vec!["first ___", "second ___ ___"]);
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            build_question_set(TestKind::FillInGap, Vec::new(), "t4"),
            Err(GameError::MalformedContent { .. })
        ));
    }
}
