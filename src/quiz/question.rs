//! Question and answer model shared by the three quiz shapes.

use serde::{Deserialize, Serialize};

/// The three question shapes a test can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestKind {
    #[serde(rename = "MC", alias = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "FG", alias = "fill_in_gap")]
    FillInGap,
    #[serde(rename = "DD", alias = "drop_down")]
    DropDown,
}

impl TestKind {
    pub fn label(&self) -> &'static str {
        match self {
            TestKind::MultipleChoice => "Multiple choice",
            TestKind::FillInGap => "Fill in the gap",
            TestKind::DropDown => "Drop-down",
        }
    }
}

/// Number of options every multiple-choice question carries
pub const OPTION_COUNT: usize = 4;

/// Option letters in display order; the initial selection is the first
pub const OPTION_LETTERS: [char; OPTION_COUNT] = ['a', 'b', 'c', 'd'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleChoiceQuestion {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    /// Only the first character is compared, case-sensitively
    pub correct: String,
}

impl MultipleChoiceQuestion {
    pub fn new(prompt: &str, options: [&str; OPTION_COUNT], correct: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.map(str::to_string),
            correct: correct.to_string(),
        }
    }

    /// Letter the stored answer resolves to (first character, as stored)
    pub fn correct_letter(&self) -> Option<char> {
        self.correct.chars().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillInGapQuestion {
    pub prompt: String,
    /// One per blank; length is the blank count and never changes
    pub answers: Vec<String>,
}

impl FillInGapQuestion {
    pub fn new(prompt: &str, answers: &[&str]) -> Self {
        Self {
            prompt: prompt.to_string(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn blanks(&self) -> usize {
        self.answers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDownQuestion {
    pub prompt: String,
    /// Shared by every blank
    pub options: Vec<String>,
    /// One per blank, each equal to one of `options`
    pub answers: Vec<String>,
}

impl DropDownQuestion {
    pub fn new(prompt: &str, options: &[&str], answers: &[&str]) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn blanks(&self) -> usize {
        self.answers.len()
    }
}

/// A loaded question set, tagged by shape. Every question in a test has the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSet {
    MultipleChoice(Vec<MultipleChoiceQuestion>),
    FillInGap(Vec<FillInGapQuestion>),
    DropDown(Vec<DropDownQuestion>),
}

impl QuestionSet {
    pub fn kind(&self) -> TestKind {
        match self {
            QuestionSet::MultipleChoice(_) => TestKind::MultipleChoice,
            QuestionSet::FillInGap(_) => TestKind::FillInGap,
            QuestionSet::DropDown(_) => TestKind::DropDown,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QuestionSet::MultipleChoice(q) => q.len(),
            QuestionSet::FillInGap(q) => q.len(),
            QuestionSet::DropDown(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn prompts(&self) -> Vec<&str> {
        match self {
            QuestionSet::MultipleChoice(q) => q.iter().map(|q| q.prompt.as_str()).collect(),
            QuestionSet::FillInGap(q) => q.iter().map(|q| q.prompt.as_str()).collect(),
            QuestionSet::DropDown(q) => q.iter().map(|q| q.prompt.as_str()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct KindHolder {
        kind: TestKind,
    }

    #[test]
    fn test_kind_tags_accept_short_and_long_names() {
        let short: KindHolder = toml::from_str("kind = \"DD\"").unwrap();
        assert_eq!(short.kind, TestKind::DropDown);
        let long: KindHolder = toml::from_str("kind = \"fill_in_gap\"").unwrap();
        assert_eq!(long.kind, TestKind::FillInGap);
        assert!(toml::from_str::<KindHolder>("kind = \"essay\"").is_err());
    }

    #[test]
    fn test_correct_letter_is_first_character() {
        let q = MultipleChoiceQuestion::new("2 + 2?", ["3", "4", "5", "22"], "b) four");
        assert_eq!(q.correct_letter(), Some('b'));
        let empty = MultipleChoiceQuestion::new("?", ["", "", "", ""], "");
        assert_eq!(empty.correct_letter(), None);
    }

    #[test]
    fn test_question_set_preserves_order() {
        let set = QuestionSet::FillInGap(vec![
            FillInGapQuestion::new("first", &["a"]),
            FillInGapQuestion::new("second", &["b", "c"]),
        ]);
        assert_eq!(set.kind(), TestKind::FillInGap);
        assert_eq!(set.len(), 2);
        assert_eq!(set.prompts(), vec!["first", "second"]);
    }
}
