pub mod drop_down;
pub mod engine;
pub mod fill_in_gap;
pub mod multiple_choice;
pub mod question;

pub use engine::{ActiveQuiz, Gradable, QuizEngine, QuizStep, Verdict};
pub use question::{
    DropDownQuestion, FillInGapQuestion, MultipleChoiceQuestion, QuestionSet, TestKind, OPTION_COUNT, OPTION_LETTERS,
};
