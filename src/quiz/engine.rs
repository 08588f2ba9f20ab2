//! Control flow shared by every quiz shape: step through the questions,
//! keep one answer buffer per question, reduce to a verdict at the end.

use std::fmt;

use crate::error::{GameError, GameResult};

use super::question::{DropDownQuestion, FillInGapQuestion, MultipleChoiceQuestion, QuestionSet, TestKind};

/// A question shape that can be answered and graded
pub trait Gradable {
    type Answer: Clone + fmt::Debug;

    fn prompt(&self) -> &str;

    /// Answer held before the player changes anything
    fn initial_answer(&self) -> Self::Answer;

    /// True only when every blank/selection matches
    fn is_correct(&self, answer: &Self::Answer) -> bool;
}

/// Outcome of a finished attempt: pass flag plus one mark per question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    /// 1 for a fully correct question, 0 otherwise
    pub results: Vec<u8>,
    pub score: usize,
}

impl Verdict {
    /// Passing requires a perfect run
    pub fn from_results(results: Vec<u8>) -> Self {
        let score = results.iter().filter(|&&r| r == 1).count();
        Self {
            passed: score == results.len(),
            results,
            score,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// What `advance` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStep {
    /// Moved on to the question at this index
    Next(usize),
    Finished(Verdict),
}

/// One attempt at one test. Discarded once the verdict is handed back.
#[derive(Debug, Clone)]
pub struct QuizEngine<Q: Gradable> {
    questions: Vec<Q>,
    answers: Vec<Q::Answer>,
    current_index: usize,
    score: usize,
}

impl<Q: Gradable> QuizEngine<Q> {
    pub fn new(questions: Vec<Q>) -> GameResult<Self> {
        if questions.is_empty() {
            return Err(GameError::malformed("quiz", "a test needs at least one question"));
        }
        let answers = questions.iter().map(Gradable::initial_answer).collect();
        Ok(Self {
            questions,
            answers,
            current_index: 0,
            score: 0,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn current(&self) -> &Q {
        &self.questions[self.current_index]
    }

    pub fn current_answer(&self) -> &Q::Answer {
        &self.answers[self.current_index]
    }

    pub(crate) fn current_answer_mut(&mut self) -> &mut Q::Answer {
        &mut self.answers[self.current_index]
    }

    /// Next question, or the verdict when the last one is confirmed
    pub fn advance(&mut self) -> QuizStep {
        if self.is_last() {
            return QuizStep::Finished(self.evaluate());
        }
        self.current_index += 1;
        QuizStep::Next(self.current_index)
    }

    /// Grade every question against its recorded answer
    pub fn evaluate(&mut self) -> Verdict {
        let results: Vec<u8> = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| u8::from(question.is_correct(answer)))
            .collect();
        let verdict = Verdict::from_results(results);
        self.score = verdict.score;
        verdict
    }
}

/// The engine running the current test, whatever its shape
#[derive(Debug, Clone)]
pub enum ActiveQuiz {
    MultipleChoice(QuizEngine<MultipleChoiceQuestion>),
    FillInGap(QuizEngine<FillInGapQuestion>),
    DropDown(QuizEngine<DropDownQuestion>),
}

impl ActiveQuiz {
    pub fn from_set(set: QuestionSet) -> GameResult<Self> {
        Ok(match set {
            QuestionSet::MultipleChoice(q) => ActiveQuiz::MultipleChoice(QuizEngine::new(q)?),
            QuestionSet::FillInGap(q) => ActiveQuiz::FillInGap(QuizEngine::new(q)?),
            QuestionSet::DropDown(q) => ActiveQuiz::DropDown(QuizEngine::new(q)?),
        })
    }

    pub fn kind(&self) -> TestKind {
        match self {
            ActiveQuiz::MultipleChoice(_) => TestKind::MultipleChoice,
            ActiveQuiz::FillInGap(_) => TestKind::FillInGap,
            ActiveQuiz::DropDown(_) => TestKind::DropDown,
        }
    }

    pub fn current_index(&self) -> usize {
        match self {
            ActiveQuiz::MultipleChoice(e) => e.current_index(),
            ActiveQuiz::FillInGap(e) => e.current_index(),
            ActiveQuiz::DropDown(e) => e.current_index(),
        }
    }

    pub fn total(&self) -> usize {
        match self {
            ActiveQuiz::MultipleChoice(e) => e.total(),
            ActiveQuiz::FillInGap(e) => e.total(),
            ActiveQuiz::DropDown(e) => e.total(),
        }
    }

    pub fn is_last(&self) -> bool {
        match self {
            ActiveQuiz::MultipleChoice(e) => e.is_last(),
            ActiveQuiz::FillInGap(e) => e.is_last(),
            ActiveQuiz::DropDown(e) => e.is_last(),
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            ActiveQuiz::MultipleChoice(e) => e.current().prompt(),
            ActiveQuiz::FillInGap(e) => e.current().prompt(),
            ActiveQuiz::DropDown(e) => e.current().prompt(),
        }
    }

    pub fn advance(&mut self) -> QuizStep {
        match self {
            ActiveQuiz::MultipleChoice(e) => e.advance(),
            ActiveQuiz::FillInGap(e) => e.advance(),
            ActiveQuiz::DropDown(e) => e.advance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal shape: the answer is a bool, correct when true
    #[derive(Debug, Clone)]
    struct Flag(&'static str);

    impl Gradable for Flag {
        type Answer = bool;

        fn prompt(&self) -> &str {
            self.0
        }

        fn initial_answer(&self) -> bool {
            false
        }

        fn is_correct(&self, answer: &bool) -> bool {
            *answer
        }
    }

    fn engine(n: usize) -> QuizEngine<Flag> {
        QuizEngine::new((0..n).map(|_| Flag("?")).collect()).unwrap()
    }

    #[test]
    fn test_empty_quiz_rejected() {
        assert!(matches!(
            QuizEngine::<Flag>::new(Vec::new()),
            Err(GameError::MalformedContent { .. })
        ));
    }

    #[test]
    fn test_perfect_run_passes() {
        let verdict = Verdict::from_results(vec![1, 1, 1]);
        assert!(verdict.passed);
        assert_eq!(verdict.score, 3);
    }

    #[test]
    fn test_one_miss_fails() {
        let verdict = Verdict::from_results(vec![1, 0, 1]);
        assert!(!verdict.passed);
        assert_eq!(verdict.score, 2);
        assert_eq!(verdict.total(), 3);
    }

    #[test]
    fn test_advance_walks_questions_then_finishes() {
        let mut quiz = engine(3);
        assert_eq!(quiz.current_index(), 0);
        *quiz.current_answer_mut() = true;
        assert_eq!(quiz.advance(), QuizStep::Next(1));
        assert_eq!(quiz.advance(), QuizStep::Next(2));
        assert!(quiz.is_last());
        *quiz.current_answer_mut() = true;

        match quiz.advance() {
            QuizStep::Finished(verdict) => {
                assert_eq!(verdict.results, vec![1, 0, 1]);
                assert!(!verdict.passed);
            }
            other => panic!("expected verdict, got {:?}", other),
        }
        assert_eq!(quiz.score(), 2);
    }

    #[test]
    fn test_single_question_quiz_finishes_on_first_advance() {
        let mut quiz = engine(1);
        *quiz.current_answer_mut() = true;
        assert_eq!(
            quiz.advance(),
            QuizStep::Finished(Verdict { passed: true, results: vec![1], score: 1 })
        );
    }
}
