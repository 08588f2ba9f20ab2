use super::engine::{Gradable, QuizEngine};
use super::question::{MultipleChoiceQuestion, OPTION_COUNT, OPTION_LETTERS};

impl Gradable for MultipleChoiceQuestion {
    /// The selected option letter, always lowercase
    type Answer = char;

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn initial_answer(&self) -> char {
        OPTION_LETTERS[0]
    }

    // Only the first character of the stored answer counts, and the comparison
    // is case-sensitive: a stored "B" never matches a selected 'b'.
    fn is_correct(&self, answer: &char) -> bool {
        self.correct_letter() == Some(*answer)
    }
}

impl QuizEngine<MultipleChoiceQuestion> {
    /// Select an option by position (0..4). Out-of-range positions are ignored.
    pub fn select_option(&mut self, index: usize) {
        if index < OPTION_COUNT {
            *self.current_answer_mut() = OPTION_LETTERS[index];
        }
    }

    /// Position of the current selection
    pub fn selected_index(&self) -> usize {
        OPTION_LETTERS
            .iter()
            .position(|c| c == self.current_answer())
            .unwrap_or(0)
    }

    pub fn select_next(&mut self) {
        let next = (self.selected_index() + 1) % OPTION_COUNT;
        self.select_option(next);
    }

    pub fn select_previous(&mut self) {
        let prev = (self.selected_index() + OPTION_COUNT - 1) % OPTION_COUNT;
        self.select_option(prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::engine::QuizStep;

    fn quiz() -> QuizEngine<MultipleChoiceQuestion> {
        QuizEngine::new(vec![
            MultipleChoiceQuestion::new("Capital of France?", ["Rome", "Paris", "Oslo", "Lima"], "b"),
            MultipleChoiceQuestion::new("2 + 2?", ["4", "5", "6", "7"], "a"),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_selection_is_first_option() {
        let mut quiz = quiz();
        assert_eq!(*quiz.current_answer(), 'a');
        quiz.advance();
        // untouched second question keeps 'a', which is correct here
        match quiz.advance() {
            QuizStep::Finished(verdict) => assert_eq!(verdict.results, vec![0, 1]),
            other => panic!("expected verdict, got {:?}", other),
        }
    }

    #[test]
    fn test_all_correct_passes() {
        let mut quiz = quiz();
        quiz.select_option(1);
        quiz.advance();
        let verdict = quiz.evaluate();
        assert!(verdict.passed);
        assert_eq!(verdict.score, 2);
    }

    #[test]
    fn test_stored_uppercase_answer_never_matches() {
        let q = MultipleChoiceQuestion::new("?", ["w", "x", "y", "z"], "B");
        assert!(!q.is_correct(&'b'));
        assert!(!q.is_correct(&'a'));
    }

    #[test]
    fn test_only_first_character_counts() {
        let q = MultipleChoiceQuestion::new("?", ["w", "x", "y", "z"], "c) y");
        assert!(q.is_correct(&'c'));
    }

    #[test]
    fn test_selection_wraps_and_ignores_out_of_range() {
        let mut quiz = quiz();
        quiz.select_previous();
        assert_eq!(*quiz.current_answer(), 'd');
        quiz.select_next();
        assert_eq!(*quiz.current_answer(), 'a');
        quiz.select_option(7);
        assert_eq!(quiz.selected_index(), 0);
    }
}
