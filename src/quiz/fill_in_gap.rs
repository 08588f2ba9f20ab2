use super::engine::{Gradable, QuizEngine};
use super::question::FillInGapQuestion;

impl Gradable for FillInGapQuestion {
    /// Typed text, one entry per blank
    type Answer = Vec<String>;

    fn prompt(&self) -> &str {
        &self.prompt
    }

    fn initial_answer(&self) -> Vec<String> {
        vec![String::new(); self.blanks()]
    }

    /// Exact, case-sensitive, untrimmed match on every blank
    fn is_correct(&self, answer: &Vec<String>) -> bool {
        answer.len() == self.answers.len() && answer.iter().zip(&self.answers).all(|(typed, expected)| typed == expected)
    }
}

impl QuizEngine<FillInGapQuestion> {
    pub fn set_blank(&mut self, blank: usize, text: &str) {
        if let Some(slot) = self.current_answer_mut().get_mut(blank) {
            *slot = text.to_string();
        }
    }

    pub fn push_char(&mut self, blank: usize, c: char) {
        if let Some(slot) = self.current_answer_mut().get_mut(blank) {
            slot.push(c);
        }
    }

    pub fn pop_char(&mut self, blank: usize) {
        if let Some(slot) = self.current_answer_mut().get_mut(blank) {
            slot.pop();
        }
    }

    pub fn blank_count(&self) -> usize {
        self.current().blanks()
    }
}
