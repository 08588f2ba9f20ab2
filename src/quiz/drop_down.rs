use super::engine::{Gradable, QuizEngine};
use super::question::DropDownQuestion;

impl Gradable for DropDownQuestion {
    /// Selected option index per blank
    type Answer = Vec<usize>;

    fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Every selector starts on the first option
    fn initial_answer(&self) -> Vec<usize> {
        vec![0; self.blanks()]
    }

    fn is_correct(&self, answer: &Vec<usize>) -> bool {
        answer.len() == self.answers.len()
            && answer.iter().zip(&self.answers).all(|(&selected, expected)| {
                self.options.get(selected).is_some_and(|option| option == expected)
            })
    }
}

impl QuizEngine<DropDownQuestion> {
    /// Point one blank at an option. Out-of-range blanks or options are ignored.
    pub fn select(&mut self, blank: usize, option: usize) {
        if option >= self.current().options.len() {
            return;
        }
        if let Some(slot) = self.current_answer_mut().get_mut(blank) {
            *slot = option;
        }
    }

    pub fn cycle(&mut self, blank: usize, forward: bool) {
        let count = self.current().options.len();
        if count == 0 {
            return;
        }
        let Some(&selected) = self.current_answer().get(blank) else {
            return;
        };
        let next = if forward { (selected + 1) % count } else { (selected + count - 1) % count };
        self.select(blank, next);
    }

    pub fn blank_count(&self) -> usize {
        self.current().blanks()
    }

    /// Text of the option currently chosen for a blank
    pub fn selected_text(&self, blank: usize) -> Option<&str> {
        let selected = *self.current_answer().get(blank)?;
        self.current().options.get(selected).map(String::as_str)
    }
}
