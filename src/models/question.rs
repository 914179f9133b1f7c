use rand::Rng;

use crate::decode::decode_entities;
use crate::shuffle::shuffle;

pub const NUM_OPTIONS: usize = 4;

/// A multiple-choice question as received from the provider.
///
/// Text is kept in its raw, entity-encoded form; decode before display
/// or comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub correct_answer: String,
    pub options: [String; NUM_OPTIONS],
}

impl Question {
    /// Build a question from the correct answer and its three distractors,
    /// shuffling the four options.
    ///
    /// Returns the number of incorrect answers received when it is not three.
    pub fn from_answers<R: Rng + ?Sized>(
        prompt: String,
        correct_answer: String,
        incorrect_answers: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, usize> {
        let received = incorrect_answers.len();
        if received != NUM_OPTIONS - 1 {
            return Err(received);
        }

        let mut options = incorrect_answers;
        options.push(correct_answer.clone());
        shuffle(&mut options, rng);

        let options: [String; NUM_OPTIONS] = options.try_into().map_err(|_| received)?;

        Ok(Self {
            prompt,
            correct_answer,
            options,
        })
    }

    /// True when the option at `index` shows the same text as the correct answer.
    pub fn is_correct_option(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| decode_entities(option) == decode_entities(&self.correct_answer))
    }

    /// Index of the first option whose decoded text matches the correct answer.
    pub fn correct_option_index(&self) -> Option<usize> {
        let correct = decode_entities(&self.correct_answer);
        self.options
            .iter()
            .position(|option| decode_entities(option) == correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_answers_contains_correct_once() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let question = Question::from_answers(
                "Capital of France?".to_string(),
                "Paris".to_string(),
                strings(&["Lyon", "Nice", "Lille"]),
                &mut rng,
            )
            .unwrap();

            assert_eq!(question.options.len(), NUM_OPTIONS);
            let hits = question.options.iter().filter(|o| *o == "Paris").count();
            assert_eq!(hits, 1);
            assert_eq!(
                question.options[question.correct_option_index().unwrap()],
                "Paris"
            );
        }
    }

    #[test]
    fn test_from_answers_rejects_wrong_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = Question::from_answers(
            "True or false?".to_string(),
            "True".to_string(),
            strings(&["False"]),
            &mut rng,
        );
        assert_eq!(result, Err(1));
    }

    #[test]
    fn test_correct_option_compares_decoded_text() {
        let question = Question {
            prompt: "Which company?".to_string(),
            correct_answer: "AT&amp;T".to_string(),
            options: [
                "Verizon".to_string(),
                "AT&T".to_string(),
                "Sprint".to_string(),
                "T-Mobile".to_string(),
            ],
        };

        assert!(question.is_correct_option(1));
        assert!(!question.is_correct_option(0));
        assert!(!question.is_correct_option(7));
        assert_eq!(question.correct_option_index(), Some(1));
    }
}
