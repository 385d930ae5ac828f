//! Question bank: five multiple-choice questions per tier.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tier::Tier;
use crate::error::{BankError, ConfigError, Result};

/// Questions asked per tier before pass/fail is decided.
pub const QUESTIONS_PER_TIER: usize = 5;

/// Answer options per question.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: [String; OPTIONS_PER_QUESTION],
    pub correct_index: usize,
}

impl Question {
    pub fn new(prompt: &str, options: [&str; OPTIONS_PER_QUESTION], correct_index: usize) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.map(String::from),
            correct_index,
        }
    }

    /// Label of the correct option.
    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Whether `answer` is one of the offered option labels.
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o == answer)
    }

    /// Label-based check, so it does not depend on how the options are ordered on screen.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer() == answer
    }
}

/// Immutable mapping from tier to its questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: BTreeMap<Tier, Vec<Question>>,
}

impl QuestionBank {
    /// Build a bank, checking every tier has exactly five well-formed questions.
    pub fn new(questions: BTreeMap<Tier, Vec<Question>>) -> std::result::Result<Self, BankError> {
        let bank = Self { questions };
        bank.validate()?;
        Ok(bank)
    }

    /// Load a bank from a JSON object keyed by tier code.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let questions: BTreeMap<Tier, Vec<Question>> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let bank = Self::new(questions)?;
        tracing::info!(path = %path.display(), "Loaded question bank");
        Ok(bank)
    }

    /// Check the per-tier shape of the bank.
    pub fn validate(&self) -> std::result::Result<(), BankError> {
        for tier in Tier::ALL {
            let questions = self
                .questions
                .get(&tier)
                .ok_or(BankError::MissingTier(tier))?;
            if questions.len() != QUESTIONS_PER_TIER {
                return Err(BankError::WrongQuestionCount {
                    tier,
                    count: questions.len(),
                });
            }
            for (index, q) in questions.iter().enumerate() {
                if q.correct_index >= OPTIONS_PER_QUESTION {
                    return Err(BankError::InvalidCorrectIndex {
                        tier,
                        index,
                        correct_index: q.correct_index,
                    });
                }
                let distinct: HashSet<&str> = q.options.iter().map(String::as_str).collect();
                if distinct.len() != OPTIONS_PER_QUESTION {
                    return Err(BankError::DuplicateOptions { tier, index });
                }
            }
        }
        Ok(())
    }

    /// Look up a question. An out-of-range index is an engine bug, not user error.
    pub fn question(&self, tier: Tier, index: usize) -> std::result::Result<&Question, BankError> {
        self.questions
            .get(&tier)
            .ok_or(BankError::MissingTier(tier))?
            .get(index)
            .ok_or(BankError::OutOfRange { tier, index })
    }

    /// The built-in English grammar bank.
    pub fn builtin() -> Self {
        let mut questions = BTreeMap::new();
        questions.insert(
            Tier::A1,
            vec![
                Question::new("Hello! How ___ you?", ["is", "are", "am", "be"], 1),
                Question::new("My name ___ Anna.", ["is", "are", "am", "be"], 0),
                Question::new("I ___ from Russia.", ["is", "are", "am", "be"], 2),
                Question::new("This is ___ apple.", ["a", "an", "the", "-"], 1),
                Question::new("She ___ a student.", ["is", "are", "am", "be"], 0),
            ],
        );
        questions.insert(
            Tier::A2,
            vec![
                Question::new("I ___ to school every day.", ["go", "goes", "going", "went"], 0),
                Question::new(
                    "Yesterday I ___ a movie.",
                    ["watch", "watches", "watched", "watching"],
                    2,
                ),
                Question::new(
                    "There ___ many books on the table.",
                    ["is", "are", "was", "be"],
                    1,
                ),
                Question::new(
                    "I have ___ lived in Moscow.",
                    ["ever", "never", "always", "yet"],
                    2,
                ),
                Question::new(
                    "She is ___ than her sister.",
                    ["tall", "taller", "tallest", "more tall"],
                    1,
                ),
            ],
        );
        questions.insert(
            Tier::B1,
            vec![
                Question::new(
                    "If I ___ you, I would study harder.",
                    ["am", "was", "were", "be"],
                    2,
                ),
                Question::new(
                    "The project ___ by next Monday.",
                    ["will finish", "will be finished", "finishes", "is finishing"],
                    1,
                ),
                Question::new(
                    "I've been studying English ___ five years.",
                    ["since", "for", "during", "while"],
                    1,
                ),
                Question::new(
                    "She suggested ___ to the cinema.",
                    ["go", "to go", "going", "goes"],
                    2,
                ),
                Question::new(
                    "This is the book ___ I told you about.",
                    ["what", "which", "who", "where"],
                    1,
                ),
            ],
        );
        questions.insert(
            Tier::B2,
            vec![
                Question::new(
                    "Had I known about it, I ___ you.",
                    ["would tell", "would have told", "will tell", "told"],
                    1,
                ),
                Question::new(
                    "The meeting is ___ to start at 3 PM.",
                    ["supposed", "propose", "supposing", "suppose"],
                    0,
                ),
                Question::new(
                    "She's been working here since she ___ university.",
                    ["graduated", "has graduated", "graduates", "graduating"],
                    0,
                ),
                Question::new(
                    "___ the weather, we decided to go hiking.",
                    ["Despite", "Although", "However", "Nevertheless"],
                    0,
                ),
                Question::new(
                    "I wish I ___ more time to travel.",
                    ["have", "had", "would have", "will have"],
                    1,
                ),
            ],
        );
        questions.insert(
            Tier::C1,
            vec![
                Question::new(
                    "Scarcely ___ the door when it started raining.",
                    ["I closed", "had I closed", "did I close", "I had closed"],
                    1,
                ),
                Question::new(
                    "The proposal is ___ consideration by the committee.",
                    ["under", "in", "on", "at"],
                    0,
                ),
                Question::new(
                    "Not only ___ late, but he also forgot the documents.",
                    ["he was", "was he", "he is", "is he"],
                    1,
                ),
                Question::new(
                    "She speaks English with such ___ that she sounds native.",
                    ["fluent", "fluency", "fluently", "fluentness"],
                    1,
                ),
                Question::new(
                    "___ to your proposal, I'd like to suggest some modifications.",
                    ["With regard", "In regard", "Regarding", "Regards"],
                    0,
                ),
            ],
        );
        Self { questions }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_is_well_formed() {
        let bank = QuestionBank::builtin();
        bank.validate().unwrap();
        for tier in Tier::ALL {
            for index in 0..QUESTIONS_PER_TIER {
                let q = bank.question(tier, index).unwrap();
                assert!(q.correct_index < OPTIONS_PER_QUESTION);
                assert!(q.has_option(q.correct_answer()));
            }
        }
    }

    #[test]
    fn lookup_past_last_question_fails() {
        let bank = QuestionBank::builtin();
        let err = bank.question(Tier::B1, QUESTIONS_PER_TIER).unwrap_err();
        assert!(matches!(
            err,
            BankError::OutOfRange {
                tier: Tier::B1,
                index: 5
            }
        ));
    }

    #[test]
    fn correctness_is_label_based() {
        let q = Question::new("This is ___ apple.", ["a", "an", "the", "-"], 1);
        assert!(q.is_correct("an"));
        assert!(!q.is_correct("a"));
        assert!(!q.is_correct("1"));

        let mut reordered = q.clone();
        reordered.options = ["the", "-", "an", "a"].map(String::from);
        reordered.correct_index = 2;
        assert!(reordered.is_correct("an"));
    }

    #[test]
    fn rejects_short_tier() {
        let mut questions = QuestionBank::builtin().questions;
        questions.get_mut(&Tier::B2).unwrap().pop();
        let err = QuestionBank::new(questions).unwrap_err();
        assert!(matches!(
            err,
            BankError::WrongQuestionCount {
                tier: Tier::B2,
                count: 4
            }
        ));
    }

    #[test]
    fn rejects_missing_tier() {
        let mut questions = QuestionBank::builtin().questions;
        questions.remove(&Tier::C1);
        let err = QuestionBank::new(questions).unwrap_err();
        assert!(matches!(err, BankError::MissingTier(Tier::C1)));
    }

    #[test]
    fn rejects_bad_correct_index() {
        let mut questions = QuestionBank::builtin().questions;
        questions.get_mut(&Tier::A2).unwrap()[3].correct_index = 4;
        let err = QuestionBank::new(questions).unwrap_err();
        assert!(matches!(
            err,
            BankError::InvalidCorrectIndex {
                tier: Tier::A2,
                index: 3,
                correct_index: 4
            }
        ));
    }

    #[test]
    fn rejects_duplicate_options() {
        let mut questions = QuestionBank::builtin().questions;
        questions.get_mut(&Tier::A1).unwrap()[0].options[3] = "is".to_string();
        let err = QuestionBank::new(questions).unwrap_err();
        assert!(matches!(err, BankError::DuplicateOptions { tier: Tier::A1, index: 0 }));
    }

    #[tokio::test]
    async fn load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        let questions = QuestionBank::builtin().questions;
        tokio::fs::write(&path, serde_json::to_string_pretty(&questions).unwrap())
            .await
            .unwrap();

        let bank = QuestionBank::load(&path).await.unwrap();
        assert_eq!(bank.question(Tier::C1, 4).unwrap().correct_answer(), "With regard");
    }

    #[tokio::test]
    async fn load_rejects_three_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        let json = serde_json::json!({
            "A1": [{"prompt": "x", "options": ["a", "b", "c"], "correct_index": 0}]
        });
        tokio::fs::write(&path, json.to_string()).await.unwrap();

        let err = QuestionBank::load(&path).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn load_missing_file_is_config_error() {
        let err = QuestionBank::load(Path::new("/nonexistent/bank.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Read { .. })));
    }
}
