use serde::{Deserialize, Serialize};

/// A single practice word as delivered by a word provider.
///
/// Immutable once fetched; the session owns its words for the lifetime
/// of the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Identity used for progress reporting and requeue deduplication.
    pub progress_id: u64,
    pub text: String,
    #[serde(default)]
    pub pronunciation: Pronunciation,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pronunciation {
    pub uk: Option<PronunciationDetail>,
    pub us: Option<PronunciationDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationDetail {
    pub phonetic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub text: String,
    pub translation: Option<String>,
}

impl Word {
    /// Minimal constructor used by tests and ad-hoc word lists.
    pub fn plain(progress_id: u64, text: &str) -> Self {
        Self {
            progress_id,
            text: text.to_string(),
            pronunciation: Pronunciation::default(),
            definitions: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Preferred pronunciation detail: US first, then UK.
    pub fn preferred_pronunciation(&self) -> Option<&PronunciationDetail> {
        self.pronunciation
            .us
            .as_ref()
            .or(self.pronunciation.uk.as_ref())
    }
}
