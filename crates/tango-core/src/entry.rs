use serde::{Deserialize, Serialize};

/// A vocabulary item: the written form (usually kanji) and its kana reading.
///
/// Either field may be empty, but not both. Equality is by value, which is
/// what revision-list membership relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub word: String,
}

impl Entry {
    pub fn new(word: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            reading: reading.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.word.is_empty() || !self.reading.is_empty()
    }

    /// Text shown before the entry is revealed.
    /// Falls back to the word for entries that carry no reading.
    pub fn prompt(&self) -> &str {
        if self.reading.is_empty() {
            &self.word
        } else {
            &self.reading
        }
    }

    /// Full form shown after reveal, and the text handed to speech output.
    pub fn surface(&self) -> &str {
        if self.word.is_empty() {
            &self.reading
        } else {
            &self.word
        }
    }
}
