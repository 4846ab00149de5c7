/// Factor that expands to the whole null vocabulary in a criterion.
pub const NULLS_SENTINEL: &str = "NULLS";

/// Text a missing cell reads as when matched against exclusion factors.
pub const MISSING_TEXT: &str = "nan";

/// Tokens read as missing values in categorical columns, on top of the
/// table's own missing marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullVocabulary {
    tokens: Vec<String>,
}

impl NullVocabulary {
    /// Build from raw tokens. Tokens are trimmed and lower-cased; blanks and
    /// repeats are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            if token.is_empty() || vocabulary.tokens.contains(&token) {
                continue;
            }
            vocabulary.tokens.push(token);
        }
        vocabulary
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens a `no_nan` exclusion drops: the vocabulary plus the text of a
    /// missing cell.
    pub fn exclusion_tokens(&self) -> Vec<String> {
        let mut tokens = self.tokens.clone();
        if !tokens.iter().any(|token| token == MISSING_TEXT) {
            tokens.push(MISSING_TEXT.to_string());
        }
        tokens
    }

    /// Whether the lower-cased value contains any token.
    pub fn matches_within(&self, value: &str) -> bool {
        let lowered = value.to_lowercase();
        self.tokens.iter().any(|token| lowered.contains(token.as_str()))
    }
}
