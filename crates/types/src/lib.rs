//! Validated text primitives shared across the scenario explorer crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Seed prompts are carried as `NonEmptyText` so that an empty or
/// whitespace-only prompt is rejected before any provider is contacted.
/// Emptiness is judged on the trimmed input, but the text is kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns at most `max_chars` characters, followed by `...` when the text was cut.
    ///
    /// Counts `char`s rather than bytes so multi-byte input is never split.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.0.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &self.0[..byte_idx]),
            None => self.0.clone(),
        }
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(s).map_err(serde::de::Error::custom)
    }
}
