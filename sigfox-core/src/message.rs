use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Longest payload a Sigfox uplink carries: 12 bytes as hex
pub const MAX_PAYLOAD_CHARS: usize = 24;

static PAYLOAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-F]{1,24}$").expect("payload pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Invalid Payload: message is empty")]
    Empty,

    #[error("Invalid Payload: {0} characters (maximum is {max})", max = MAX_PAYLOAD_CHARS)]
    TooLong(usize),

    #[error("Invalid Payload: '{0}' is not an uppercase hexadecimal digit")]
    InvalidCharacter(char),
}

/// An uplink payload: 1 to 24 uppercase hex digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    pub fn parse(input: &str) -> Result<Self, PayloadError> {
        if PAYLOAD_PATTERN.is_match(input) {
            return Ok(Self(input.to_string()));
        }

        // Work out which rule was broken for the error message
        if input.is_empty() {
            return Err(PayloadError::Empty);
        }
        if let Some(c) = input.chars().find(|&c| !matches!(c, '0'..='9' | 'A'..='F')) {
            return Err(PayloadError::InvalidCharacter(c));
        }
        Err(PayloadError::TooLong(input.chars().count()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
