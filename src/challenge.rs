use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::fmt;

/// Why a challenge code could not be turned back into a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeError {
    /// Not valid base64url, or the bytes are not UTF-8.
    Encoding,
    /// Decoded fine but is not a lowercase a-z word.
    Charset,
}

impl fmt::Display for ChallengeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeError::Encoding => write!(f, "challenge code is not valid base64url"),
            ChallengeError::Charset => write!(f, "challenge code does not decode to a word"),
        }
    }
}

impl std::error::Error for ChallengeError {}

/// Encode a target word as a shareable challenge code. The encoding is
/// deliberately trivial; it keeps the word out of casual sight, not
/// out of reach.
pub fn encode(word: &str) -> String {
    URL_SAFE_NO_PAD.encode(word.as_bytes())
}

/// Decode a challenge code back into a lowercase word. Dictionary
/// membership is the caller's problem; this only vets the shape.
pub fn decode(code: &str) -> Result<String, ChallengeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(code.trim())
        .map_err(|_| ChallengeError::Encoding)?;
    let word = String::from_utf8(bytes)
        .map_err(|_| ChallengeError::Encoding)?
        .to_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ChallengeError::Charset);
    }
    Ok(word)
}
