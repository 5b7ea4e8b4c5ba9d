use rand::Rng;
use serde::{Deserialize, Serialize};

/// Symbols an invitation code may contain. Uppercase letters and digits
/// with the ambiguous O/0 and I/1 pairs removed, so codes survive being
/// read aloud or copied by hand.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Fixed code length. 32^8 values is enough entropy that collisions with
/// the handful of simultaneously-active codes are vanishingly rare, but
/// the store still checks (see `InviteStoreError::Collision`).
pub const CODE_LENGTH: usize = 8;

/// A well-formed invitation code value.
///
/// Construction goes through `parse`, which uppercases its input, so two
/// codes that differ only in case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    /// Validate a raw code as entered by a user.
    pub fn parse(raw: &str) -> Result<Self, InviteCodeError> {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.len() != CODE_LENGTH {
            return Err(InviteCodeError::BadLength(upper.len()));
        }
        if let Some(c) = upper.bytes().find(|b| !CODE_ALPHABET.contains(b)) {
            return Err(InviteCodeError::BadSymbol(c as char));
        }
        Ok(Self(upper))
    }

    /// Draw a fresh random code.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InviteCode {
    type Error = InviteCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteCodeError {
    #[error("code must be exactly {CODE_LENGTH} characters, got {0}")]
    BadLength(usize),
    #[error("code contains a character outside the allowed alphabet: {0}")]
    BadSymbol(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..100 {
            let code = InviteCode::generate();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        let code = InviteCode::parse("ab3dfq7k").unwrap();
        assert_eq!(code.as_str(), "AB3DFQ7K");
        assert_eq!(code, InviteCode::parse("AB3DFQ7K").unwrap());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            InviteCode::parse("SHORT"),
            Err(InviteCodeError::BadLength(5))
        ));
        // O and 0 are excluded from the alphabet
        assert!(matches!(
            InviteCode::parse("AB3DFQ70"),
            Err(InviteCodeError::BadSymbol('0'))
        ));
        assert!(matches!(
            InviteCode::parse("AB3DFQ7O"),
            Err(InviteCodeError::BadSymbol('O'))
        ));
    }

    #[test]
    fn generated_codes_are_mostly_unique() {
        use std::collections::HashSet;
        let codes: HashSet<String> = (0..100)
            .map(|_| InviteCode::generate().as_str().to_string())
            .collect();
        assert!(codes.len() > 95);
    }
}
