use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

/// Fixed first ten bytes of every generated identifier, the four branded
/// groups `a0b1c3d2-af1c-a4b6-d0c4`.
const BRAND_PREFIX: [u8; 10] = [
    0xa0, 0xb1, 0xc3, 0xd2, 0xaf, 0x1c, 0xa4, 0xb6, 0xd0, 0xc4,
];

/// Canonical identifier length: 32 hex digits grouped 8-4-4-4-12.
const CANONICAL_LEN: usize = 36;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("The UUID format is invalid")]
pub struct ParseIdError;

/// The 128-bit proximity identifier a beacon advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProximityId(Uuid);

impl ProximityId {
    /// Fresh identifier: branded prefix plus a random 12-hex-char suffix.
    pub fn generate() -> ProximityId {
        let suffix: [u8; 6] = rand::thread_rng().r#gen();
        let mut bytes = [0u8; 16];
        bytes[..10].copy_from_slice(&BRAND_PREFIX);
        bytes[10..].copy_from_slice(&suffix);
        ProximityId(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ProximityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ProximityId {
    type Err = ParseIdError;

    /// Accepts only the hyphenated 8-4-4-4-12 form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CANONICAL_LEN {
            return Err(ParseIdError);
        }
        Uuid::parse_str(s).map(ProximityId).map_err(|_| ParseIdError)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::ProximityId;

    #[test]
    fn generated_ids_carry_branded_prefix() {
        let id = ProximityId::generate().to_string();
        assert_eq!(id.len(), 36);
        assert!(id.starts_with("a0b1c3d2-af1c-a4b6-d0c4-"));
    }

    #[test]
    fn generated_ids_round_trip_through_parsing() {
        let id = ProximityId::generate();
        let parsed = ProximityId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn generated_suffixes_vary() {
        assert_ne!(ProximityId::generate(), ProximityId::generate());
    }

    #[test]
    fn rejects_unhyphenated_form() {
        assert!(ProximityId::from_str("a0b1c3d2af1ca4b6d0c4000000000000").is_err());
    }

    #[test]
    fn rejects_non_hex_garbage() {
        assert!(ProximityId::from_str("not-an-identifier").is_err());
        assert!(ProximityId::from_str("").is_err());
        assert!(ProximityId::from_str("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz").is_err());
    }
}
