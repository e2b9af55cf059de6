//! Content fingerprinting primitives
//!
//! Provides [`Fingerprint`], the 7-character base-36 digest used as a cache
//! key component for script content and compiler configuration.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Rendered width of every fingerprint
pub const FINGERPRINT_WIDTH: usize = 7;

const RADIX: u32 = 36;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A 32-bit rolling digest of text
///
/// Deterministic and cheap, but neither collision-resistant nor safe against
/// adversarial input. Page content is assumed to be non-malicious.
///
/// Rendered as exactly [`FINGERPRINT_WIDTH`] characters: non-negative values
/// are zero-padded base 36, negative values are a `-` followed by the
/// zero-padded magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint(i32);

impl Fingerprint {
    /// Wrap a raw accumulator value
    #[inline]
    #[must_use]
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Raw accumulator value
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// Fingerprint arbitrary text
    ///
    /// Folds every UTF-16 code unit into a wrapping signed 32-bit accumulator:
    /// `acc = ((acc << 5) - acc) + unit`.
    #[must_use]
    pub fn compute(text: &str) -> Self {
        let acc = text.encode_utf16().fold(0i32, |acc, unit| {
            (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
        });
        Self(acc)
    }

    /// Fingerprint a serializable value through its JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T>(value: &T) -> Result<Self, FingerprintError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_string(value)?;
        Ok(Self::compute(&json))
    }

    /// Check if this is the digest of empty input
    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut magnitude = self.0.unsigned_abs();
        let mut digits = Vec::with_capacity(FINGERPRINT_WIDTH);
        loop {
            digits.push(DIGITS[(magnitude % RADIX) as usize]);
            magnitude /= RADIX;
            if magnitude == 0 {
                break;
            }
        }

        let width = if self.0 < 0 {
            f.write_str("-")?;
            FINGERPRINT_WIDTH - 1
        } else {
            FINGERPRINT_WIDTH
        };
        for _ in digits.len()..width {
            f.write_str("0")?;
        }
        for digit in digits.iter().rev() {
            write!(f, "{}", char::from(*digit))?;
        }
        Ok(())
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_WIDTH {
            return Err(FingerprintError::InvalidLength {
                expected: FINGERPRINT_WIDTH,
                actual: s.len(),
            });
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if !digits.bytes().all(|b| DIGITS.contains(&b)) {
            return Err(FingerprintError::InvalidDigit(s.to_string()));
        }

        let magnitude = i64::from_str_radix(digits, RADIX)
            .map_err(|_| FingerprintError::InvalidDigit(s.to_string()))?;
        if negative && magnitude == 0 {
            return Err(FingerprintError::NegativeZero(s.to_string()));
        }
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value)
            .map(Self)
            .map_err(|_| FingerprintError::OutOfRange(s.to_string()))
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Rendered digest has the wrong width
    #[error("invalid fingerprint length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Character outside the base-36 alphabet
    #[error("invalid fingerprint digit in '{0}'")]
    InvalidDigit(String),

    /// Digest does not fit a signed 32-bit accumulator
    #[error("fingerprint out of range: '{0}'")]
    OutOfRange(String),

    /// Sign on a zero magnitude; zero only renders unsigned
    #[error("negative zero fingerprint: '{0}'")]
    NegativeZero(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
