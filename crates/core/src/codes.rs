//! Random code generation capability (verification codes, recovery codes,
//! opaque tokens).
//!
//! Exported for user and auth services built on this crate.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

pub trait CodeGenerator: Send + Sync {
    /// Numeric code of exactly `digits` digits, never with a leading zero.
    fn verification_code(&self, digits: u32) -> String;

    /// Lowercase hex of `bytes` random bytes.
    fn random_code(&self, bytes: usize) -> String;

    /// Uppercase hex of `bytes` random bytes.
    fn recovery_code(&self, bytes: usize) -> String;

    /// Unpadded base64url of `bytes` random bytes.
    fn secure_token(&self, bytes: usize) -> String;
}

/// Defaults used by callers that have no reason to pick their own lengths.
pub mod defaults {
    pub const VERIFICATION_DIGITS: u32 = 6;
    pub const RANDOM_CODE_BYTES: usize = 32;
    pub const RECOVERY_CODE_BYTES: usize = 8;
    pub const SECURE_TOKEN_BYTES: usize = 32;
}

/// `u64` holds at most 19 decimal digits; 18 keeps `10^digits` in range.
const MAX_VERIFICATION_DIGITS: u32 = 18;

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    fn random_bytes(bytes: usize) -> Vec<u8> {
        let mut buf = vec![0u8; bytes];
        rand::rng().fill(&mut buf[..]);
        buf
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn verification_code(&self, digits: u32) -> String {
        let digits = digits.clamp(1, MAX_VERIFICATION_DIGITS);
        let min = 10u64.pow(digits - 1);
        let max = 10u64.pow(digits) - 1;
        rand::rng().random_range(min..=max).to_string()
    }

    fn random_code(&self, bytes: usize) -> String {
        hex::encode(Self::random_bytes(bytes))
    }

    fn recovery_code(&self, bytes: usize) -> String {
        hex::encode_upper(Self::random_bytes(bytes))
    }

    fn secure_token(&self, bytes: usize) -> String {
        URL_SAFE_NO_PAD.encode(Self::random_bytes(bytes))
    }
}

/// Test double returning either one pinned value or a canned value per kind.
#[derive(Debug, Default, Clone)]
pub struct FixedCodeGenerator {
    fixed: Option<String>,
}

impl FixedCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every method returns `code` from now on.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            fixed: Some(code.into()),
        }
    }

    fn or(&self, canned: &str) -> String {
        self.fixed.clone().unwrap_or_else(|| canned.to_string())
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn verification_code(&self, _digits: u32) -> String {
        self.or("123456")
    }

    fn random_code(&self, _bytes: usize) -> String {
        self.or("mock-random-code")
    }

    fn recovery_code(&self, _bytes: usize) -> String {
        self.or("MOCKRECOVERY")
    }

    fn secure_token(&self, _bytes: usize) -> String {
        self.or("mock-secure-token")
    }
}
