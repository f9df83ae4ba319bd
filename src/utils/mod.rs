pub mod ip;
pub mod url_validator;

use std::iter;
use std::sync::LazyLock;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::errors::{LinkmeterError, Result};

/// Alphabet used for generated codes: digits, upper and lower case letters.
pub const CODE_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const CUSTOM_CODE_MIN_LEN: usize = 3;
pub const CUSTOM_CODE_MAX_LEN: usize = 30;

// Seeded once on first use, shared by every request thread.
static CODE_RNG: LazyLock<Mutex<StdRng>> =
    LazyLock::new(|| Mutex::new(StdRng::from_seed(rand::random())));

/// Generate a random code of exactly `length` characters.
///
/// Uniqueness is not checked here; the alias store rejects duplicates on
/// insert.
pub fn generate_random_code(length: usize) -> String {
    let mut rng = CODE_RNG.lock();
    iter::repeat_with(|| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Check a caller-supplied code: ASCII alphanumeric, 3 to 30 characters.
pub fn validate_custom_code(code: &str) -> Result<()> {
    let len = code.len();
    if !(CUSTOM_CODE_MIN_LEN..=CUSTOM_CODE_MAX_LEN).contains(&len) {
        return Err(LinkmeterError::validation(format!(
            "Custom alias must be {}-{} characters long",
            CUSTOM_CODE_MIN_LEN, CUSTOM_CODE_MAX_LEN
        )));
    }

    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(LinkmeterError::validation(
            "Custom alias may only contain letters and digits",
        ));
    }

    Ok(())
}
