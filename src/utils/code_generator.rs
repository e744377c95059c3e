//! Short code generation.
//!
//! Codes are [`CODE_LENGTH`] characters drawn uniformly and independently from
//! the 62 ASCII alphanumerics. The generator gives no uniqueness guarantee:
//! [`crate::application::services::UrlService`] detects collisions through the
//! store and retries.
//!
//! With 62^6 ≈ 5.6×10^10 possible codes, collisions are rare but not
//! negligible once the table holds millions of rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Number of characters in a generated short code.
pub const CODE_LENGTH: usize = 6;

/// Characters a short code may contain.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Produces the next candidate code.
    fn generate(&self) -> String;
}

/// Generator backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_code()
    }
}

/// Generator producing a reproducible sequence of codes from a fixed seed.
///
/// Two instances created with the same seed yield the same codes in the same
/// order.
#[derive(Debug)]
pub struct SeededCodeGenerator {
    rng: Mutex<StdRng>,
}

impl SeededCodeGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CodeGenerator for SeededCodeGenerator {
    fn generate(&self) -> String {
        // A poisoned lock still holds a usable RNG state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        generate_from(&mut *rng)
    }
}

/// Generates a random short code.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    generate_from(&mut rand::rng())
}

/// Generates a short code deterministically from `seed`.
///
/// Repeated calls with the same seed return the same code.
pub fn generate_code_with_seed(seed: u64) -> String {
    generate_from(&mut StdRng::seed_from_u64(seed))
}

/// Returns true if `code` has the shape of a generated short code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

fn generate_from<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
