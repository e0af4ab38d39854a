//! Human-readable identifier codes for prescriptions, groups, hospitals and
//! illnesses.
//!
//! Codes are random strings of uppercase ASCII letters and digits. The
//! database enforces uniqueness; callers regenerate on collision up to
//! [`MAX_CODE_ATTEMPTS`] times.

use rand::Rng;

pub const PRESCRIPTION_CODE_LENGTH: usize = 12;
pub const GROUP_CODE_LENGTH: usize = 10;
pub const HOSPITAL_CODE_LENGTH: usize = 8;
pub const ILLNESS_CODE_LENGTH: usize = 8;

/// Attempts before giving up on finding an unused code.
pub const MAX_CODE_ATTEMPTS: usize = 10;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random code of `length` characters from `[A-Z0-9]`.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
