//! Reciprocal (Beaufort) cipher arithmetic.
//!
//! Letters map to 0..26 and every position `i` satisfies
//!
//! ```text
//! plain[i] = (key[i mod |key|] - cipher[i]) mod 26
//! key[i]   = (plain[i] + cipher[i])         mod 26
//! ```
//!
//! The cipher is self-inverse: decoding a plaintext with the same key yields the
//! ciphertext, so [`encode`] and [`decode`] are the same map. Any two of
//! cipher, key and plaintext determine the third over their common length.
//!
//! All functions assume lowercase a-z input; the command surface validates that
//! before anything reaches the search. They work on bytes and never allocate more
//! than the output string.

use crate::alphabet::{letter_to_num, num_to_letter, ALPHABET_SIZE};

const MODULUS: u8 = ALPHABET_SIZE as u8;

/// Decode `cipher` with `key`, repeating the key cyclically.
///
/// An empty key decodes nothing and returns an empty string.
///
/// # Example
/// ```
/// assert_eq!(runkey::codec::decode("xzfdq", "bonfi"), "epics");
/// ```
#[must_use]
pub fn decode(cipher: &str, key: &str) -> String {
    debug_assert!(cipher.bytes().all(|b| b.is_ascii_lowercase()), "cipher must be a-z: {cipher:?}");
    debug_assert!(key.bytes().all(|b| b.is_ascii_lowercase()), "key must be a-z: {key:?}");

    let bytes: Vec<u8> = cipher
        .bytes()
        .zip(key.bytes().cycle())
        .map(|(c, k)| {
            let diff = (letter_to_num(k) + MODULUS - letter_to_num(c)) % MODULUS;
            num_to_letter(diff)
        })
        .collect();

    // every byte came from num_to_letter, so this is ASCII
    String::from_utf8(bytes).unwrap_or_default()
}

/// Encode `plain` with `key`. Identical to [`decode`]; provided for readability at call sites.
#[must_use]
pub fn encode(plain: &str, key: &str) -> String {
    decode(plain, key)
}

/// Recover the key that maps `plain` to `cipher` over their shared prefix length.
///
/// # Example
/// ```
/// assert_eq!(runkey::codec::derive_key("xzfdq", "epics"), "bonfi");
/// ```
#[must_use]
pub fn derive_key(cipher: &str, plain: &str) -> String {
    debug_assert!(cipher.bytes().all(|b| b.is_ascii_lowercase()), "cipher must be a-z: {cipher:?}");
    debug_assert!(plain.bytes().all(|b| b.is_ascii_lowercase()), "plain must be a-z: {plain:?}");

    let bytes: Vec<u8> = cipher
        .bytes()
        .zip(plain.bytes())
        .map(|(c, p)| num_to_letter((letter_to_num(p) + letter_to_num(c)) % MODULUS))
        .collect();

    String::from_utf8(bytes).unwrap_or_default()
}
