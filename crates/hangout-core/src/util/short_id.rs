//! Short identifier generation for events.
//!
//! ## Summary
//! Event ids end up in chat messages and frontend links, so they are short,
//! lowercase and alphanumeric. Uniqueness is enforced by the store; a collision
//! surfaces as a duplicate-id error to the caller.

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated event ids.
pub const EVENT_ID_LEN: usize = 5;

/// Longest id accepted from clients.
const MAX_ID_LEN: usize = 64;

/// Generate a random event id of [`EVENT_ID_LEN`] base-36 characters.
#[must_use]
pub fn generate_event_id() -> String {
    encode_base36(uuid::Uuid::new_v4().as_u128(), EVENT_ID_LEN)
}

/// Encode the low digits of `value` in base 36, most significant first.
fn encode_base36(mut value: u128, len: usize) -> String {
    let mut digits = vec![b'0'; len];
    for digit in digits.iter_mut().rev() {
        // `value % 36` is always a valid index into the alphabet
        *digit = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    digits.into_iter().map(char::from).collect()
}

/// Returns whether `id` looks like an identifier this system could have issued
/// or a chat platform could have supplied (ASCII alphanumeric, `-` or `_`).
#[must_use]
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
