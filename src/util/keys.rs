//! Session access keys

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Random bytes per key; encodes to 16 URL-safe characters
pub const KEY_BYTES: usize = 12;

/// Generate an unguessable, URL-safe key for join or watch links
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
