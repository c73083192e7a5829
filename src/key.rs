//! Session key generation.

use std::fmt::Debug;

use tower_sessions::session::Id;

/// Keys shorter than this are never accepted from a client.
pub const MIN_SESSION_KEY_LEN: usize = 8;

/// Produces candidate session keys.
///
/// Keys must be unpredictable and URL-safe. Uniqueness is not required of the
/// generator: collisions are caught by the storage constraint and retried.
pub trait KeyGenerator: Debug + Send + Sync {
    fn generate(&self) -> String;
}

/// Generates 128-bit random keys rendered as 22 characters of unpadded base64url.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> String {
        Id::default().to_string()
    }
}

/// Returns `true` if a client-supplied key is worth looking up.
pub(crate) fn is_valid_session_key(key: &str) -> bool {
    key.len() >= MIN_SESSION_KEY_LEN
}
