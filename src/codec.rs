//! Encoding of session payloads into the `session_data` column.

use std::collections::HashMap;
use std::fmt::{self, Debug};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CodecError;

/// The key-value payload of one session.
pub type SessionData = HashMap<String, serde_json::Value>;

/// Converts session payloads to and from a storage-safe string.
///
/// `decode` must report [`CodecError::Tampered`] or [`CodecError::Malformed`]
/// rather than panic on hostile input; the store treats either as a missing
/// session.
pub trait SessionCodec: Debug + Send + Sync {
    fn encode(&self, data: &SessionData) -> Result<String, CodecError>;
    fn decode(&self, encoded: &str) -> Result<SessionData, CodecError>;
}

type HmacSha256 = Hmac<Sha256>;

const SIGNING_SALT: &[u8] = b"user_sessions.codec.SignedCodec";

/// MessagePack payload signed with HMAC-SHA256.
///
/// The stored form is `base64url(tag) ":" base64url(body)`, where `body` is the
/// MessagePack encoding of the payload and `tag` authenticates it under the
/// configured secret.
#[derive(Clone)]
pub struct SignedCodec {
    secret: Vec<u8>,
}

impl SignedCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, body: &[u8]) -> Result<HmacSha256, CodecError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        mac.update(SIGNING_SALT);
        mac.update(body);
        Ok(mac)
    }
}

impl Debug for SignedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedCodec").finish_non_exhaustive()
    }
}

impl SessionCodec for SignedCodec {
    fn encode(&self, data: &SessionData) -> Result<String, CodecError> {
        let body = rmp_serde::to_vec(data).map_err(|e| CodecError::Encode(e.to_string()))?;
        let tag = self.mac(&body)?.finalize().into_bytes();

        Ok(format!(
            "{}:{}",
            URL_SAFE_NO_PAD.encode(tag),
            URL_SAFE_NO_PAD.encode(&body)
        ))
    }

    fn decode(&self, encoded: &str) -> Result<SessionData, CodecError> {
        let (tag, body) = encoded
            .split_once(':')
            .ok_or_else(|| CodecError::Malformed("missing signature separator".into()))?;

        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        let body = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;

        self.mac(&body)?
            .verify_slice(&tag)
            .map_err(|_| CodecError::Tampered)?;

        rmp_serde::from_slice(&body).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}
