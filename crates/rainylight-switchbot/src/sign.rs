//! Request signing for the SwitchBot v1.1 API.
//!
//! Every request carries `Authorization`, `t`, `sign` and `nonce` headers.
//! `sign` is Base64(HMAC-SHA256(secret, token || t || nonce)) and `t` must be
//! fresh, so a signature is computed immediately before each call.

use base64::Engine;
use hmac::{Hmac, Mac};
use rainylight_core::Credentials;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// A timestamp and the signature computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Milliseconds since the Unix epoch, decimal
    pub timestamp: String,
    /// Base64 HMAC-SHA256 digest
    pub sign: String,
}

/// Sign `token || now_ms || nonce` with `secret`.
pub fn sign(token: &str, secret: &str, nonce: &str) -> Signature {
    sign_at(token, secret, nonce, chrono::Utc::now().timestamp_millis())
}

/// Sign with an explicit timestamp.
pub fn sign_at(token: &str, secret: &str, nonce: &str, timestamp_ms: i64) -> Signature {
    let timestamp = timestamp_ms.to_string();

    #[allow(clippy::expect_used)]
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(token.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(nonce.as_bytes());

    let sign = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    Signature { timestamp, sign }
}

/// The four authentication headers for one request.
///
/// Valid only for the instant it was generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestHeaders {
    pub authorization: String,
    pub timestamp: String,
    pub sign: String,
    pub nonce: String,
}

impl SignedRequestHeaders {
    /// Sign now for the given credentials and nonce.
    pub fn new(credentials: &Credentials, nonce: &str) -> Self {
        let signature = sign(&credentials.access_token, &credentials.secret, nonce);
        Self::from_signature(credentials, nonce, signature)
    }

    pub fn from_signature(credentials: &Credentials, nonce: &str, signature: Signature) -> Self {
        Self {
            authorization: credentials.access_token.clone(),
            timestamp: signature.timestamp,
            sign: signature.sign,
            nonce: nonce.to_string(),
        }
    }

    /// Attach the headers to a request.
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, &self.authorization)
            .header("t", &self.timestamp)
            .header("sign", &self.sign)
            .header("nonce", &self.nonce)
    }
}
