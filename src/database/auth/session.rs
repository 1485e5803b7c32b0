use base64::prelude::*;
use serde::{Deserialize, Serialize};

/// The token handed to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_token: String,
}

impl Session {
    pub fn new(session_token: [u8; 16]) -> Self {
        let base64_session_token = BASE64_STANDARD.encode(session_token);
        Self {
            session_token: base64_session_token,
        }
    }
}

/// What a valid session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
}
