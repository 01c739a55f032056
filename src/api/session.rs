// Challenge-response login against login_sid.lua

use md5::{Digest, Md5};
use serde::Deserialize;
use std::fmt;

use super::RouterClient;
use crate::error::{AppError, AppResult};

/// SID the router hands out while nobody is logged in
const INVALID_SID: &str = "0000000000000000";

/// Session token returned by a successful login, valid for this run only
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "SessionId({}…)", prefix)
    }
}

/// The `SessionInfo` document served by `login_sid.lua`
#[derive(Debug, Deserialize)]
struct SessionInfo {
    #[serde(rename = "SID")]
    sid: String,
    #[serde(rename = "Challenge")]
    challenge: String,
    /// Seconds the router refuses further logins after a failed attempt
    #[serde(rename = "BlockTime", default)]
    block_time: u32,
}

fn parse_session_info(xml: &str) -> AppResult<SessionInfo> {
    quick_xml::de::from_str(xml)
        .map_err(|e| AppError::Protocol(format!("malformed SessionInfo document: {}", e)))
}

/// Password encoding expected by the router: UTF-16 little endian.
fn utf16le_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// `<challenge>-<md5 hex of UTF-16LE "<challenge>-<password>">`
pub fn challenge_response(challenge: &str, password: &str) -> String {
    let source = format!("{}-{}", challenge, password);
    let digest = Md5::digest(utf16le_bytes(&source));
    format!("{}-{}", challenge, hex::encode(digest))
}

impl RouterClient {
    /// Log in and return the session id.
    ///
    /// The router does not signal a rejected login with an HTTP error; it
    /// answers with the all-zero SID instead, which is mapped to
    /// `AuthenticationFailed` here.
    pub async fn login(&self, user: &str, password: &str) -> AppResult<SessionId> {
        let anonymous = parse_session_info(&self.get_login(&[]).await?)?;
        if anonymous.challenge.trim().is_empty() {
            return Err(AppError::Protocol("login page carries no challenge".to_string()));
        }
        tracing::debug!("Received login challenge");

        let response = challenge_response(anonymous.challenge.trim(), password);
        let answer = self
            .get_login(&[("username", user), ("response", &response)])
            .await?;
        let info = parse_session_info(&answer)?;

        let sid = info.sid.trim();
        if sid.is_empty() || sid == INVALID_SID {
            let mut reason = format!("router rejected credentials for user {:?}", user);
            if info.block_time > 0 {
                reason.push_str(&format!(", further logins blocked for {}s", info.block_time));
            }
            return Err(AppError::AuthenticationFailed(reason));
        }

        tracing::info!("Logged in as {}", user);
        Ok(SessionId(sid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16le_encoding() {
        let bytes = utf16le_bytes("1234567z-secret1");
        let mut expected = Vec::new();
        for b in "1234567z-secret1".bytes() {
            expected.push(b);
            expected.push(0);
        }
        assert_eq!(bytes, expected);
        assert_eq!(utf16le_bytes("ä"), vec![0xe4, 0x00]);
    }

    #[test]
    fn test_challenge_response() {
        assert_eq!(
            challenge_response("1234567z", "secret1"),
            "1234567z-f71ee9eae0b7c1953920894fda1f2bf4"
        );
        assert_eq!(
            challenge_response("1234567z", "äbc"),
            "1234567z-9e224a41eeefa284df7bb0f26c2913e2"
        );
    }

    #[test]
    fn test_parse_session_info() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <SessionInfo><SID>0000000000000000</SID><Challenge>2cd7f0bd</Challenge><BlockTime>0</BlockTime><Rights></Rights></SessionInfo>"#;
        let info = parse_session_info(xml).unwrap();
        assert_eq!(info.sid, INVALID_SID);
        assert_eq!(info.challenge, "2cd7f0bd");
        assert_eq!(info.block_time, 0);
    }

    #[test]
    fn test_parse_session_info_missing_fields() {
        let xml = "<SessionInfo><Challenge>2cd7f0bd</Challenge></SessionInfo>";
        assert!(matches!(parse_session_info(xml), Err(AppError::Protocol(_))));
        assert!(matches!(
            parse_session_info("<html><body>Not found</body></html>"),
            Err(AppError::Protocol(_))
        ));
    }

    #[test]
    fn test_session_id_debug_is_redacted() {
        let sid = SessionId("9f4a2e1b7c3d5e60".to_string());
        assert_eq!(format!("{:?}", sid), "SessionId(9f4a…)");
    }
}
