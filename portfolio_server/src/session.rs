//! Signed cookie sessions.
//!
//! All session state lives in the client cookie: a hex-encoded JSON payload
//! and an HMAC-SHA256 tag over it. A cookie with a bad tag is treated as no
//! session at all.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::PortfolioConfig;
use crate::routes::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "portfolio_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, rename = "a")]
    authenticated: bool,
    #[serde(default, rename = "f", skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn login(&mut self) {
        self.authenticated = true;
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn encode(&self, secret: &str) -> String {
        let payload = serde_json::to_vec(self).unwrap_or_default();
        let tag = sign(secret, &payload).unwrap_or_default();
        format!("{}.{}", hex::encode(payload), hex::encode(tag))
    }

    pub fn decode(token: &str, secret: &str) -> Option<Self> {
        let (payload, tag) = token.split_once('.')?;
        let payload = hex::decode(payload).ok()?;
        let tag = hex::decode(tag).ok()?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(&payload);
        mac.verify_slice(&tag).ok()?;

        serde_json::from_slice(&payload).ok()
    }

    /// Read the session from request headers; missing or forged cookies
    /// yield an empty session.
    pub fn from_headers(headers: &HeaderMap, secret: &str) -> Self {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == SESSION_COOKIE)
            .and_then(|c| {
                let session = Self::decode(c.value(), secret);
                if session.is_none() {
                    tracing::debug!("Discarding session cookie with invalid signature");
                }
                session
            })
            .unwrap_or_default()
    }

    /// The `Set-Cookie` header that persists this session. An empty session
    /// clears the cookie instead.
    pub fn cookie(&self, config: &PortfolioConfig) -> SetSession {
        let mut cookie = Cookie::build((SESSION_COOKIE, self.encode(&config.session_secret)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(config.secure_cookies)
            .build();
        if *self == Session::default() {
            cookie.make_removal();
        }
        SetSession(cookie.to_string())
    }
}

fn sign(secret: &str, payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Response part that writes the session cookie.
pub struct SetSession(String);

impl IntoResponseParts for SetSession {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Session cookie is not a valid header: {e}"),
        }
        Ok(res)
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(
            &parts.headers,
            &state.config.session_secret,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn authenticated_with_flash() -> Session {
        let mut session = Session::default();
        session.login();
        session.flash(FlashLevel::Success, "Profile updated!");
        session
    }

    #[test]
    fn encoded_session_decodes_with_same_secret() {
        let session = authenticated_with_flash();
        let token = session.encode(SECRET);
        assert_eq!(Session::decode(&token, SECRET), Some(session));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = authenticated_with_flash().encode(SECRET);
        assert_eq!(Session::decode(&token, "another-secret"), None);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = Session::default().encode(SECRET);
        let (_, tag) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", hex::encode(br#"{"a":true}"#), tag);
        assert_eq!(Session::decode(&forged, SECRET), None);
        assert_eq!(Session::decode("not-a-token", SECRET), None);
    }

    #[test]
    fn session_is_read_from_cookie_header() {
        let token = authenticated_with_flash().encode(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}")).unwrap(),
        );

        let session = Session::from_headers(&headers, SECRET);
        assert!(session.is_authenticated());

        let forged = Session::from_headers(&headers, "wrong");
        assert_eq!(forged, Session::default());
    }

    #[test]
    fn logout_is_idempotent_and_flashes_are_one_shot() {
        let mut session = authenticated_with_flash();
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());

        assert_eq!(session.take_flashes().len(), 1);
        assert!(session.take_flashes().is_empty());
    }

    #[test]
    fn empty_session_clears_the_cookie() {
        let config = PortfolioConfig::new("pw", SECRET);
        let SetSession(header) = Session::default().cookie(&config);
        assert!(header.contains("Max-Age=0"), "{header}");

        let SetSession(header) = authenticated_with_flash().cookie(&config);
        assert!(header.starts_with(&format!("{SESSION_COOKIE}=")));
        assert!(header.contains("HttpOnly"));
        assert!(!header.contains("Max-Age=0"));
    }
}
