use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

/// One-shot notice shown on the next rendered page, then discarded.
/// Carried in a cookie as base64-wrapped JSON so it survives the redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Display category: success, danger, warning, or info.
    pub kind: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: "success".into(), message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { kind: "danger".into(), message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: "warning".into(), message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: "info".into(), message: message.into() }
    }
}

pub fn set(jar: CookieJar, flash: &Flash) -> CookieJar {
    let payload = match serde_json::to_vec(flash) {
        Ok(bytes) => B64.encode(bytes),
        Err(_) => return jar,
    };
    let cookie = Cookie::build((FLASH_COOKIE, payload))
        .path("/")
        .http_only(true)
        .build();
    jar.add(cookie)
}

/// Remove and decode the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let flash = B64
        .decode(cookie.value())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());

    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    (jar, flash)
}
