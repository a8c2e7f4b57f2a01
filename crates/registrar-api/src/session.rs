use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use registrar_types::session::{Role, Session};

use crate::flash::{self, Flash};

pub const SESSION_COOKIE: &str = "session";

const SESSION_TTL_HOURS: i64 = 12;

/// Sign a fresh session for one authenticated role.
pub fn issue(secret: &str, sub: i64, username: &str, role: Role) -> anyhow::Result<String> {
    let claims = Session {
        sub,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Decode and verify a session token. Expired or tampered tokens read as
/// no session at all.
pub fn decode_token(secret: &str, token: &str) -> Option<Session> {
    decode::<Session>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// The caller's session, read from the cookie jar.
pub fn from_jar(jar: &CookieJar, secret: &str) -> Option<Session> {
    let cookie = jar.get(SESSION_COOKIE)?;
    decode_token(secret, cookie.value())
}

pub fn cookie_for(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Missing or wrong-role session: bounce to the login form with a notice.
/// Deliberately indistinguishable from "not logged in yet".
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        let jar = flash::set(
            CookieJar::new(),
            &Flash::warning("You need to be logged in to view this page."),
        );
        (jar, Redirect::to("/login")).into_response()
    }
}

/// Pure gate: does this session carry the required role?
pub fn require(session: Option<&Session>, role: Role) -> Result<&Session, AuthRedirect> {
    match session {
        Some(session) if session.role == role => Ok(session),
        _ => Err(AuthRedirect),
    }
}
