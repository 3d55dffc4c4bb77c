//! CSRF (Cross-Site Request Forgery) token manager
//!
//! Double-submit cookie pattern: a random token lives in the `csrf` cookie, which client
//! script reads and mirrors into the `X-CSRF-Token` header. A request is accepted when the
//! header equals the cookie it carried.
//!
//! The token is not bound to the session. A party able to plant cookies for our domain
//! (for example from a compromised subdomain) can fix a token of its choosing; SameSite=Lax
//! and the origin checks are what stop ordinary cross-site forgery.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use gatehouse_core::constants::{CSRF_COOKIE, CSRF_COOKIE_MAX_AGE_SECS};
use subtle::ConstantTimeEq;

/// Token bytes before hex encoding (128 bits).
const TOKEN_BYTES: usize = 16;

/// CSRF token in effect for the current request, inserted into request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfToken(pub String);

/// Result of [`ensure_token`].
#[derive(Debug)]
pub struct EnsuredToken {
    pub token: String,
    /// Cookie to send back, present only when the token was minted for this request.
    pub issued: Option<Cookie<'static>>,
}

/// Generate a fresh random token
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Build the `csrf` cookie for `token`. Readable by script; Secure only in production.
pub fn build_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::seconds(CSRF_COOKIE_MAX_AGE_SECS))
        .build()
}

/// Return the token the request already carries, or mint one and schedule its cookie.
///
/// Idempotent: a request carrying a non-empty `csrf` cookie always gets that value back.
pub fn ensure_token(jar: &CookieJar, secure: bool) -> EnsuredToken {
    if let Some(existing) = jar.get(CSRF_COOKIE).filter(|c| !c.value().is_empty()) {
        return EnsuredToken {
            token: existing.value().to_string(),
            issued: None,
        };
    }

    let token = generate_token();
    tracing::debug!("Issuing new CSRF cookie");
    EnsuredToken {
        issued: Some(build_cookie(token.clone(), secure)),
        token,
    }
}

/// True iff both values are present, non-empty and exactly equal.
pub fn verify_token(header: Option<&str>, cookie: Option<&str>) -> bool {
    match (header, cookie) {
        (Some(header), Some(cookie)) if !header.is_empty() && !cookie.is_empty() => {
            header.as_bytes().ct_eq(cookie.as_bytes()).into()
        }
        _ => false,
    }
}
