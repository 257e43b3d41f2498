//! Session extraction and principal guards.
//!
//! The session token travels either in the `placement_sid` cookie (browser
//! forms) or as `Authorization: Bearer <token>` (API clients). [`SessionContext`]
//! resolves it against the session store; the `*Auth` extractors additionally
//! require one principal kind and reject with 401 when nobody is signed in and
//! 403 when the session holds only other kinds.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::Error;
use crate::models::session::{PrincipalKind, Session};
use crate::AppState;

pub const SESSION_COOKIE: &str = "placement_sid";

/// The caller's session, if any. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session: Option<Session>,
}

impl SessionContext {
    pub fn principal(&self, kind: PrincipalKind) -> Option<Uuid> {
        self.session.as_ref().and_then(|s| s.claims.get(kind))
    }

    pub fn student(&self) -> Option<Uuid> {
        self.principal(PrincipalKind::Student)
    }

    pub fn pending_student(&self) -> Option<Uuid> {
        self.principal(PrincipalKind::PendingStudent)
    }

    pub fn admin(&self) -> Option<Uuid> {
        self.principal(PrincipalKind::Admin)
    }

    pub fn recruiter(&self) -> Option<Uuid> {
        self.principal(PrincipalKind::Recruiter)
    }

    /// The principal of `kind`, or the matching auth error.
    pub fn require(&self, kind: PrincipalKind) -> Result<Uuid, Error> {
        if let Some(id) = self.principal(kind) {
            return Ok(id);
        }
        let signed_in = self
            .session
            .as_ref()
            .map(|s| !s.claims.is_empty())
            .unwrap_or(false);
        if signed_in {
            Err(Error::Forbidden(format!(
                "This action requires a {} account.",
                kind_label(kind)
            )))
        } else {
            Err(Error::Unauthenticated("Please sign in to continue.".into()))
        }
    }
}

fn kind_label(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::Student | PrincipalKind::PendingStudent => "student",
        PrincipalKind::Admin => "admin",
        PrincipalKind::Recruiter => "recruiter",
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = match session_token(&parts.headers) {
            Some(token) => state.sessions.load(&token).await?,
            None => None,
        };
        Ok(SessionContext { session })
    }
}

/// A signed-in, verified student.
pub struct StudentAuth(pub Uuid);

/// A signed-in admin.
pub struct AdminAuth(pub Uuid);

/// A signed-in recruiter.
pub struct RecruiterAuth(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for StudentAuth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state).await?;
        ctx.require(PrincipalKind::Student).map(StudentAuth)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state).await?;
        ctx.require(PrincipalKind::Admin).map(AdminAuth)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RecruiterAuth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state).await?;
        ctx.require(PrincipalKind::Recruiter).map(RecruiterAuth)
    }
}

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|h| cookie_value(h, SESSION_COOKIE))
        .map(str::to_string)
}

/// Value of `name` in a `Cookie` header (`a=1; b=2`).
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name)
            .then(|| value.trim().trim_matches('"'))
            .filter(|v| !v.is_empty())
    })
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::PrincipalClaims;
    use axum::http::HeaderValue;
    use chrono::Utc;

    #[test]
    fn finds_cookie_among_others() {
        let header = "theme=dark; placement_sid=abc123; lang=en";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("placement_sid=", SESSION_COOKIE), None);
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("placement_sid=fromcookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("fromcookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer frombearer"));
        assert_eq!(session_token(&headers).as_deref(), Some("frombearer"));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", 3600, true);
        assert!(cookie.starts_with("placement_sid=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
        assert!(!clear_session_cookie(false).contains("Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    fn context(claims: PrincipalClaims) -> SessionContext {
        SessionContext {
            session: Some(Session {
                token_hash: "h".into(),
                claims,
                expires_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        let err = SessionContext::default()
            .require(PrincipalKind::Admin)
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated(_)));
    }

    #[test]
    fn wrong_kind_is_forbidden() {
        let ctx = context([(PrincipalKind::Student, Uuid::new_v4())].into_iter().collect());
        assert!(matches!(
            ctx.require(PrincipalKind::Admin),
            Err(Error::Forbidden(_))
        ));
        assert!(ctx.require(PrincipalKind::Student).is_ok());
    }

    #[test]
    fn pending_student_is_not_a_student() {
        let id = Uuid::new_v4();
        let ctx = context([(PrincipalKind::PendingStudent, id)].into_iter().collect());
        assert_eq!(ctx.pending_student(), Some(id));
        assert!(ctx.student().is_none());
        assert!(matches!(
            ctx.require(PrincipalKind::Student),
            Err(Error::Forbidden(_))
        ));
    }
}
