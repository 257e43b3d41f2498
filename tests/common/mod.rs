#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use placement_portal::{
    app::build_router, config::init_config, database::pool, services::mail_service::LogMailer,
    AppState,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `placement_sid=<token>` from the Set-Cookie header, ready to send back.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| {
                let pair = v.split(';').next()?.trim();
                pair.starts_with("placement_sid=").then(|| pair.to_string())
            })
    }
}

/// Builds the app against `DATABASE_URL`. Returns `None` when no database is
/// configured so the suite can run without one.
pub async fn setup() -> Option<TestApp> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping database-backed test");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("SESSION_SECRET", "test_session_secret");
    env::set_var("ADMIN_SIGNUP_KEY", ADMIN_KEY);
    env::set_var("AUTH_RPS", "10000");
    env::set_var("API_RPS", "10000");
    env::set_var("UPLOADS_DIR", env::temp_dir().join("placement-uploads"));
    env::remove_var("SMTP_HOST");
    env::remove_var("OPENAI_API_KEY");

    // Another test in this binary may already have loaded the config.
    let _ = init_config();
    let pool = pool::create_pool().await.expect("pool");
    pool::run_migrations(&pool).await.expect("migrations");

    let state = AppState::with_mailer(pool.clone(), Arc::new(LogMailer)).expect("state");
    Some(TestApp {
        router: build_router(state),
        pool,
    })
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.expect("response");
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn form(&self, uri: &str, body: &str, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: &JsonValue,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn stored_code(&self, username: &str) -> String {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT verification_code FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .expect("user row")
        .expect("pending code")
    }

    /// Signs up, verifies and signs in a student. Returns the username and the
    /// session cookie.
    pub async fn verified_student(&self) -> (String, String) {
        let username = unique("student");
        let res = self
            .form(
                "/signup",
                &format!(
                    "username={u}&email={u}%40campus.test&password=secret123",
                    u = username
                ),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{}", res.text());
        let pending = res.session_cookie().expect("pending cookie");

        let code = self.stored_code(&username).await;
        let res = self
            .form("/verify-code", &format!("code={}", code), Some(&pending))
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{}", res.text());

        let res = self
            .form(
                "/signin",
                &format!("username={}&password=secret123", username),
                None,
            )
            .await;
        assert_eq!(res.location(), Some("/profile.html"));
        (username, res.session_cookie().expect("student cookie"))
    }

    pub async fn admin(&self) -> String {
        let username = unique("admin");
        let res = self
            .form(
                "/admin/signup",
                &format!(
                    "username={u}&email={u}%40campus.test&password=secret123&signup_key={k}",
                    u = username,
                    k = ADMIN_KEY
                ),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{}", res.text());
        let res = self
            .form(
                "/admin/signin",
                &format!("username={}&password=secret123", username),
                None,
            )
            .await;
        assert_eq!(res.location(), Some("/admin-dashboard.html"));
        res.session_cookie().expect("admin cookie")
    }
}
