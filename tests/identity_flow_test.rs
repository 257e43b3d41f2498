mod common;

use axum::http::StatusCode;
use common::{setup, unique};

#[tokio::test]
async fn signup_verify_signin_end_to_end() {
    let Some(app) = setup().await else { return };
    let username = unique("flow");
    let signup_body = format!(
        "username={u}&email={u}%40campus.test&password=secret123",
        u = username
    );

    let res = app.form("/signup", &signup_body, None).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/verify.html"));
    let pending = res.session_cookie().expect("cookie");

    // Account and empty profile exist for the same identity.
    let (verified, profile_rows): (bool, i64) = sqlx::query_as(
        "SELECT u.is_verified, (SELECT COUNT(*) FROM profiles p WHERE p.user_id = u.id) \
         FROM users u WHERE u.username = $1",
    )
    .bind(&username)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert!(!verified);
    assert_eq!(profile_rows, 1);

    let status = app.get("/auth-status", Some(&pending)).await.json();
    assert_eq!(status["authenticated"], false);
    assert_eq!(status["verification_pending"], true);

    // Same username again is a conflict.
    let res = app.form("/signup", &signup_body, None).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.text().contains("Go Back"));

    // Unverified sign-in is sent back to verification.
    let signin_body = format!("username={}&password=secret123", username);
    let res = app.form("/signin", &signin_body, None).await;
    assert_eq!(res.location(), Some("/verify.html?required=1"));

    let code = app.stored_code(&username).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };
    let res = app
        .form("/verify-code", &format!("code={}", wrong), Some(&pending))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .form("/verify-code", &format!("code={}", code), Some(&pending))
        .await;
    assert_eq!(res.location(), Some("/signin.html?verified=1"));

    let res = app.form("/signin", &signin_body, None).await;
    assert_eq!(res.location(), Some("/profile.html"));
    let cookie = res.session_cookie().expect("student cookie");

    let status = app.get("/auth-status", Some(&cookie)).await.json();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["username"], username.as_str());

    let data = app.get("/profile-data", Some(&cookie)).await;
    assert_eq!(data.status, StatusCode::OK);
    assert_eq!(data.json()["username"], username.as_str());

    let res = app.get("/logout", Some(&cookie)).await;
    assert_eq!(res.location(), Some("/signin.html"));
    let res = app.get("/profile-data", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_code_is_rejected_even_when_correct() {
    let Some(app) = setup().await else { return };
    let username = unique("late");
    let res = app
        .form(
            "/signup",
            &format!("username={u}&email={u}%40campus.test&password=secret123", u = username),
            None,
        )
        .await;
    let pending = res.session_cookie().expect("cookie");
    let code = app.stored_code(&username).await;

    sqlx::query("UPDATE users SET code_expiry = NOW() - INTERVAL '1 minute' WHERE username = $1")
        .bind(&username)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app
        .form("/verify-code", &format!("code={}", code), Some(&pending))
        .await;
    assert_eq!(res.status, StatusCode::GONE);
}

#[tokio::test]
async fn resend_replaces_the_outstanding_code() {
    let Some(app) = setup().await else { return };
    let username = unique("resend");
    let res = app
        .form(
            "/signup",
            &format!("username={u}&email={u}%40campus.test&password=secret123", u = username),
            None,
        )
        .await;
    let pending = res.session_cookie().expect("cookie");
    let first = app.stored_code(&username).await;

    // Force a distinct code so the old one is guaranteed stale.
    loop {
        let res = app.form("/resend-code", "", Some(&pending)).await;
        assert_eq!(res.status, StatusCode::OK);
        if app.stored_code(&username).await != first {
            break;
        }
    }

    let res = app
        .form("/verify-code", &format!("code={}", first), Some(&pending))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let verified: bool = sqlx::query_scalar("SELECT is_verified FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(!verified);

    let current = app.stored_code(&username).await;
    let res = app
        .form("/verify-code", &format!("code={}", current), Some(&pending))
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn padded_username_is_measured_after_trimming() {
    let Some(app) = setup().await else { return };
    let email = format!("{}%40campus.test", unique("pad"));
    let res = app
        .form(
            "/signup",
            &format!("username=%20%20%20e1&email={}&password=secret123", email),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email.replace("%40", "@"))
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let Some(app) = setup().await else { return };
    let (username, _) = app.verified_student().await;

    let wrong_password = app
        .form("/signin", &format!("username={}&password=nope123", username), None)
        .await;
    let unknown_user = app
        .form("/signin", &format!("username={}&password=nope123", unique("ghost")), None)
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.text(), unknown_user.text());
}

#[tokio::test]
async fn admin_routes_reject_students() {
    let Some(app) = setup().await else { return };
    let (_, student) = app.verified_student().await;

    let res = app.get("/api/admin/drives", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let res = app.get("/api/admin/drives", Some(&student)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["code"], "unauthorized");

    let admin = app.admin().await;
    let res = app.get("/api/admin/drives", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
}
