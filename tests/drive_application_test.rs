mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{setup, unique};
use serde_json::json;

#[tokio::test]
async fn apply_advance_and_export() {
    let Some(app) = setup().await else { return };
    let admin = app.admin().await;
    let (username, student) = app.verified_student().await;
    let company = unique("Acme \"Labs\"");

    let res = app
        .json(
            "POST",
            "/api/admin/drives",
            &json!({
                "company": company,
                "role": "Backend Engineer",
                "job_type": "Full-time",
                "eligible_branches": "",
                "deadline": (Utc::now() + Duration::days(7)).to_rfc3339(),
            }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text());
    let drive = res.json();
    let drive_id = drive["id"].as_str().unwrap().to_string();
    assert_eq!(drive["status"], "published");

    // Empty eligible branches match any branch filter.
    let res = app
        .get(&format!("/api/drives?branch=ECE&company={}", urlencode(&company)), None)
        .await;
    let listed = res.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let res = app
        .form("/apply", &format!("drive_id={}", drive_id), Some(&student))
        .await;
    assert_eq!(res.location(), Some("/applySuccess.html"));

    let res = app
        .form("/apply", &format!("drive_id={}", drive_id), Some(&student))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications a JOIN users u ON u.id = a.user_id \
         WHERE u.username = $1 AND a.drive_id = $2::uuid",
    )
    .bind(&username)
    .bind(&drive_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let mine = app.get("/api/my-applications", Some(&student)).await.json();
    let application_id = mine[0]["id"].as_str().unwrap().to_string();
    assert_eq!(mine[0]["company"], company.as_str());

    for (round, status) in [("Aptitude", "Cleared"), ("Technical", "Scheduled")] {
        let res = app
            .json(
                "POST",
                &format!("/api/admin/applications/{}/round-update", application_id),
                &json!({ "round_name": round, "status": status }),
                Some(&admin),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.text());
        let body = res.json();
        assert_eq!(body["application"]["current_round"], round);
        assert_eq!(body["application"]["status"], status);
        assert_eq!(body["event"]["round_name"], round);
    }

    let rounds = app
        .get(
            &format!("/api/my-applications/{}/rounds", application_id),
            Some(&student),
        )
        .await
        .json();
    assert_eq!(rounds.as_array().unwrap().len(), 2);

    let csv = app
        .get("/api/admin/reports/applications.csv", Some(&admin))
        .await;
    assert_eq!(csv.status, StatusCode::OK);
    let text = csv.text();
    assert!(text.starts_with("\"Application ID\","));
    let line = text
        .lines()
        .find(|l| l.contains(&application_id))
        .expect("exported row");
    assert!(line.contains(&company.replace('"', "\"\"")));
    assert!(line.contains("\"Technical\""));
}

#[tokio::test]
async fn past_deadline_drive_leaves_the_listing() {
    let Some(app) = setup().await else { return };
    let admin = app.admin().await;
    let company = unique("Closing");

    let res = app
        .json(
            "POST",
            "/api/admin/drives",
            &json!({
                "company": company,
                "role": "Analyst",
                "deadline": (Utc::now() + Duration::days(1)).to_rfc3339(),
            }),
            Some(&admin),
        )
        .await;
    let drive_id = res.json()["id"].as_str().unwrap().to_string();
    let uri = format!("/api/drives?company={}", urlencode(&company));
    assert_eq!(app.get(&uri, None).await.json().as_array().unwrap().len(), 1);

    let res = app
        .json(
            "PATCH",
            &format!("/api/admin/drives/{}", drive_id),
            &json!({ "deadline": (Utc::now() - Duration::hours(1)).to_rfc3339() }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    assert!(app.get(&uri, None).await.json().as_array().unwrap().is_empty());

    let res = app
        .json(
            "POST",
            "/api/admin/drives",
            &json!({
                "company": company,
                "role": "Draft role",
                "status": "draft",
                "deadline": (Utc::now() + Duration::days(3)).to_rfc3339(),
            }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(app.get(&uri, None).await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn applying_to_unknown_drive_is_not_found() {
    let Some(app) = setup().await else { return };
    let (_, student) = app.verified_student().await;
    let res = app
        .form(
            "/apply",
            &format!("drive_id={}", uuid::Uuid::new_v4()),
            Some(&student),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.text().contains("Go Back"));
}

#[tokio::test]
async fn drive_with_round_history_cannot_be_deleted() {
    let Some(app) = setup().await else { return };
    let admin = app.admin().await;
    let (_, student) = app.verified_student().await;

    let create = |company: String| {
        json!({
            "company": company,
            "role": "Support Engineer",
            "deadline": (Utc::now() + Duration::days(5)).to_rfc3339(),
        })
    };
    let res = app
        .json("POST", "/api/admin/drives", &create(unique("Keep")), Some(&admin))
        .await;
    let drive_id = res.json()["id"].as_str().unwrap().to_string();

    app.form("/apply", &format!("drive_id={}", drive_id), Some(&student))
        .await;
    let mine = app.get("/api/my-applications", Some(&student)).await.json();
    let application_id = mine[0]["id"].as_str().unwrap().to_string();
    let res = app
        .json(
            "POST",
            &format!("/api/admin/applications/{}/round-update", application_id),
            &json!({ "round_name": "Aptitude", "status": "Cleared" }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());

    let res = app
        .send(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/drives/{}", drive_id))
                .header(axum::http::header::COOKIE, &admin)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT, "{}", res.text());

    let rounds: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM application_rounds WHERE application_id = $1::uuid",
    )
    .bind(&application_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(rounds, 1);
    let history = app
        .get(
            &format!("/api/my-applications/{}/rounds", application_id),
            Some(&student),
        )
        .await;
    assert_eq!(history.json().as_array().unwrap().len(), 1);

    // A drive nobody applied to still deletes.
    let res = app
        .json("POST", "/api/admin/drives", &create(unique("Empty")), Some(&admin))
        .await;
    let empty_id = res.json()["id"].as_str().unwrap().to_string();
    let res = app
        .send(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/drives/{}", empty_id))
                .header(axum::http::header::COOKIE, &admin)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn recruiter_drive_waits_for_admin_approval() {
    let Some(app) = setup().await else { return };
    let admin = app.admin().await;
    let username = unique("recruiter");
    let company = unique("Initech");

    let res = app
        .form(
            "/recruiter/signup",
            &format!(
                "username={u}&email={u}%40hiring.test&password=secret123&company_name={c}",
                u = username,
                c = urlencode(&company)
            ),
            None,
        )
        .await;
    assert_eq!(res.location(), Some("/recruiter-signin.html"), "{}", res.text());

    let res = app
        .form(
            "/recruiter/signin",
            &format!("username={}&password=secret123", username),
            None,
        )
        .await;
    assert_eq!(res.location(), Some("/recruiter-dashboard.html"));
    let recruiter = res.session_cookie().expect("recruiter cookie");

    let res = app
        .json(
            "POST",
            "/api/recruiter/drives",
            &json!({
                "company": company,
                "role": "Data Engineer",
                "deadline": (Utc::now() + Duration::days(10)).to_rfc3339(),
            }),
            Some(&recruiter),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text());
    let drive = res.json();
    assert_eq!(drive["status"], "pending_approval");
    let drive_id = drive["id"].as_str().unwrap().to_string();

    let uri = format!("/api/drives?company={}", urlencode(&company));
    assert!(app.get(&uri, None).await.json().as_array().unwrap().is_empty());

    let own = app.get("/api/recruiter/drives", Some(&recruiter)).await.json();
    assert!(own
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["id"].as_str() == Some(drive_id.as_str())));

    let res = app
        .json(
            "PATCH",
            &format!("/api/admin/drives/{}", drive_id),
            &json!({ "status": "published" }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());

    let listed = app.get(&uri, None).await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], drive_id.as_str());
}

#[tokio::test]
async fn company_name_application_is_recorded_without_owner() {
    let Some(app) = setup().await else { return };
    let company = unique("Walk-in Co");

    let res = app
        .form(
            "/apply",
            &format!("company_name={}", urlencode(&company)),
            None,
        )
        .await;
    assert_eq!(res.location(), Some("/applySuccess.html"), "{}", res.text());

    let (owner, drive, status): (Option<uuid::Uuid>, Option<uuid::Uuid>, String) =
        sqlx::query_as(
            "SELECT user_id, drive_id, status FROM applications WHERE company_name = $1",
        )
        .bind(&company)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(owner.is_none());
    assert!(drive.is_none());
    assert_eq!(status, "Application Submitted");
}

#[tokio::test]
async fn round_update_on_unknown_application_is_not_found() {
    let Some(app) = setup().await else { return };
    let admin = app.admin().await;
    let res = app
        .json(
            "POST",
            &format!(
                "/api/admin/applications/{}/round-update",
                uuid::Uuid::new_v4()
            ),
            &json!({ "round_name": "Technical", "status": "Scheduled" }),
            Some(&admin),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.text().contains("Application not found."));
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}
