use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::get_config,
    middleware::{
        cors::api_cors,
        rate_limit::{rps_middleware, RateLimiter},
    },
    routes, AppState,
};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Full application router: form routes, JSON API, uploads and static pages.
pub fn build_router(state: AppState) -> Router {
    let config = get_config();

    let auth_forms = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/verify-code", post(routes::auth::verify_code))
        .route("/resend-code", post(routes::auth::resend_code))
        .route("/signin", post(routes::auth::signin))
        .route("/logout", get(routes::auth::logout))
        .route("/admin/signup", post(routes::auth::admin_signup))
        .route("/admin/signin", post(routes::auth::admin_signin))
        .route("/admin/logout", get(routes::auth::admin_logout))
        .route("/recruiter/signup", post(routes::auth::recruiter_signup))
        .route("/recruiter/signin", post(routes::auth::recruiter_signin))
        .route("/recruiter/logout", get(routes::auth::recruiter_logout))
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.auth_rps),
            rps_middleware,
        ));

    let student_api = Router::new()
        .route("/apply", post(routes::applications::apply))
        .route("/update-profile", post(routes::profile::update_profile))
        .route("/profile.html", get(routes::profile::profile_page))
        .route("/auth-status", get(routes::auth::auth_status))
        .route("/profile-data", get(routes::profile::profile_data))
        .route("/chatbot", post(routes::chat::chat))
        .route("/chatbot/stream", post(routes::chat::chat_stream))
        .route("/api/drives", get(routes::drives::list_drives))
        .route("/api/drives/eligible", get(routes::drives::list_eligible_drives))
        .route("/api/drives/:id", get(routes::drives::get_drive))
        .route(
            "/api/my-applications",
            get(routes::applications::my_applications),
        )
        .route(
            "/api/my-applications/:id/rounds",
            get(routes::applications::my_application_rounds),
        )
        .route("/api/announcements", get(routes::announcements::feed))
        .route(
            "/api/tickets",
            get(routes::helpdesk::my_tickets).post(routes::helpdesk::open_ticket),
        )
        .route("/api/interview-slots", get(routes::interviews::my_slots))
        .route("/api/offers", get(routes::offers::my_offers))
        .route("/api/offers/:id/respond", post(routes::offers::respond))
        .route(
            "/api/documents",
            get(routes::documents::my_documents).post(routes::documents::upload),
        )
        .route("/api/mentors", get(routes::mentors::list_mentors))
        .route(
            "/api/mentor-sessions",
            get(routes::mentors::my_sessions).post(routes::mentors::book_session),
        )
        .route(
            "/api/success-stories",
            get(routes::stories::list).post(routes::stories::share),
        );

    let admin_api = Router::new()
        .route(
            "/api/admin/drives",
            get(routes::drives::admin_list_drives).post(routes::drives::admin_create_drive),
        )
        .route(
            "/api/admin/drives/:id",
            get(routes::drives::admin_get_drive)
                .patch(routes::drives::admin_update_drive)
                .delete(routes::drives::admin_delete_drive),
        )
        .route(
            "/api/admin/drives/:id/applicants",
            get(routes::applications::admin_drive_applicants),
        )
        .route(
            "/api/admin/applications",
            get(routes::applications::admin_list_applications),
        )
        .route(
            "/api/admin/applications/:id/round-update",
            post(routes::applications::admin_round_update),
        )
        .route(
            "/api/admin/applications/:id/rounds",
            get(routes::applications::admin_application_rounds),
        )
        .route(
            "/api/admin/reports/applications.csv",
            get(routes::export::export_applications_csv),
        )
        .route(
            "/api/admin/reports/applications.xlsx",
            get(routes::export::export_applications_xlsx),
        )
        .route(
            "/api/admin/students/:id/profile",
            get(routes::profile::admin_view_profile),
        )
        .route(
            "/api/admin/announcements",
            get(routes::announcements::admin_list).post(routes::announcements::admin_create),
        )
        .route(
            "/api/admin/announcements/:id",
            patch(routes::announcements::admin_update),
        )
        .route("/api/admin/tickets", get(routes::helpdesk::admin_list))
        .route("/api/admin/tickets/:id", patch(routes::helpdesk::admin_update))
        .route(
            "/api/admin/interview-slots",
            get(routes::interviews::admin_list).post(routes::interviews::admin_schedule),
        )
        .route(
            "/api/admin/interview-slots/:id",
            patch(routes::interviews::admin_update),
        )
        .route(
            "/api/admin/offers",
            get(routes::offers::admin_list).post(routes::offers::admin_issue),
        )
        .route("/api/admin/documents", get(routes::documents::admin_list))
        .route(
            "/api/admin/documents/:id",
            patch(routes::documents::admin_review),
        )
        .route("/api/admin/mentors", post(routes::mentors::admin_create_mentor))
        .route(
            "/api/admin/mentor-sessions",
            get(routes::mentors::admin_list_sessions),
        )
        .route(
            "/api/admin/mentor-sessions/:id",
            patch(routes::mentors::admin_update_session),
        );

    let recruiter_api = Router::new()
        .route(
            "/api/recruiter/drives",
            get(routes::drives::recruiter_list_drives).post(routes::drives::recruiter_create_drive),
        )
        .route(
            "/api/recruiter/drives/:id/applicants",
            get(routes::applications::recruiter_drive_applicants),
        )
        .route(
            "/api/recruiter/students/:id/profile",
            get(routes::profile::recruiter_view_profile),
        );

    let api = student_api
        .merge(admin_api)
        .merge(recruiter_api)
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.api_rps),
            rps_middleware,
        ));

    tracing::info!(
        uploads = %config.uploads_dir,
        public = %config.public_dir,
        "Serving static files"
    );

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(auth_forms)
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
