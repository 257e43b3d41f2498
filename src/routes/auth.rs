use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};

use crate::{
    dto::auth_dto::{
        AdminSignupForm, AuthStatusResponse, PrincipalStatus, RecruiterSignupForm, SigninForm,
        SigninOutcome, SignupForm, VerifyCodeForm,
    },
    error::{Error, PageError, Result},
    middleware::auth::{clear_session_cookie, session_cookie, SessionContext},
    models::session::PrincipalKind,
    routes::pages::notice_page,
    AppState,
};

type PageResult = std::result::Result<Response, PageError>;

fn with_session_cookie(state: &AppState, token: &str, response: impl IntoResponse) -> Response {
    let cookie = session_cookie(token, state.sessions.ttl().num_seconds(), state.cookie_secure);
    ([(header::SET_COOKIE, cookie)], response).into_response()
}

fn with_cleared_cookie(state: &AppState, response: impl IntoResponse) -> Response {
    ([(header::SET_COOKIE, clear_session_cookie(state.cookie_secure))], response).into_response()
}

fn verification_session_lost() -> Error {
    Error::Unauthenticated(
        "No verification is in progress. Please sign in to receive a code.".into(),
    )
}

#[axum::debug_handler(state = AppState)]
pub async fn signup(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<SignupForm>,
) -> PageResult {
    let registration = state.identity.register(form).await?;
    let token = state
        .sessions
        .attach(ctx.session.as_ref(), PrincipalKind::PendingStudent, registration.account_id)
        .await?;

    if registration.email_sent {
        Ok(with_session_cookie(&state, &token, Redirect::to("/verify.html")))
    } else {
        let page = notice_page(
            "Account created",
            "We could not send your verification email. Use \"Resend code\" on the next page to try again.",
            "/verify.html",
        );
        Ok(with_session_cookie(&state, &token, Html(page)))
    }
}

#[axum::debug_handler(state = AppState)]
pub async fn verify_code(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<VerifyCodeForm>,
) -> PageResult {
    let (Some(session), Some(account_id)) = (ctx.session.as_ref(), ctx.pending_student()) else {
        return Err(verification_session_lost().into());
    };

    state.identity.verify(account_id, &form.code).await?;
    state
        .sessions
        .detach(session, PrincipalKind::PendingStudent)
        .await?;
    Ok(Redirect::to("/signin.html?verified=1").into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn resend_code(State(state): State<AppState>, ctx: SessionContext) -> PageResult {
    let account_id = ctx.pending_student().ok_or_else(verification_session_lost)?;
    state.identity.resend(account_id).await?;
    let page = notice_page(
        "Code sent",
        "A new verification code has been sent to your email. Earlier codes no longer work.",
        "/verify.html",
    );
    Ok(Html(page).into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn signin(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<SigninForm>,
) -> PageResult {
    let (kind, account_id, target) = match state.identity.signin(form).await? {
        SigninOutcome::Authenticated(id) => (PrincipalKind::Student, id, "/profile.html"),
        SigninOutcome::VerificationRequired(id) => {
            (PrincipalKind::PendingStudent, id, "/verify.html?required=1")
        }
    };
    let token = state
        .sessions
        .attach(ctx.session.as_ref(), kind, account_id)
        .await?;
    Ok(with_session_cookie(&state, &token, Redirect::to(target)))
}

/// Ends every principal on the session. Safe to call without one.
#[axum::debug_handler(state = AppState)]
pub async fn logout(State(state): State<AppState>, ctx: SessionContext) -> PageResult {
    if let Some(session) = ctx.session.as_ref() {
        state.sessions.destroy(&session.token_hash).await?;
    }
    Ok(with_cleared_cookie(&state, Redirect::to("/signin.html")))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_signup(
    State(state): State<AppState>,
    Form(form): Form<AdminSignupForm>,
) -> PageResult {
    state
        .identity
        .admin_signup(form, state.admin_signup_key.as_deref())
        .await?;
    Ok(Redirect::to("/admin-signin.html").into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_signin(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<SigninForm>,
) -> PageResult {
    let admin_id = state.identity.admin_signin(form).await?;
    let token = state
        .sessions
        .attach(ctx.session.as_ref(), PrincipalKind::Admin, admin_id)
        .await?;
    Ok(with_session_cookie(&state, &token, Redirect::to("/admin-dashboard.html")))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_logout(State(state): State<AppState>, ctx: SessionContext) -> PageResult {
    detach_kind(&state, &ctx, PrincipalKind::Admin).await?;
    Ok(Redirect::to("/admin-signin.html").into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn recruiter_signup(
    State(state): State<AppState>,
    Form(form): Form<RecruiterSignupForm>,
) -> PageResult {
    state.identity.recruiter_signup(form).await?;
    Ok(Redirect::to("/recruiter-signin.html").into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn recruiter_signin(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<SigninForm>,
) -> PageResult {
    let recruiter_id = state.identity.recruiter_signin(form).await?;
    let token = state
        .sessions
        .attach(ctx.session.as_ref(), PrincipalKind::Recruiter, recruiter_id)
        .await?;
    Ok(with_session_cookie(
        &state,
        &token,
        Redirect::to("/recruiter-dashboard.html"),
    ))
}

#[axum::debug_handler(state = AppState)]
pub async fn recruiter_logout(State(state): State<AppState>, ctx: SessionContext) -> PageResult {
    detach_kind(&state, &ctx, PrincipalKind::Recruiter).await?;
    Ok(Redirect::to("/recruiter-signin.html").into_response())
}

async fn detach_kind(state: &AppState, ctx: &SessionContext, kind: PrincipalKind) -> Result<()> {
    if let Some(session) = ctx.session.as_ref() {
        if session.claims.get(kind).is_some() {
            state.sessions.detach(session, kind).await?;
        }
    }
    Ok(())
}

#[axum::debug_handler(state = AppState)]
pub async fn auth_status(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<impl IntoResponse> {
    let student = match ctx.student() {
        Some(id) => state.identity.find_account(id).await?.map(|a| a.username),
        None => None,
    };
    let admin = match ctx.admin() {
        Some(id) => state.identity.find_admin(id).await?.map(|a| a.username),
        None => None,
    };
    let recruiter = match ctx.recruiter() {
        Some(id) => state.identity.find_recruiter(id).await?.map(|r| r.username),
        None => None,
    };

    Ok(Json(AuthStatusResponse {
        authenticated: student.is_some(),
        username: student,
        verification_pending: ctx.pending_student().is_some(),
        admin: PrincipalStatus {
            authenticated: admin.is_some(),
            username: admin,
        },
        recruiter: PrincipalStatus {
            authenticated: recruiter.is_some(),
            username: recruiter,
        },
    }))
}
