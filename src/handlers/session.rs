use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PassphraseRequest {
    pub passphrase: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub analytics_unlocked: bool,
}

fn status(state: &AppState) -> SessionResponse {
    let session = state.register.session();
    SessionResponse {
        authenticated: session.is_authenticated(),
        analytics_unlocked: session.is_analytics_unlocked(),
    }
}

/// GET /session
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session flags", body = SessionResponse)),
    tag = "session"
)]
pub async fn get_session(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(status(&state))
}

/// POST /session/login
///
/// Unlocks the register. The signed-in flag is persisted so a restart
/// keeps the register open.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = PassphraseRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Wrong passphrase"),
    ),
    tag = "session"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<PassphraseRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.session().login(&body.passphrase)?;
    log::info!("register unlocked");
    Ok(HttpResponse::Ok().json(status(&state)))
}

/// POST /session/logout
#[utoipa::path(
    post,
    path = "/session/logout",
    responses((status = 200, description = "Signed out", body = SessionResponse)),
    tag = "session"
)]
pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.register.session().logout()?;
    log::info!("register locked");
    Ok(HttpResponse::Ok().json(status(&state)))
}

/// POST /session/analytics/unlock
#[utoipa::path(
    post,
    path = "/session/analytics/unlock",
    request_body = PassphraseRequest,
    responses(
        (status = 200, description = "Analytics unlocked", body = SessionResponse),
        (status = 401, description = "Not signed in or wrong passphrase"),
    ),
    tag = "session"
)]
pub async fn unlock_analytics(
    state: web::Data<AppState>,
    body: web::Json<PassphraseRequest>,
) -> Result<HttpResponse, AppError> {
    state.register.session().unlock_analytics(&body.passphrase)?;
    Ok(HttpResponse::Ok().json(status(&state)))
}

/// POST /session/analytics/lock
#[utoipa::path(
    post,
    path = "/session/analytics/lock",
    responses((status = 200, description = "Analytics locked", body = SessionResponse)),
    tag = "session"
)]
pub async fn lock_analytics(state: web::Data<AppState>) -> HttpResponse {
    state.register.session().lock_analytics();
    HttpResponse::Ok().json(status(&state))
}
