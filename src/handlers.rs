use crate::{
    AppState, access,
    auth::Session,
    models::{AccessDecision, LandingResponse, NavLink, SessionProfile, UserSummary},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

/// PathQuery
///
/// Query parameters of the access check endpoints. `path` is the front-end
/// route to check and may itself carry a (URL-encoded) `?tab=` suffix.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PathQuery {
    /// Front-end route, e.g. `/batchcode/hot-coil` or `/?tab=batchcode`.
    pub path: String,
}

// --- Handlers ---

/// get_pages
///
/// [Public Route] The static page catalogue, in table order.
#[utoipa::path(
    get,
    path = "/pages",
    responses((status = 200, description = "Page catalogue", body = [NavLink]))
)]
pub async fn get_pages() -> Json<Vec<NavLink>> {
    Json(access::page_catalogue())
}

/// get_landing
///
/// [Public Route] Post-login redirection target. Anonymous visitors are sent to
/// the login page.
#[utoipa::path(
    get,
    path = "/access/landing",
    responses((status = 200, description = "Landing route", body = LandingResponse))
)]
pub async fn get_landing(session: Option<Session>) -> Json<LandingResponse> {
    let path = access::default_allowed_path(session.as_ref().map(|s| &s.access));
    Json(LandingResponse { path })
}

/// get_me
///
/// [Authenticated Route] The validated session: role, grants and landing route.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Session", body = SessionProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(session: Session) -> Json<SessionProfile> {
    Json(session.profile())
}

/// check_path
///
/// [Authenticated Route] Whether the session may open `path`. The front-end
/// router calls this before rendering a protected route.
#[utoipa::path(
    get,
    path = "/access/check",
    params(PathQuery),
    responses(
        (status = 200, description = "Decision", body = AccessDecision),
        (status = 400, description = "Missing path"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn check_path(session: Session, Query(query): Query<PathQuery>) -> Json<AccessDecision> {
    let allowed = session.allows(&query.path);
    if !allowed {
        tracing::debug!(user_id = %session.id, path = %query.path, "Path denied");
    }
    Json(AccessDecision {
        path: query.path,
        allowed,
    })
}

/// get_navigation
///
/// [Authenticated Route] Sidebar links the session may follow.
#[utoipa::path(
    get,
    path = "/access/navigation",
    responses((status = 200, description = "Allowed links", body = [NavLink]))
)]
pub async fn get_navigation(session: Session) -> Json<Vec<NavLink>> {
    Json(access::allowed_navigation(Some(&session.access)))
}

/// get_admin_users
///
/// [Admin Route] Every directory user with their role and landing route.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserSummary]),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn get_admin_users(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, StatusCode> {
    if !session.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    let users = state
        .directory
        .list_users()
        .await
        .into_iter()
        .map(|record| {
            let user = Session::from_record(&record, None);
            UserSummary {
                landing_path: user.landing_path(),
                role: user.access.role,
                id: user.id,
                email: user.email,
            }
        })
        .collect();

    Ok(Json(users))
}

/// check_user_path
///
/// [Admin Route] Runs the access check on behalf of another user, so an
/// administrator can verify a provisioning change.
#[utoipa::path(
    get,
    path = "/admin/users/{id}/check",
    params(("id" = Uuid, Path, description = "User ID"), PathQuery),
    responses(
        (status = 200, description = "Decision", body = AccessDecision),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn check_user_path(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PathQuery>,
) -> Result<Json<AccessDecision>, StatusCode> {
    if !session.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    let record = state
        .directory
        .get_user(id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    let user = Session::from_record(&record, None);

    Ok(Json(AccessDecision {
        allowed: user.allows(&query.path),
        path: query.path,
    }))
}
