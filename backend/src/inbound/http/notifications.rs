//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET    /api/v1/notifications
//! DELETE /api/v1/notifications/{notification_id}
//! ```

use actix_web::{HttpResponse, delete, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_lending_error;
use crate::inbound::http::lending_dto::NotificationBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_notification_id;

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications", body = [NotificationBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("SessionCookie" = []))
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: MemberSession,
) -> ApiResult<web::Json<Vec<NotificationBody>>> {
    let user_id = session.require_member()?;
    let notifications = state
        .lending_query
        .notifications(&user_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(
        notifications.into_iter().map(NotificationBody::from).collect(),
    ))
}

/// Delete one of the caller's notifications.
///
/// Another member's notification is reported as not found.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{notification_id}",
    params((
        "notification_id" = String,
        Path,
        format = "uuid",
        description = "Notification identifier"
    )),
    responses(
        (status = 204, description = "Notification dismissed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown notification", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "dismissNotification",
    security(("SessionCookie" = []))
)]
#[delete("/notifications/{notification_id}")]
pub async fn dismiss_notification(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_member()?;
    let notification_id = parse_notification_id(&path.into_inner())?;
    state
        .lending_query
        .dismiss_notification(&user_id, &notification_id)
        .await
        .map_err(map_lending_error)?;
    Ok(HttpResponse::NoContent().finish())
}
