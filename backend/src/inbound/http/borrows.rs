//! Borrow HTTP handlers.
//!
//! ```text
//! GET  /api/v1/borrows
//! POST /api/v1/borrows/{borrow_id}/return
//! POST /api/v1/borrows/{borrow_id}/extend
//! GET  /api/v1/history
//! ```

use actix_web::{get, post, web};

use crate::domain::ports::{ExtendBorrowRequest, ReturnBookRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_lending_error;
use crate::inbound::http::lending_dto::{BorrowBody, HistoryEntryBody, ReturnBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_borrow_id;

/// The caller's active borrows, earliest due date first.
#[utoipa::path(
    get,
    path = "/api/v1/borrows",
    responses(
        (status = 200, description = "Active borrows", body = [BorrowBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["borrows"],
    operation_id = "listBorrows",
    security(("SessionCookie" = []))
)]
#[get("/borrows")]
pub async fn list_borrows(
    state: web::Data<HttpState>,
    session: MemberSession,
) -> ApiResult<web::Json<Vec<BorrowBody>>> {
    let user_id = session.require_member()?;
    let borrows = state
        .lending_query
        .active_borrows(&user_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(borrows.into_iter().map(BorrowBody::from).collect()))
}

/// Return a borrowed book; the copy passes to the next member in line.
#[utoipa::path(
    post,
    path = "/api/v1/borrows/{borrow_id}/return",
    params(("borrow_id" = String, Path, format = "uuid", description = "Borrow identifier")),
    responses(
        (status = 200, description = "Book returned", body = ReturnBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Borrow belongs to another member", body = ErrorSchema),
        (status = 404, description = "Unknown borrow", body = ErrorSchema),
        (status = 409, description = "Already returned", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["borrows"],
    operation_id = "returnBook",
    security(("SessionCookie" = []))
)]
#[post("/borrows/{borrow_id}/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReturnBody>> {
    let user_id = session.require_member()?;
    let borrow_id = parse_borrow_id(&path.into_inner())?;
    let response = state
        .lending
        .return_book(ReturnBookRequest { borrow_id, user_id })
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(response.into()))
}

/// Extend an active loan while nobody is waiting for the book.
#[utoipa::path(
    post,
    path = "/api/v1/borrows/{borrow_id}/extend",
    params(("borrow_id" = String, Path, format = "uuid", description = "Borrow identifier")),
    responses(
        (status = 200, description = "Loan extended", body = BorrowBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Borrow belongs to another member", body = ErrorSchema),
        (status = 404, description = "Unknown borrow", body = ErrorSchema),
        (status = 409, description = "Queue non-empty or loan closed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["borrows"],
    operation_id = "extendBorrow",
    security(("SessionCookie" = []))
)]
#[post("/borrows/{borrow_id}/extend")]
pub async fn extend_borrow(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<BorrowBody>> {
    let user_id = session.require_member()?;
    let borrow_id = parse_borrow_id(&path.into_inner())?;
    let response = state
        .lending
        .extend_borrow(ExtendBorrowRequest { borrow_id, user_id })
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(response.into()))
}

/// The caller's closed loans, most recently returned first.
#[utoipa::path(
    get,
    path = "/api/v1/history",
    responses(
        (status = 200, description = "Borrow history", body = [HistoryEntryBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["borrows"],
    operation_id = "borrowHistory",
    security(("SessionCookie" = []))
)]
#[get("/history")]
pub async fn borrow_history(
    state: web::Data<HttpState>,
    session: MemberSession,
) -> ApiResult<web::Json<Vec<HistoryEntryBody>>> {
    let user_id = session.require_member()?;
    let history = state
        .lending_query
        .borrow_history(&user_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(history.into_iter().map(HistoryEntryBody::from).collect()))
}

#[cfg(test)]
#[path = "borrows_tests.rs"]
mod tests;
