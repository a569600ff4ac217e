//! Book HTTP handlers.
//!
//! ```text
//! GET  /api/v1/books/{book_id}
//! POST /api/v1/books/{book_id}/borrow
//! POST /api/v1/books/{book_id}/reservations
//! GET  /api/v1/books/{book_id}/reservations
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::ports::{BorrowBookRequest, ReserveBookRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_lending_error;
use crate::inbound::http::lending_dto::{BookBody, BorrowBody, QueueEntryBody, ReservationBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_book_id;

/// Fetch a book and whether the caller may borrow it.
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_id}",
    params(("book_id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 200, description = "Book", body = BookBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown book", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook",
    security(("SessionCookie" = []))
)]
#[get("/books/{book_id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookBody>> {
    let user_id = session.require_member()?;
    let book_id = parse_book_id(&path.into_inner())?;
    let book = state
        .lending_query
        .get_book(&book_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(BookBody::for_member(book, &user_id)))
}

/// Borrow a book that is available or held for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/books/{book_id}/borrow",
    params(("book_id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 201, description = "Borrow opened", body = BorrowBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown book", body = ErrorSchema),
        (status = 409, description = "Book unavailable or already borrowed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "borrowBook",
    security(("SessionCookie" = []))
)]
#[post("/books/{book_id}/borrow")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_member()?;
    let book_id = parse_book_id(&path.into_inner())?;
    let response = state
        .lending
        .borrow_book(BorrowBookRequest { user_id, book_id })
        .await
        .map_err(map_lending_error)?;
    Ok(HttpResponse::Created().json(BorrowBody::from(response)))
}

/// Join the wait list for an unavailable book.
#[utoipa::path(
    post,
    path = "/api/v1/books/{book_id}/reservations",
    params(("book_id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 201, description = "Reservation created", body = ReservationBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown book", body = ErrorSchema),
        (status = 409, description = "Duplicate reservation or book available", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "reserveBook",
    security(("SessionCookie" = []))
)]
#[post("/books/{book_id}/reservations")]
pub async fn reserve_book(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_member()?;
    let book_id = parse_book_id(&path.into_inner())?;
    let response = state
        .lending
        .reserve_book(ReserveBookRequest { user_id, book_id })
        .await
        .map_err(map_lending_error)?;
    Ok(HttpResponse::Created().json(ReservationBody::from(response)))
}

/// A book's wait list, in queue order.
///
/// Other members' entries show only their place and status; the caller's
/// own entry also carries its reservation id.
#[utoipa::path(
    get,
    path = "/api/v1/books/{book_id}/reservations",
    params(("book_id" = String, Path, format = "uuid", description = "Book identifier")),
    responses(
        (status = 200, description = "Wait list", body = [QueueEntryBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown book", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBookReservations",
    security(("SessionCookie" = []))
)]
#[get("/books/{book_id}/reservations")]
pub async fn list_book_reservations(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<QueueEntryBody>>> {
    let member = session.require_member()?;
    let book_id = parse_book_id(&path.into_inner())?;
    let views = state
        .lending_query
        .book_reservations(&book_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(
        views
            .iter()
            .map(|view| QueueEntryBody::for_viewer(view, &member))
            .collect(),
    ))
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
