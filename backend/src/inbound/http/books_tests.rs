//! Tests for book HTTP handlers.

use super::*;
use crate::domain::ports::{
    BorrowBookResponse, FIXTURE_USER_ID, MockLendingCommand, MockLendingQuery,
    ReserveBookResponse, ReservationView,
};
use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, LendingError, QueuePosition, Reservation,
    ReservationId, UserId,
};
use crate::inbound::http::test_utils::{http_state, login_and_get_cookie, test_session_middleware};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

const BOOK_ID: &str = "00000000-0000-0000-0000-000000000b01";

fn test_app(
    lending: MockLendingCommand,
    lending_query: MockLendingQuery,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(http_state(lending, lending_query)))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(crate::inbound::http::users::login)
                .service(get_book)
                .service(borrow_book)
                .service(reserve_book)
                .service(list_book_reservations),
        )
}

fn member() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture user id")
}

fn book_id() -> BookId {
    BookId::new(BOOK_ID).expect("book id")
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[actix_web::test]
async fn get_book_reports_a_hold_for_the_caller() {
    let mut query = MockLendingQuery::new();
    query
        .expect_get_book()
        .withf(|id| id.to_string() == BOOK_ID)
        .times(1)
        .return_once(|id| {
            Ok(Book::new(*id, "The Left Hand of Darkness", "Ursula K. Le Guin")
                .with_availability(Availability::held_for(member())))
        });
    let app = actix_test::init_service(test_app(MockLendingCommand::new(), query)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/books/{BOOK_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["available"], false);
    assert_eq!(body["heldForYou"], true);
    assert_eq!(body["title"], "The Left Hand of Darkness");
}

#[actix_web::test]
async fn get_book_maps_unknown_books_to_not_found() {
    let mut query = MockLendingQuery::new();
    query
        .expect_get_book()
        .times(1)
        .return_once(|_| Err(LendingError::BookNotFound));
    let app = actix_test::init_service(test_app(MockLendingCommand::new(), query)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/books/{BOOK_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["reason"], "book_not_found");
}

#[actix_web::test]
async fn borrow_book_passes_the_session_member_and_returns_created() {
    let mut command = MockLendingCommand::new();
    command
        .expect_borrow_book()
        .withf(|request| request.user_id == member() && request.book_id == book_id())
        .times(1)
        .return_once(|request| {
            Ok(BorrowBookResponse {
                borrow: BorrowRecord::open(
                    BorrowId::random(),
                    request.user_id,
                    request.book_id,
                    at(),
                    at() + chrono::Duration::days(14),
                ),
            })
        });
    let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/books/{BOOK_ID}/borrow"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["bookId"], BOOK_ID);
    assert_eq!(body["dueAt"], "2026-01-19T10:00:00Z");
    assert_eq!(body["status"], "active");
}

#[actix_web::test]
async fn borrow_book_maps_conflicts_to_409_with_reason() {
    let mut command = MockLendingCommand::new();
    command
        .expect_borrow_book()
        .times(1)
        .return_once(|_| Err(LendingError::Unavailable));
    let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/books/{BOOK_ID}/borrow"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["details"]["reason"], "unavailable");
}

#[actix_web::test]
async fn borrow_book_reports_an_unreachable_store_as_503() {
    let mut command = MockLendingCommand::new();
    command.expect_borrow_book().times(1).return_once(|_| {
        Err(LendingError::StoreUnavailable {
            message: "connection refused".into(),
        })
    });
    let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/books/{BOOK_ID}/borrow"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = actix_test::read_body(response).await;
    let text = String::from_utf8_lossy(&body);
    assert!(!text.contains("connection refused"));
}

#[actix_web::test]
async fn borrow_book_rejects_malformed_ids_before_calling_the_port() {
    let app = actix_test::init_service(test_app(
        MockLendingCommand::new(),
        MockLendingQuery::new(),
    ))
    .await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/books/not-a-uuid/borrow")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "bookId");
}

#[actix_web::test]
async fn reserve_book_returns_the_queue_position() {
    let mut command = MockLendingCommand::new();
    command
        .expect_reserve_book()
        .withf(|request| request.user_id == member())
        .times(1)
        .return_once(|request| {
            Ok(ReserveBookResponse {
                reservation: Reservation::pending(
                    ReservationId::random(),
                    request.user_id,
                    request.book_id,
                    at(),
                ),
                position: QueuePosition::FIRST,
            })
        });
    let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/books/{BOOK_ID}/reservations"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["position"], 1);
    assert_eq!(body["status"], "pending");
}

#[actix_web::test]
async fn book_wait_list_reveals_only_the_callers_reservation() {
    let own_id = ReservationId::random();
    let other_id = ReservationId::random();
    let mut query = MockLendingQuery::new();
    query
        .expect_book_reservations()
        .times(1)
        .return_once(move |book_id| {
            Ok(vec![
                ReservationView {
                    reservation: Reservation::pending(other_id, UserId::random(), *book_id, at()),
                    position: QueuePosition::new(1),
                },
                ReservationView {
                    reservation: Reservation::pending(own_id, member(), *book_id, at()),
                    position: QueuePosition::new(2),
                },
            ])
        });
    let app = actix_test::init_service(test_app(MockLendingCommand::new(), query)).await;
    let cookie = login_and_get_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/books/{BOOK_ID}/reservations"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    let entries = body.as_array().expect("array");
    let positions: Vec<_> = entries
        .iter()
        .map(|entry| entry["position"].as_u64())
        .collect();
    assert_eq!(positions, vec![Some(1), Some(2)]);
    assert_eq!(entries[0]["own"], false);
    assert!(entries[0].get("reservationId").is_none());
    assert_eq!(entries[1]["own"], true);
    assert_eq!(entries[1]["reservationId"], own_id.to_string());
    assert!(!body.to_string().contains(&other_id.to_string()));
}

#[actix_web::test]
async fn book_endpoints_require_a_session() {
    let app = actix_test::init_service(test_app(
        MockLendingCommand::new(),
        MockLendingQuery::new(),
    ))
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/books/{BOOK_ID}/borrow"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
