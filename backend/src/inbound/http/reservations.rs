//! Reservation HTTP handlers.
//!
//! ```text
//! GET    /api/v1/reservations
//! DELETE /api/v1/reservations/{reservation_id}
//! ```

use actix_web::{delete, get, web};

use crate::domain::ports::CancelReservationRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_lending_error;
use crate::inbound::http::lending_dto::{CancelReservationBody, ReservationBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_reservation_id;

/// The caller's open reservations with their queue positions.
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    responses(
        (status = 200, description = "Open reservations", body = [ReservationBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "listReservations",
    security(("SessionCookie" = []))
)]
#[get("/reservations")]
pub async fn list_reservations(
    state: web::Data<HttpState>,
    session: MemberSession,
) -> ApiResult<web::Json<Vec<ReservationBody>>> {
    let user_id = session.require_member()?;
    let views = state
        .lending_query
        .reservations(&user_id)
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(views.into_iter().map(ReservationBody::from).collect()))
}

/// Cancel a reservation and leave the wait list.
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{reservation_id}",
    params((
        "reservation_id" = String,
        Path,
        format = "uuid",
        description = "Reservation identifier"
    )),
    responses(
        (status = 200, description = "Reservation cancelled", body = CancelReservationBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Reservation belongs to another member", body = ErrorSchema),
        (status = 404, description = "Unknown reservation", body = ErrorSchema),
        (status = 409, description = "Reservation already closed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reservations"],
    operation_id = "cancelReservation",
    security(("SessionCookie" = []))
)]
#[delete("/reservations/{reservation_id}")]
pub async fn cancel_reservation(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<CancelReservationBody>> {
    let user_id = session.require_member()?;
    let reservation_id = parse_reservation_id(&path.into_inner())?;
    let response = state
        .lending
        .cancel_reservation(CancelReservationRequest {
            reservation_id,
            user_id,
        })
        .await
        .map_err(map_lending_error)?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        CancelReservationResponse, FIXTURE_USER_ID, MockLendingCommand, MockLendingQuery,
        ReservationView,
    };
    use crate::domain::{
        BookId, LendingError, QueuePosition, Reservation, ReservationId, ReservationStatus, UserId,
    };
    use crate::inbound::http::test_utils::{
        http_state, login_and_get_cookie, test_session_middleware,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    const RESERVATION_ID: &str = "00000000-0000-0000-0000-0000000000e1";

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
                    .service(list_reservations)
                    .service(cancel_reservation),
            )
    }

    fn reservation(id: ReservationId, status: ReservationStatus) -> Reservation {
        let reserved_at = Utc
            .with_ymd_and_hms(2026, 4, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        Reservation::restore(
            id,
            UserId::new(FIXTURE_USER_ID).expect("fixture user id"),
            BookId::random(),
            reserved_at,
            status,
        )
    }

    #[actix_web::test]
    async fn list_reservations_includes_positions_only_for_queued_entries() {
        let mut query = MockLendingQuery::new();
        query.expect_reservations().times(1).return_once(|_| {
            Ok(vec![
                ReservationView {
                    reservation: reservation(ReservationId::random(), ReservationStatus::Available),
                    position: None,
                },
                ReservationView {
                    reservation: reservation(ReservationId::random(), ReservationStatus::Pending),
                    position: QueuePosition::new(3),
                },
            ])
        });
        let app = actix_test::init_service(test_app(MockLendingCommand::new(), query)).await;
        let cookie = login_and_get_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/reservations")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body[0]["status"], "available");
        assert!(body[0]["position"].is_null());
        assert_eq!(body[1]["position"], 3);
    }

    #[actix_web::test]
    async fn cancel_reservation_reports_the_hand_over() {
        let mut command = MockLendingCommand::new();
        command
            .expect_cancel_reservation()
            .withf(|request| request.reservation_id.to_string() == RESERVATION_ID)
            .times(1)
            .return_once(|request| {
                Ok(CancelReservationResponse {
                    reservation: reservation(request.reservation_id, ReservationStatus::Cancelled),
                    held_for: Some(UserId::random()),
                })
            });
        let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
        let cookie = login_and_get_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/reservations/{RESERVATION_ID}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["reservation"]["status"], "cancelled");
        assert_eq!(body["handedOver"], true);
    }

    #[actix_web::test]
    async fn cancelling_a_closed_reservation_is_a_conflict() {
        let mut command = MockLendingCommand::new();
        command
            .expect_cancel_reservation()
            .times(1)
            .return_once(|_| Err(LendingError::ReservationClosed));
        let app = actix_test::init_service(test_app(command, MockLendingQuery::new())).await;
        let cookie = login_and_get_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/reservations/{RESERVATION_ID}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["reason"], "reservation_closed");
    }
}
