//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every lending endpoint, the health checks, the
//! response bodies, and the shared error envelope ([`ErrorSchema`] and its
//! parts) so domain types stay free of utoipa derives. The
//! document backs Swagger UI in debug builds and the `openapi-dump` binary.

use crate::inbound::http::lending_dto::{
    BookBody, BorrowBody, CancelReservationBody, HistoryEntryBody, NotificationBody,
    QueueEntryBody, ReservationBody, ReturnBody,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorDetailsSchema, ErrorSchema, LendingReasonSchema,
};
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the lending API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Library lending API",
        description = "Borrow, return, extend, and reserve books; read loans, history, and notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::borrow_book,
        crate::inbound::http::books::reserve_book,
        crate::inbound::http::books::list_book_reservations,
        crate::inbound::http::borrows::list_borrows,
        crate::inbound::http::borrows::return_book,
        crate::inbound::http::borrows::extend_borrow,
        crate::inbound::http::borrows::borrow_history,
        crate::inbound::http::reservations::list_reservations,
        crate::inbound::http::reservations::cancel_reservation,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::dismiss_notification,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ErrorDetailsSchema,
        LendingReasonSchema,
        LoginRequest,
        BookBody,
        BorrowBody,
        HistoryEntryBody,
        ReturnBody,
        ReservationBody,
        QueueEntryBody,
        CancelReservationBody,
        NotificationBody,
    )),
    tags(
        (name = "users", description = "Session login and logout"),
        (name = "books", description = "Catalogue lookups, borrowing, and reservations"),
        (name = "borrows", description = "Active loans and borrow history"),
        (name = "reservations", description = "The member's wait-list entries"),
        (name = "notifications", description = "The member's notification inbox"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "details");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/v1/books/{book_id}/borrow")]
    #[case("/api/v1/borrows/{borrow_id}/extend")]
    #[case("/api/v1/history")]
    #[case("/api/v1/reservations/{reservation_id}")]
    #[case("/api/v1/notifications/{notification_id}")]
    fn lending_paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
