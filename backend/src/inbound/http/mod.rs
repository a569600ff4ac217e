//! HTTP inbound adapter exposing the lending REST endpoints.

pub mod books;
pub mod borrows;
pub mod error;
pub mod health;
pub mod lending_dto;
pub mod notifications;
pub mod reservations;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
