//! Outbound adapters: lending stores, the catalogue seed loader, and the
//! member accounts file.

pub mod catalog_file;
pub mod member_accounts;
pub mod memory;
pub mod persistence;
