//! Inbound adapters that translate external requests into lending port
//! calls while keeping framework details at the edge.

pub mod http;
