//! HTTP and websocket surface for the ringside scoring core

pub mod http;

pub use http::{create_router, AppState};
