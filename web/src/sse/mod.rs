//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the subscribe endpoint.
//! The broker and the event stream it drives live in the `sse` crate.

pub mod handler;
