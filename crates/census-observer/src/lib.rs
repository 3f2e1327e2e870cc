//! Read-only HTTP export API over the census time series store.
//!
//! This crate is the chart/export boundary: a small Axum server that
//! serves the aligned time axis and metric series to dashboards. It never
//! touches the live store sequences -- every request reads a point-in-time
//! snapshot through [`SharedStore`](census_store::SharedStore), so the
//! single ingestion writer is never blocked or torn by a reader.
//!
//! # Modules
//!
//! - [`state`] -- shared application state (store handle + run metadata).
//! - [`handlers`] -- REST endpoint handlers.
//! - [`router`] -- route table and middleware assembly.
//! - [`server`] -- TCP bind and serve lifecycle.
//! - [`error`] -- API error responses.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
