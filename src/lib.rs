//! Terminal client for a customer and billing REST API.
//!
//! [`api`] talks HTTP, [`sync`] keeps per-view collections in step with the
//! server, and [`ui`] draws the three views with `tui`.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod ui;

#[cfg(test)]
mod test_utils;
