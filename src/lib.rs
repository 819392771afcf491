//! Classroom client for Gitea-backed assignments.
//!
//! The interesting part is [`review`]: the client side of the review-request
//! lifecycle, with its cancel-window countdown reconciled against the
//! backend. Everything else is glue around it.

pub mod api;
pub mod config;
pub mod review;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
