// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Folio blog.
//!
//! Serves listings, posts, categories and reactions as JSON to the
//! client-rendered site. Text fields are resolved server-side for the
//! requested language.

pub mod error;
pub mod handlers;
pub mod server;
pub mod session;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, build_router, start_server};
pub use session::{HeaderSessionResolver, VISITOR_HEADER};
