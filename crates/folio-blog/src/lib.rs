// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blog subsystem for Folio.
//!
//! - [`engine`]: listing assembly over an interchangeable [`source::ContentSource`].
//! - [`state`]: search/category/page state mirrored into the URL.
//! - [`reactions`]: race-tolerant reaction toggling and read aggregation.
//!
//! Every store call made here is bounded by the configured request timeout.

mod deadline;
pub mod engine;
pub mod reactions;
pub mod source;
pub mod state;

pub use engine::{BlogQueryEngine, Listing};
pub use reactions::{ReactionClient, ReactionSummary, parse_kind};
pub use source::{ContentSource, MemorySource, RemoteSource, source_for};
pub use state::{BlogStateController, Location, MemoryLocation, QueryState};
