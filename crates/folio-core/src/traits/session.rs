// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Acting-user resolution.

use crate::types::Session;

/// Resolves the acting user from some request context.
///
/// The core never reads ambient state; adapters turn whatever they carry
/// (headers, cookies, tokens) into an explicit [`Session`].
pub trait SessionResolver<Ctx: ?Sized>: Send + Sync {
    fn resolve_session(&self, ctx: &Ctx) -> Session;
}
