//! Stencil Core
//!
//! Resolves resource addresses to their provider, looks up the provider's
//! schema, and writes configuration templates from it.

pub mod addrs;
pub mod diagnostics;
pub mod scaffold;
pub mod schema;
