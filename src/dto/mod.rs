//! Request and response types for the HTTP surface.
//!
//! Wire names are camelCase throughout, matching the original public API of
//! the service.

/// Auth and user-account payloads.
pub mod auth;
/// Player-facing payloads.
pub mod player;
/// Quiz and question management payloads.
pub mod quiz;
/// Session lifecycle and results payloads.
pub mod session;

use serde::Serialize;
use utoipa::ToSchema;

/// Empty JSON object returned by operations with nothing to report.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}
