//! scalesync-api: Shared HTTP wire types
//!
//! Contains the inbound webhook payloads and the response bodies served by the
//! listener, together with their OpenAPI schema definitions.

pub mod notifications;
pub mod responses;
