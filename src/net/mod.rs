//! Networking modules for the remote auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the HTTP calls and persists the resulting session, `types`
//! defines the wire schema and the error taxonomy surfaced to the session.

pub mod api;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
