//! # API Module
//!
//! Gateway operations behind the HTTP handlers. Each submodule covers one
//! concern and talks to the remote site only through the `services` traits.
//!
//! ## Modules
//!
//! - [`auth_gate`] - Bearer token verification against per-endpoint secrets
//! - [`automation`] - Waitlist email, record and label actions
//! - [`contact_phone`] - Concurrent batch phone updates
//! - [`contact_resolver`] - Contact lookup by id or unique email, phone updates
//! - [`guests`] - Event guests changed since a point in time

pub mod auth_gate;
pub mod automation;
pub mod contact_phone;
pub mod contact_resolver;
pub mod guests;
