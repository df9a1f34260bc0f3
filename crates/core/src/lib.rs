//! Kite domain vocabulary.
//!
//! Zero-internal-dependency building blocks shared by the database,
//! realtime, and API layers:
//!
//! - [`types`] — id and timestamp aliases.
//! - [`error`] — the domain error type ([`error::CoreError`]).
//! - [`rooms`] — typed broadcast room identifiers and their wire format.
//! - [`activity`] — activity log action-kind constants.
//! - [`notifications`] — notification kind constants.

pub mod activity;
pub mod error;
pub mod notifications;
pub mod rooms;
pub mod types;
