//! Entity models and DTOs.
//!
//! `FromRow` structs mirror table rows one-to-one; `Create*`/`Update*`
//! structs are the deserializable inputs handlers accept.

pub mod activity;
pub mod comment;
pub mod issue;
pub mod label;
pub mod notification;
pub mod project;
pub mod team;
pub mod user;
pub mod workspace;
