//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod comment;
pub mod issue;
pub mod label;
pub mod notification;
pub mod project;
pub mod team;
pub mod workspace;
