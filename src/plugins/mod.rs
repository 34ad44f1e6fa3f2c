//! # Plugins Module
//!
//! Concrete plugins are out of this crate's scope beyond demonstrating the
//! [`crate::pipeline::Plugin`] protocol and the
//! [`crate::compiler::PluginRegistry`] composite-registration pattern (see
//! `SPEC_FULL.md` Non-goals). The two examples here exist for that purpose
//! only; real deployments should bring their own.

pub mod auth;
pub mod csrf;

pub use auth::BearerAuth;
pub use csrf::{CsrfGenerator, CsrfProtection};
