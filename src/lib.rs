//! Admuse API Library
//!
//! Guided ad-creation wizard: a static template catalog, the per-user wizard
//! state machine, prompt assembly, credit gating, and the HTTP adapters that
//! expose them.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
