// HTTP handlers
// Thin adapters: load the session, call the domain, save, respond

pub mod catalog;
pub mod wizard;
