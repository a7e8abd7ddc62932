// Authentication module
// Bearer token verification for the wizard API

pub mod jwt;
