// Infrastructure layer module
// Adapters behind the domain collaborator traits: the hosted backend over
// HTTP, plus in-memory stand-ins for development and tests

pub mod baas;
pub mod memory;
pub mod repositories;
