// In-memory collaborators
// Used when no hosted backend is configured, and by the test suites

pub mod ads;
pub mod credits;
pub mod generation;

pub use ads::InMemoryAdRepository;
pub use credits::InMemoryCreditsLedger;
pub use generation::InMemoryGenerationService;
