// Collaborator contracts
// Implemented by infrastructure adapters; the domain only sees these traits

pub mod ad_repository;
pub mod credits_provider;
pub mod generation_service;
pub mod session_repository;

pub use ad_repository::AdRepository;
pub use credits_provider::CreditsProvider;
pub use generation_service::GenerationService;
pub use session_repository::WizardSessionRepository;
