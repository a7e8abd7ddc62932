// Hosted backend adapters
// REST and edge-function calls made on behalf of the signed-in user

pub mod ads;
pub mod client;
pub mod credits;
pub mod generation;

pub use ads::HttpAdRepository;
pub use client::BaasClient;
pub use credits::HttpCreditsProvider;
pub use generation::HttpGenerationService;
