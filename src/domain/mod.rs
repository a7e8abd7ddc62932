// Domain layer module exports
// The wizard core: catalog, navigation, validation and prompt assembly.
// Independent of HTTP and of the backend-as-a-service.

pub mod ad;
pub mod catalog;
pub mod credits;
pub mod prompt;
pub mod repositories;
pub mod user;
pub mod wizard;
