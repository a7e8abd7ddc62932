// User module
// Identity of the caller driving a wizard session

pub mod value_objects;

pub use value_objects::UserContext;
