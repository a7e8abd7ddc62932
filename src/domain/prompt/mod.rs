// Prompt assembly module
// Combines a template's paragraph with the reference image and free-text passes

pub mod assembler;
pub mod reference;

pub use assembler::assemble;
pub use reference::ReferenceIntent;
