pub mod engine;
pub mod flags;

pub use engine::{apply, clear, PatchReport};
pub use flags::OwnedFlags;
