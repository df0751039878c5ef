pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for the CLIs
pub use analyze::{analyze, EdgeKind, EdgeOut, Report};
pub use model::{load_image, load_source};
