// src/extractors/mod.rs
pub mod heading;
pub mod refine;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use heading::{HeadingCandidate, HeadingDetector};
pub use refine::{RefinedExcerpt, SubsectionRefiner, DEFAULT_TOP_K};
