//! Query synthesis and static validation.

pub mod synth;
pub mod validate;

pub use synth::{synthesize, SynthesizedQuery};
pub use validate::{validate, ValidationReport};
