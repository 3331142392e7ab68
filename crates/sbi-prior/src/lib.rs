//! Prior distributions over parameter vectors.
//!
//! Concrete implementations of the [`sbi_core::Distribution`] contract plus a
//! serde-tagged [`PriorSpec`] used by configuration files to describe a prior
//! without naming a concrete type.

mod box_uniform;
mod normal;
mod spec;

pub use box_uniform::BoxUniform;
pub use normal::DiagNormal;
pub use spec::PriorSpec;
