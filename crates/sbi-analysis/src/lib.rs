#![deny(missing_docs)]

//! Posterior analysis utilities: conditional density grids, correlation
//! matrices and pairwise-marginal plots.

/// Conditional density evaluation on grids.
pub mod conditional;
/// Histogram pairplot grids and SVG rendering.
pub mod pairplot;

pub use conditional::{
    conditional_corrcoeff, eval_conditional_1d, eval_conditional_2d, ConditionedDensity,
    GridOptions,
};
pub use pairplot::{pairplot, render_svg, svg_document, PairplotConfig, PairplotGrid};
