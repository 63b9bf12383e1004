//! Core components for the interior-point solver.
//!
//! The generic [`Solver`](crate::solver::core::solver::Solver) runs the
//! predictor-corrector loop against the component traits defined in
//! [`traits`](crate::solver::core::traits).  A complete set of concrete
//! components for affine conic form problems is provided in
//! [`implementations::default`](crate::solver::implementations::default).

pub mod error;
pub mod solver;
pub mod traits;

pub use error::*;
pub use solver::*;

/// Type alias for the settings record consumed by the core solver.
//NB: CoreSettings is typedef'd to DefaultSettings
pub type CoreSettings<T> = crate::solver::implementations::default::DefaultSettings<T>;
