//! Quadrant: an interior-point solver for convex quadratic programs
//! in affine conic form.
//!
//! The solver computes solutions to the primal-dual pair
//!
//! ```text
//! minimize   (1/2) xᵀQx + cᵀx       maximize   (1/2)(Aᵀy + Gᵀz + c)ᵀ Q⁺ (Aᵀy + Gᵀz + c)
//! subject to A x = b                           - bᵀy - hᵀz
//!            G x + s = h             subject to Aᵀy + Gᵀz + c ∈ range(Q)
//!            s ≥ 0                              z ≥ 0
//! ```
//!
//! with Q symmetric positive semidefinite, using a Mehrotra
//! predictor-corrector method over a regularized symmetric
//! quasi-definite KKT system.
//!
//! Problem data can be supplied either as dense column-major matrices
//! ([`DenseSolver`](crate::solver::DenseSolver)) or in compressed sparse
//! column format ([`SparseSolver`](crate::solver::SparseSolver)).  The two
//! entry points share a single storage-parametric solver core and differ
//! only in their KKT assembly and factorization backends.

//Rust hates greek characters
#![allow(confusable_idents)]
#![allow(uncommon_codepoints)]

pub mod algebra;
pub mod ldl;
pub mod solver;
