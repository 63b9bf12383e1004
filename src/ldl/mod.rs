//! LDLᵀ factorization of symmetric quasi-definite matrices.
//!
//! Two factorization engines are provided: a dense unpivoted
//! factorization ([`DenseLdlFactorization`]) and a sparse factorization
//! with AMD fill-reducing ordering and a persistent symbolic analysis
//! ([`SparseLdlFactorization`]).  Both clamp pivots against an expected
//! sign pattern, so that the (+,-,-) block structure of the KKT system
//! survives roundoff.

use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

mod dense;
mod sparse;

pub use dense::*;
pub use sparse::*;

/// Error codes returnable from factor operations.
#[derive(Error, Debug)]
pub enum LdlError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Fill reducing ordering failed")]
    OrderingFailure,
}

/// Settings for the LDLᵀ factorization engines.
#[derive(Builder, Debug, Clone)]
pub struct LdlSettings<T: FloatT> {
    /// expected signs of the diagonal D, one per matrix row
    #[builder(default = "None", setter(strip_option))]
    pub dsigns: Option<Vec<i8>>,

    /// enable dynamic regularization of near-zero pivots
    #[builder(default = "true")]
    pub regularize_enable: bool,

    /// pivot magnitude below which regularization is applied
    #[builder(default = "(1e-12).as_T()")]
    pub regularize_eps: T,

    /// replacement magnitude for regularized pivots
    #[builder(default = "(1e-7).as_T()")]
    pub regularize_delta: T,

    /// scaling of the AMD dense-row threshold.  KKT systems from QPs
    /// order better with a threshold above the AMD default.
    #[builder(default = "1.5")]
    pub amd_dense_scale: f64,
}

impl<T> Default for LdlSettings<T>
where
    T: FloatT,
{
    fn default() -> LdlSettings<T> {
        LdlSettingsBuilder::<T>::default().build().unwrap()
    }
}

// shared pivot clamp for both engines
#[inline]
pub(crate) fn regularize_pivot<T: FloatT>(
    d: T,
    sign: i8,
    enable: bool,
    eps: T,
    delta: T,
    count: &mut usize,
) -> T {
    if !enable {
        return d;
    }
    let sign = T::from_i8(sign).unwrap();
    if d * sign < eps {
        *count += 1;
        delta * sign
    } else {
        d
    }
}
