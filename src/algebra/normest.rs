// Power-iteration estimates of matrix 2-norms.
//
// The iteration starts from a deterministic vector so that repeated
// runs on identical data produce identical scalars.

use super::*;

pub(crate) fn norm_two_estimate<T, M>(A: &M, iters: usize) -> T
where
    T: FloatT,
    M: MatrixVectorMultiply<T> + ShapedMatrix,
{
    let (m, n) = A.size();
    if m == 0 || n == 0 {
        return T::zero();
    }

    let mut v = vec![T::one(); n];
    let mut w = vec![T::zero(); m];
    v.scale(T::recip(T::sqrt(T::from_usize(n).unwrap())));

    // v converges to the dominant eigenvector of AᵀA, with the
    // normalization constant converging to its eigenvalue
    let mut λ = T::zero();
    for _ in 0..iters {
        A.gemv(&mut w, MatrixShape::N, &v, T::one(), T::zero());
        A.gemv(&mut v, MatrixShape::T, &w, T::one(), T::zero());
        λ = v.norm();
        if λ == T::zero() {
            break;
        }
        v.scale(T::recip(λ));
    }
    T::sqrt(λ)
}

pub(crate) fn sym_norm_two_estimate<T, M>(A: &M, iters: usize) -> T
where
    T: FloatT,
    M: SymMatrixVectorMultiply<T> + ShapedMatrix,
{
    let n = A.ncols();
    if n == 0 {
        return T::zero();
    }

    let mut v = vec![T::one(); n];
    let mut w = vec![T::zero(); n];
    v.scale(T::recip(T::sqrt(T::from_usize(n).unwrap())));

    let mut λ = T::zero();
    for _ in 0..iters {
        A.symv(&mut w, &v, T::one(), T::zero());
        λ = w.norm();
        if λ == T::zero() {
            break;
        }
        v.scalarop_from(|x| x / λ, &w);
    }
    λ
}

#[test]
fn test_norm_estimates() {
    use crate::algebra::Matrix;

    // diagonal matrix: the 2-norm is the largest diagonal entry
    let mut A = Matrix::<f64>::zeros((3, 3));
    A[(0, 0)] = 2.0;
    A[(1, 1)] = -5.0;
    A[(2, 2)] = 1.0;

    let est = norm_two_estimate(&A, 30);
    assert!((est - 5.0).abs() < 1e-6);

    let est = sym_norm_two_estimate(&A, 30);
    assert!((est - 5.0).abs() < 1e-6);
}
