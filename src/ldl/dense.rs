#![allow(non_snake_case)]

use super::*;

/// Unpivoted LDLᵀ factorization of a dense symmetric quasi-definite matrix.
///
/// Quasi-definiteness guarantees the factorization exists without
/// pivoting in exact arithmetic.  Near-zero pivots arising from roundoff
/// are clamped to the expected sign pattern supplied through
/// [`LdlSettings`](crate::ldl::LdlSettings).
///
/// Only the lower triangle of the source matrix is referenced.

#[derive(Debug)]
pub struct DenseLdlFactorization<T = f64> {
    n: usize,
    // unit lower triangular factor, strict lower part only
    L: Matrix<T>,
    // diagonal of D and its inverse
    D: Vec<T>,
    Dinv: Vec<T>,
    // per-column elimination workspace
    fwork: Vec<T>,
    dsigns: Vec<i8>,
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,
    // number of pivots clamped in the last factorization
    regularize_count: usize,
}

impl<T> DenseLdlFactorization<T>
where
    T: FloatT,
{
    pub fn new(n: usize, opts: LdlSettings<T>) -> Self {
        let dsigns = opts.dsigns.unwrap_or_else(|| vec![1_i8; n]);
        assert_eq!(dsigns.len(), n);

        Self {
            n,
            L: Matrix::zeros((n, n)),
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            fwork: vec![T::zero(); n],
            dsigns,
            regularize_enable: opts.regularize_enable,
            regularize_eps: opts.regularize_eps,
            regularize_delta: opts.regularize_delta,
            regularize_count: 0,
        }
    }

    pub fn regularize_count(&self) -> usize {
        self.regularize_count
    }

    /// Factor the matrix `A`, overwriting any previous factorization.
    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), LdlError> {
        if !A.is_square() || A.nrows() != self.n {
            return Err(LdlError::IncompatibleDimension);
        }
        let n = self.n;
        self.regularize_count = 0;

        // left-looking elimination, one column at a time
        for j in 0..n {
            let w = &mut self.fwork;
            w[j..n].copy_from(&A.col_slice(j)[j..n]);

            for p in 0..j {
                let ljp = self.L[(j, p)];
                if ljp == T::zero() {
                    continue;
                }
                let t = ljp * self.D[p];
                for i in j..n {
                    w[i] -= self.L[(i, p)] * t;
                }
            }

            let dj = regularize_pivot(
                w[j],
                self.dsigns[j],
                self.regularize_enable,
                self.regularize_eps,
                self.regularize_delta,
                &mut self.regularize_count,
            );
            if dj == T::zero() {
                return Err(LdlError::ZeroPivot);
            }
            self.D[j] = dj;
            self.Dinv[j] = T::recip(dj);

            for i in (j + 1)..n {
                self.L[(i, j)] = self.fwork[i] * self.Dinv[j];
            }
        }
        Ok(())
    }

    /// Solve `A x = b` in place using the current factors.
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.n);
        let n = self.n;

        // (L+I) x = b
        for j in 0..n {
            let xj = b[j];
            for i in (j + 1)..n {
                b[i] -= self.L[(i, j)] * xj;
            }
        }
        // D x = b
        for (bi, di) in std::iter::zip(b.iter_mut(), &self.Dinv) {
            *bi *= *di;
        }
        // (L+I)ᵀ x = b
        for j in (0..n).rev() {
            let mut s = T::zero();
            for i in (j + 1)..n {
                s += self.L[(i, j)] * b[i];
            }
            b[j] -= s;
        }
    }
}

#[test]
fn test_dense_ldl_quasidefinite() {
    // [ 4  1 | 1 ]
    // [ 1  3 | 2 ]
    // [ 1  2 |-2 ]
    let A = Matrix::new_from_slice(
        (3, 3),
        &[
            4., 1., 1., //
            1., 3., 2., //
            1., 2., -2.,
        ],
    );

    let opts = LdlSettingsBuilder::default()
        .dsigns(vec![1, 1, -1])
        .build()
        .unwrap();
    let mut ldl = DenseLdlFactorization::new(3, opts);
    ldl.factor(&A).unwrap();

    let mut x = vec![6., 6., 1.];
    ldl.solve(&mut x);

    // residual check against the full symmetric matrix
    let mut r = vec![6., 6., 1.];
    A.symv(&mut r, &x, -1.0, 1.0);
    assert!(r.norm_inf() < 1e-12);
}

#[test]
fn test_dense_ldl_regularized_pivot() {
    // zero (2,2) entry would be a zero pivot without regularization
    let A = Matrix::new_from_slice(
        (2, 2),
        &[
            1., 0., //
            0., 0.,
        ],
    );

    let opts = LdlSettingsBuilder::default()
        .dsigns(vec![1, -1])
        .build()
        .unwrap();
    let mut ldl = DenseLdlFactorization::new(2, opts);
    ldl.factor(&A).unwrap();
    assert_eq!(ldl.regularize_count(), 1);
}
