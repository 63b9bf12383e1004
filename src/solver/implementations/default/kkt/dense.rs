#![allow(non_snake_case)]

use super::*;
use crate::ldl::DenseLdlFactorization;

/// Dense KKT backend: the saddle-point operator is assembled as a full
/// symmetric column-major matrix and factored with the unpivoted
/// quasi-definite LDLᵀ.
pub struct DenseKKTEngine<T> {
    n: usize,
    m: usize,
    K: Matrix<T>,
    ldl: DenseLdlFactorization<T>,
}

impl<T: FloatT> HasKKTEngine<T> for Matrix<T> {
    type Engine = DenseKKTEngine<T>;

    fn new_engine(
        Q: &Self,
        A: &Self,
        G: &Self,
        diag11: &[T],
        diag22: &[T],
        opts: LdlSettings<T>,
    ) -> DenseKKTEngine<T> {
        let (m, n) = A.size();
        let k = G.nrows();
        let dim = n + m + k;

        let mut K = Matrix::<T>::zeros((dim, dim));

        // (1,1): Q, lower-triangle canonical, mirrored to full storage
        for col in 0..n {
            for row in col..n {
                let v = Q[(row, col)];
                K[(row, col)] = v;
                if row != col {
                    K[(col, row)] = v;
                }
            }
        }
        for (i, &v) in diag11.iter().enumerate() {
            K[(i, i)] += v;
        }

        // (2,1) and its transpose: A
        for col in 0..n {
            for row in 0..m {
                let v = A[(row, col)];
                K[(n + row, col)] = v;
                K[(col, n + row)] = v;
            }
        }
        for (i, &v) in diag22.iter().enumerate() {
            K[(n + i, n + i)] = v;
        }

        // (3,1) and its transpose: G.  The (3,3) diagonal is written
        // by refresh_scaling each iteration.
        for col in 0..n {
            for row in 0..k {
                let v = G[(row, col)];
                K[(n + m + row, col)] = v;
                K[(col, n + m + row)] = v;
            }
        }

        let ldl = DenseLdlFactorization::new(dim, opts);

        DenseKKTEngine { n, m, K, ldl }
    }
}

impl<T: FloatT> KKTEngine<T> for DenseKKTEngine<T> {
    fn refresh_scaling(&mut self, s: &[T], z: &[T], diag33_offset: &[T]) {
        let base = self.n + self.m;
        for (i, ((&si, &zi), &off)) in s.iter().zip(z).zip(diag33_offset).enumerate() {
            self.K[(base + i, base + i)] = -si / zi + off;
        }
    }

    fn factor(&mut self) -> Result<(), LdlError> {
        self.ldl.factor(&self.K)
    }

    fn solve_once(&mut self, x: &mut [T], b: &[T]) {
        x.copy_from(b);
        self.ldl.solve(x);
    }

    fn apply(&self, y: &mut [T], x: &[T]) {
        self.K.gemv(y, MatrixShape::N, x, T::one(), T::zero());
    }
}

#[test]
fn test_dense_kkt_engine_solves() {
    // tiny system: n = 1, m = 1, k = 1 with Q = 2, A = 1, G = -1
    let Q = Matrix::new_from_slice((1, 1), &[2.]);
    let A = Matrix::new_from_slice((1, 1), &[1.]);
    let G = Matrix::new_from_slice((1, 1), &[-1.]);

    let opts = crate::ldl::LdlSettingsBuilder::default()
        .dsigns(vec![1, -1, -1])
        .build()
        .unwrap();
    let mut engine = Matrix::new_engine(&Q, &A, &G, &[0.], &[-1e-8], opts);
    engine.refresh_scaling(&[1.], &[1.], &[-1e-8]);
    engine.factor().unwrap();

    let b = vec![1., 2., 3.];
    let mut x = vec![0.; 3];
    let mut work = RefineWork::new(3);
    let ok = engine.solve_refined(&mut x, &b, None, &mut work, &SolveControl::default());
    assert!(ok);

    // residual against the assembled operator
    let mut r = b.clone();
    engine.apply(&mut r, &x);
    r.axpby(1.0, &b, -1.0);
    assert!(r.norm() < 1e-10);
}
