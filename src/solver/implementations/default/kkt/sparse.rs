#![allow(non_snake_case)]

use super::*;
use crate::ldl::SparseLdlFactorization;

/// Sparse KKT backend: the saddle-point operator is assembled once in
/// upper triangular CSC form with every diagonal entry structurally
/// present.  The symbolic factorization is computed at the first
/// factor call and only numeric values change thereafter.
pub struct SparseKKTEngine<T: FloatT> {
    n: usize,
    m: usize,
    K: CscMatrix<T>,
    // position of each diagonal entry in K.nzval
    diag_full: Vec<usize>,
    // staging for the (3,3) diagonal values
    vals33: Vec<T>,
    // symbolic analysis is deferred to the first factorization
    ldl: Option<SparseLdlFactorization<T>>,
    opts: LdlSettings<T>,
}

impl<T: FloatT> HasKKTEngine<T> for CscMatrix<T> {
    type Engine = SparseKKTEngine<T>;

    fn new_engine(
        Q: &Self,
        A: &Self,
        G: &Self,
        diag11: &[T],
        diag22: &[T],
        opts: LdlSettings<T>,
    ) -> SparseKKTEngine<T> {
        let (m, n) = A.size();
        let k = G.nrows();

        let (mut K, diag_full) = assemble_kkt(Q, A, G);

        // static diagonal offsets for the (1,1) and (2,2) blocks.
        // Entries placed for a missing Q diagonal are structural
        // zeros, so adding is safe in either case.
        for (i, &v) in diag11.iter().enumerate() {
            K.nzval[diag_full[i]] += v;
        }
        for (i, &v) in diag22.iter().enumerate() {
            K.nzval[diag_full[n + i]] += v;
        }

        SparseKKTEngine {
            n,
            m,
            K,
            diag_full,
            vals33: vec![T::zero(); k],
            ldl: None,
            opts,
        }
    }
}

impl<T: FloatT> KKTEngine<T> for SparseKKTEngine<T> {
    fn refresh_scaling(&mut self, s: &[T], z: &[T], diag33_offset: &[T]) {
        let base = self.n + self.m;
        for (i, ((&si, &zi), &off)) in s.iter().zip(z).zip(diag33_offset).enumerate() {
            let v = -si / zi + off;
            self.vals33[i] = v;
            self.K.nzval[self.diag_full[base + i]] = v;
        }

        // the factorization keeps its own permuted copy of the values
        if let Some(ldl) = self.ldl.as_mut() {
            ldl.update_values(&self.diag_full[base..], &self.vals33);
        }
    }

    fn factor(&mut self) -> Result<(), LdlError> {
        let ldl = match &mut self.ldl {
            Some(ldl) => ldl,
            none => none.insert(SparseLdlFactorization::init_symbolic(
                &self.K,
                self.opts.clone(),
            )?),
        };
        ldl.factor()
    }

    fn solve_once(&mut self, x: &mut [T], b: &[T]) {
        let ldl = self
            .ldl
            .as_mut()
            .expect("solve called before factorization");
        x.copy_from(b);
        ldl.solve(x);
    }

    fn apply(&self, y: &mut [T], x: &[T]) {
        self.K.symv(y, x, T::one(), T::zero());
    }
}

// Assemble the upper triangular KKT structure
//
//   [ Q   Aᵀ   Gᵀ ]
//   [      0   0  ]
//   [           0 ]
//
// with Q supplied in lower-triangle canonical form and transposed into
// the upper triangle, and with all n+m+k diagonal entries structurally
// present.  Returns the matrix and the map of diagonal positions.
// Rows within each column are sorted and the diagonal entry is always
// last, which the returned map relies on.
fn assemble_kkt<T: FloatT>(
    Q: &CscMatrix<T>,
    A: &CscMatrix<T>,
    G: &CscMatrix<T>,
) -> (CscMatrix<T>, Vec<usize>) {
    let (m, n) = A.size();
    let k = G.nrows();
    let dim = n + m + k;

    let nnz = Q.nnz() + (n - Q.count_diagonal_entries_tril()) + A.nnz() + G.nnz() + m + k;
    let mut K = CscMatrix::<T>::spalloc((dim, dim), nnz);

    // count entries per column
    K.colptr.fill(0);
    K.colcount_block_t(Q, 0);
    K.colcount_missing_diag_tril(Q, 0);
    K.colcount_block_t(A, n);
    K.colcount_block_t(G, n + m);
    K.colcount_diag(n, m);
    K.colcount_diag(n + m, k);
    K.colcount_to_colptr();

    // fill, in the same order per column
    K.fill_block_t(Q, 0, 0);
    K.fill_missing_diag_tril(Q, 0);
    K.fill_block_t(A, 0, n);
    K.fill_block_t(G, 0, n + m);
    K.fill_diag(n, m);
    K.fill_diag(n + m, k);
    K.backshift_colptrs();

    // the matrix is triu with the diagonal last in each column
    let mut diag_full = vec![0; dim];
    for (i, d) in diag_full.iter_mut().enumerate() {
        *d = K.colptr[i + 1] - 1;
    }

    (K, diag_full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_kkt_structure() {
        // Q = [2 1; 1 3] (tril), A = [1 1], G = -I
        let Q = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![2., 1., 3.]);
        let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
        let G = CscMatrix::new(
            2,
            2,
            vec![0, 1, 2],
            vec![0, 1],
            vec![-1., -1.],
        );

        let (K, diag) = assemble_kkt(&Q, &A, &G);
        assert!(K.check_format().is_ok());
        assert!(K.is_triu());
        assert_eq!(K.size(), (5, 5));

        // diagonal positions index the expected values
        assert_eq!(K.nzval[diag[0]], 2.);
        assert_eq!(K.nzval[diag[1]], 3.);
        assert_eq!(K.nzval[diag[2]], 0.);
        assert_eq!(K.nzval[diag[3]], 0.);
        assert_eq!(K.nzval[diag[4]], 0.);

        // the full symmetric operator matches the dense assembly
        let x = vec![1., 2., 3., 4., 5.];
        let mut y = vec![0.; 5];
        K.symv(&mut y, &x, 1.0, 0.0);

        let Kd = Matrix::new_from_slice(
            (5, 5),
            &[
                2., 1., 1., -1., 0., //
                1., 3., 1., 0., -1., //
                1., 1., 0., 0., 0., //
                -1., 0., 0., 0., 0., //
                0., -1., 0., 0., 0.,
            ],
        );
        let mut yd = vec![0.; 5];
        Kd.gemv(&mut yd, MatrixShape::N, &x, 1.0, 0.0);
        assert_eq!(y, yd);
    }

    #[test]
    fn test_assemble_kkt_missing_diag() {
        // zero Q with empty columns still yields a full structural diagonal
        let Q = CscMatrix::<f64>::zeros((2, 2));
        let A = CscMatrix::<f64>::zeros((0, 2));
        let G = CscMatrix::identity(2);

        let (K, diag) = assemble_kkt(&Q, &A, &G);
        assert!(K.check_format().is_ok());
        assert_eq!(K.size(), (4, 4));
        assert_eq!(diag, vec![0, 1, 3, 5]);
        assert_eq!(K.nnz(), 6);
    }
}
