#![allow(non_snake_case)]

use super::*;
use std::iter::zip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format.
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use quadrant::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 // colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        // rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], // nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
/// ```

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointers, length `n + 1`
    pub colptr: Vec<usize>,
    /// row indices
    pub rowval: Vec<usize>,
    /// nonzero values
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  Responsibility for in-bounds, sorted row indices within
    /// each column is left with the caller; see [`check_format`](CscMatrix::check_format).
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// Allocate space for an `m` x `n` matrix with `nnz` structural entries.
    pub fn spalloc(size: (usize, usize), nnz: usize) -> Self {
        let (m, n) = size;
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// A matrix of zeros of the given size.
    pub fn zeros(size: (usize, usize)) -> Self {
        Self::spalloc(size, 0)
    }

    /// number of structural nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowval);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// True if the matrix has no structural entries above the diagonal.
    pub fn is_tril(&self) -> bool {
        for col in 0..self.n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            if rows.iter().any(|&row| row < col) {
                return false;
            }
        }
        true
    }

    /// True if the matrix has no structural entries below the diagonal.
    pub fn is_triu(&self) -> bool {
        for col in 0..self.n {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            if rows.iter().any(|&row| row > col) {
                return false;
            }
        }
        true
    }

    /// A new matrix containing only entries from the lower triangular part.
    pub fn to_tril(&self) -> Self {
        assert!(self.is_square());
        let n = self.n;

        let nnz = self.rowval_col_pairs().filter(|&(row, col)| row >= col).count();
        let mut out = CscMatrix::spalloc((n, n), nnz);

        let mut ptr = 0;
        for col in 0..n {
            out.colptr[col] = ptr;
            for idx in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[idx];
                if row >= col {
                    out.rowval[ptr] = row;
                    out.nzval[ptr] = self.nzval[idx];
                    ptr += 1;
                }
            }
        }
        out.colptr[n] = ptr;
        out
    }

    fn rowval_col_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n).flat_map(move |col| {
            self.rowval[self.colptr[col]..self.colptr[col + 1]]
                .iter()
                .map(move |&row| (row, col))
        })
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

impl<T: FloatT> MatrixVectorMultiply<T> for CscMatrix<T> {
    fn gemv(&self, y: &mut [T], op: MatrixShape, x: &[T], a: T, b: T) {
        match op {
            MatrixShape::N => _csc_axpby_N(self, y, x, a, b),
            MatrixShape::T => _csc_axpby_T(self, y, x, a, b),
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply<T> for CscMatrix<T> {
    // source data should hold a single triangle of the symmetric matrix
    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert!(self.is_square());
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        y.scale(b);

        for (col, &xcol) in x.iter().enumerate() {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            let rows = &self.rowval[first..last];
            let nzvals = &self.nzval[first..last];

            for (&row, &Aij) in zip(rows, nzvals) {
                y[row] += a * Aij * xcol;

                if row != col {
                    //don't double up on the diagonal
                    y[col] += a * Aij * x[row];
                }
            }
        }
    }
}

impl<T: FloatT> MatrixMath<T> for CscMatrix<T> {
    fn col_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_no_reset(norms);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        for (i, v) in norms.iter_mut().enumerate() {
            *v = self
                .nzval
                .iter()
                .take(self.colptr[i + 1])
                .skip(self.colptr[i])
                .fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    fn col_norms_sym_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        for i in 0..norms.len() {
            for j in self.colptr[i]..self.colptr[i + 1] {
                let tmp = T::abs(self.nzval[j]);
                let r = self.rowval[j];
                norms[i] = T::max(norms[i], tmp);
                norms[r] = T::max(norms[r], tmp);
            }
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.fill(T::zero());
        for (row, val) in zip(&self.rowval, &self.nzval) {
            norms[*row] = T::max(norms[*row], T::abs(*val));
        }
    }
}

impl<T: FloatT> MatrixMathMut<T> for CscMatrix<T> {
    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn lscale(&mut self, l: &[T]) {
        for (val, row) in zip(&mut self.nzval, &self.rowval) {
            *val *= l[*row];
        }
    }

    fn rscale(&mut self, r: &[T]) {
        for i in 0..self.n {
            let rng = self.colptr[i]..self.colptr[i + 1];
            self.nzval[rng].scale(r[i]);
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);

        for (col, &ri) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];

            for (val, row) in zip(vals, rows) {
                *val *= l[*row] * ri;
            }
        }
    }
}

impl<T: FloatT> NormEstimate<T> for CscMatrix<T> {
    fn norm_two_est(&self, iters: usize) -> T {
        norm_two_estimate(self, iters)
    }
    fn sym_norm_two_est(&self, iters: usize) -> T {
        sym_norm_two_estimate(self, iters)
    }
}

impl<T: FloatT> ProblemMatrix<T> for CscMatrix<T> {
    fn sym_canonical(&self) -> Self {
        assert!(self.is_square());
        if self.is_tril() {
            self.clone()
        } else {
            self.to_tril()
        }
    }
}

// sparse matrix-vector multiply, no transpose
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);
    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());

    y.scale(b);
    if a == T::zero() {
        return;
    }

    for (j, xj) in x.iter().enumerate() {
        let axj = a * *xj;
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += A.nzval[i] * axj;
        }
    }
}

// sparse matrix-vector multiply, transposed
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);
    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());

    y.scale(b);
    if a == T::zero() {
        return;
    }

    for (j, yj) in y.iter_mut().enumerate() {
        let mut acc = T::zero();
        for k in A.colptr[j]..A.colptr[j + 1] {
            acc += A.nzval[k] * x[A.rowval[k]];
        }
        *yj += a * acc;
    }
}

//---------------------------------------------------------
// low-level utilities for counting / filling entries in
// block partitioned sparse matrices.   Used when assembling
// the KKT system from its (1,1), (2,1) and (3,1) blocks.
//---------------------------------------------------------

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // increment self.colptr by the number of nonzeros
    // in a square diagonal matrix placed on the diagonal
    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        let cols = self.colptr[initcol..(initcol + blockcols)].iter_mut();
        cols.for_each(|x| *x += 1);
    }

    // same as colcount_diag, but counts only places where the tril
    // input matrix M has a missing diagonal entry
    pub(crate) fn colcount_missing_diag_tril(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            if M.colptr[i] == M.colptr[i + 1] ||    // completely empty column
               M.rowval[M.colptr[i]] != i
            // first element is not on the diagonal
            {
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // increment the self.colptr by the number of nonzeros in M,
    // with M treated as transposed into the block whose columns
    // start at initcol
    pub(crate) fn colcount_block_t(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for row in M.rowval.iter() {
            self.colptr[initcol + row] += 1;
        }
    }

    // populate values of the transposed block from M using self.colptr
    // as the next-free-slot indicator in each column
    pub(crate) fn fill_block_t(&mut self, M: &CscMatrix<T>, initrow: usize, initcol: usize) {
        for i in 0..M.n {
            for idx in M.colptr[i]..M.colptr[i + 1] {
                let col = M.rowval[idx] + initcol;
                let row = i + initrow;

                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = M.nzval[idx];
                self.colptr[col] += 1;
            }
        }
    }

    // place structural zeros on the diagonal using self.colptr as the
    // next-free-slot indicator in each column
    pub(crate) fn fill_diag(&mut self, initcol: usize, blockdim: usize) {
        for col in initcol..(initcol + blockdim) {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = T::zero();
            self.colptr[col] += 1;
        }
    }

    // same as fill_diag, but only places entries where the tril input
    // matrix M has a missing diagonal entry
    pub(crate) fn fill_missing_diag_tril(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            if M.colptr[i] == M.colptr[i + 1] || M.rowval[M.colptr[i]] != i {
                let dest = self.colptr[i + initcol];
                self.rowval[dest] = i + initcol;
                self.nzval[dest] = T::zero();
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // convert per-column counts accumulated in colptr to the
    // standard cumulative form
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // recover colptr after the fill pass has advanced each entry
    // to the end of its column
    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }

    pub(crate) fn count_diagonal_entries_tril(&self) -> usize {
        let mut count = 0;
        for i in 0..self.n {
            if self.colptr[i + 1] != self.colptr[i] && self.rowval[self.colptr[i]] == i {
                count += 1;
            }
        }
        count
    }
}

#[test]
fn test_csc_gemv() {
    // A = [1. 0. 2.]
    //     [0. 3. 0.]
    let A = CscMatrix::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0], vec![1., 3., 2.]);

    let mut y = vec![1., 1.];
    A.gemv(&mut y, MatrixShape::N, &[1., 2., 3.], 1.0, -1.0);
    assert_eq!(y, vec![6., 5.]);

    let mut y = vec![0., 0., 0.];
    A.gemv(&mut y, MatrixShape::T, &[1., 2.], 1.0, 0.0);
    assert_eq!(y, vec![1., 6., 2.]);
}

#[test]
fn test_csc_symv_tril() {
    // lower triangle of [[2, 1, 0], [1, 3, 4], [0, 4, 5]]
    let A = CscMatrix::new(
        3,
        3,
        vec![0, 2, 4, 5],
        vec![0, 1, 1, 2, 2],
        vec![2., 1., 3., 4., 5.],
    );
    assert!(A.is_tril());

    let x = vec![1., -1., 2.];
    let mut y = vec![0.; 3];
    A.symv(&mut y, &x, 1.0, 0.0);
    assert_eq!(y, vec![1., 6., 6.]);
}

#[test]
fn test_csc_to_tril() {
    // full symmetric [[1, 2], [2, 3]]
    let A = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1., 2., 2., 3.]);
    assert!(!A.is_tril());

    let L = A.to_tril();
    assert!(L.is_tril());
    assert_eq!(L.nnz(), 3);
    assert_eq!(L.nzval, vec![1., 2., 3.]);

    let x = vec![1., 1.];
    let mut y1 = vec![0.; 2];
    let mut y2 = vec![0.; 2];
    A.gemv(&mut y1, MatrixShape::N, &x, 1.0, 0.0);
    L.symv(&mut y2, &x, 1.0, 0.0);
    assert_eq!(y1, y2);
}

#[test]
fn test_csc_row_col_norms() {
    let A = CscMatrix::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0], vec![1., -3., 2.]);

    let mut rnorms = vec![0.; 2];
    let mut cnorms = vec![0.; 3];
    A.row_norms(&mut rnorms);
    A.col_norms(&mut cnorms);
    assert_eq!(rnorms, vec![2., 3.]);
    assert_eq!(cnorms, vec![1., 3., 2.]);
}
