#![allow(non_snake_case)]

use super::*;
use std::iter::zip;

const UNKNOWN: usize = usize::MAX;

/// LDLᵀ factorization of a sparse symmetric quasi-definite matrix.
///
/// The matrix must be passed in upper triangular CSC form with every
/// diagonal entry structurally present.  Symbolic analysis (AMD
/// ordering, symmetric permutation, elimination tree and factor
/// allocation) happens once in [`init_symbolic`](SparseLdlFactorization::init_symbolic);
/// afterwards only numeric values change, through
/// [`update_values`](SparseLdlFactorization::update_values) followed by
/// [`factor`](SparseLdlFactorization::factor).

#[derive(Debug)]
pub struct SparseLdlFactorization<T = f64> {
    n: usize,
    // fill-reducing permutation and its inverse
    perm: Vec<usize>,
    // permuted upper triangular copy of the input
    kkt: CscMatrix<T>,
    // mapping from input nonzero positions to positions in `kkt`
    map: Vec<usize>,
    // elimination tree and per-column factor counts
    etree: Vec<usize>,
    lcolnz: Vec<usize>,
    // unit lower triangular factor and quasi-definite diagonal
    L: CscMatrix<T>,
    D: Vec<T>,
    Dinv: Vec<T>,
    // workspace
    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,
    swork: Vec<T>,
    // permuted pivot sign pattern and regularization controls
    dsigns: Vec<i8>,
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,
    regularize_count: usize,
}

impl<T> SparseLdlFactorization<T>
where
    T: FloatT,
{
    /// Perform the one-time symbolic analysis for the matrix `K`,
    /// capturing its current values.  No numeric factorization is
    /// carried out; call [`factor`](SparseLdlFactorization::factor) next.
    pub fn init_symbolic(K: &CscMatrix<T>, opts: LdlSettings<T>) -> Result<Self, LdlError> {
        check_structure(K)?;
        let n = K.n;

        let (perm, iperm) = amd_ordering(K, opts.amd_dense_scale)?;
        let (kkt, map) = permute_symmetric(K, &iperm);

        // permute the expected sign pattern to match
        let mut dsigns = vec![1_i8; n];
        if let Some(signs) = opts.dsigns {
            assert_eq!(signs.len(), n);
            permute(&mut dsigns, &signs, &perm);
        }

        let mut iwork = vec![0; 3 * n];
        let mut etree = vec![0; n];
        let mut lcolnz = vec![0; n];
        elimination_tree(&kkt, &mut iwork, &mut lcolnz, &mut etree);

        let sumlnz = lcolnz.iter().sum();
        let L = CscMatrix::spalloc((n, n), sumlnz);

        Ok(Self {
            n,
            perm,
            kkt,
            map,
            etree,
            lcolnz,
            L,
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            iwork,
            bwork: vec![false; n],
            fwork: vec![T::zero(); n],
            swork: vec![T::zero(); n],
            dsigns,
            regularize_enable: opts.regularize_enable,
            regularize_eps: opts.regularize_eps,
            regularize_delta: opts.regularize_delta,
            regularize_count: 0,
        })
    }

    /// Overwrite values held in the internal (permuted) copy of the
    /// matrix.  `indices` refer to nonzero positions of the matrix that
    /// was passed to `init_symbolic`.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        for (&idx, &v) in zip(indices, values) {
            self.kkt.nzval[self.map[idx]] = v;
        }
    }

    /// Number of pivots clamped in the last factorization.
    pub fn regularize_count(&self) -> usize {
        self.regularize_count
    }

    /// Numeric factorization with the current values.
    pub fn factor(&mut self) -> Result<(), LdlError> {
        let n = self.n;
        self.regularize_count = 0;

        // L.colptr <- cumsum of the symbolic column counts
        self.L.colptr[0] = 0;
        for i in 0..n {
            self.L.colptr[i + 1] = self.L.colptr[i] + self.lcolnz[i];
        }

        let K = &self.kkt;
        let (Lp, Li, Lx) = (&self.L.colptr, &mut self.L.rowval, &mut self.L.nzval);
        let (D, Dinv) = (&mut self.D, &mut self.Dinv);
        let yvals = &mut self.fwork;
        let ymarkers = &mut self.bwork;
        let (yidx, rest) = self.iwork.split_at_mut(n);
        let (elim, nextspace) = rest.split_at_mut(n);

        yvals.fill(T::zero());
        ymarkers.fill(false);
        D.fill(T::zero());
        nextspace.copy_from_slice(&Lp[0..n]);

        // the first column is trivial: its only upper triangular
        // entry is the diagonal itself
        D[0] = regularize_pivot(
            K.nzval[0],
            self.dsigns[0],
            self.regularize_enable,
            self.regularize_eps,
            self.regularize_delta,
            &mut self.regularize_count,
        );
        if D[0] == T::zero() {
            return Err(LdlError::ZeroPivot);
        }
        Dinv[0] = T::recip(D[0]);

        for k in 1..n {
            // The kth row of L solves y = L(0:k-1, 0:k-1) \ b against the
            // above-diagonal part b of column k of K.  First walk the
            // elimination tree to find the nonzero pattern of y.
            let mut nnz_y = 0;
            for idx in K.colptr[k]..K.colptr[k + 1] {
                let bidx = K.rowval[idx];

                // the diagonal entry seeds D[k] and takes no part
                // in the elimination
                if bidx == k {
                    D[k] = K.nzval[idx];
                    continue;
                }

                yvals[bidx] = K.nzval[idx];

                // buffer the unvisited portion of the path to the root
                let mut node = bidx;
                let mut pathlen = 0;
                while node != UNKNOWN && node < k && !ymarkers[node] {
                    ymarkers[node] = true;
                    elim[pathlen] = node;
                    pathlen += 1;
                    node = self.etree[node];
                }

                // unwind the path so that ancestors come first
                while pathlen > 0 {
                    pathlen -= 1;
                    yidx[nnz_y] = elim[pathlen];
                    nnz_y += 1;
                }
            }

            // eliminate along the pattern, placing values into row k of L
            for i in (0..nnz_y).rev() {
                let cidx = yidx[i];
                let dest = nextspace[cidx];
                let yv = yvals[cidx];

                for j in Lp[cidx]..dest {
                    yvals[Li[j]] -= Lx[j] * yv;
                }

                let lkj = yv * Dinv[cidx];
                Li[dest] = k;
                Lx[dest] = lkj;
                D[k] -= yv * lkj;
                nextspace[cidx] += 1;

                yvals[cidx] = T::zero();
                ymarkers[cidx] = false;
            }

            D[k] = regularize_pivot(
                D[k],
                self.dsigns[k],
                self.regularize_enable,
                self.regularize_eps,
                self.regularize_delta,
                &mut self.regularize_count,
            );
            if D[k] == T::zero() {
                return Err(LdlError::ZeroPivot);
            }
            Dinv[k] = T::recip(D[k]);
        }
        Ok(())
    }

    /// Solve `K x = b` in place using the current factors.
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.n);

        let tmp = &mut self.swork;
        permute(tmp, b, &self.perm);

        lsolve(&self.L, tmp);
        tmp.hadamard(&self.Dinv);
        ltsolve(&self.L, tmp);

        ipermute(b, tmp, &self.perm);
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), LdlError> {
    if !A.is_square() {
        return Err(LdlError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(LdlError::NotUpperTriangular);
    }

    //Error if A doesn't have at least one entry in every column
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(LdlError::EmptyColumn);
    }

    Ok(())
}

fn amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), LdlError> {
    let mut control = amd::Control::default();
    control.dense *= dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| LdlError::OrderingFailure)?;
    Ok((perm, iperm))
}

// Compute the elimination tree of a quasi-definite matrix in upper
// triangular CSC form, together with the per-column nonzero counts
// of its LDLᵀ factor.
fn elimination_tree<T: FloatT>(
    A: &CscMatrix<T>,
    work: &mut [usize],
    lcolnz: &mut [usize],
    etree: &mut [usize],
) {
    let n = A.n;
    work[0..n].fill(0);
    lcolnz.fill(0);
    etree.fill(UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for &row in &A.rowval[A.colptr[j]..A.colptr[j + 1]] {
            let mut i = row;
            while work[i] != j {
                if etree[i] == UNKNOWN {
                    etree[i] = j;
                }
                lcolnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

// Solves (L+I)x = b in place
fn lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        if xi == T::zero() {
            continue;
        }
        for j in L.colptr[i]..L.colptr[i + 1] {
            x[L.rowval[j]] -= L.nzval[j] * xi;
        }
    }
}

// Solves (L+I)ᵀx = b in place
fn ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let mut s = T::zero();
        for j in L.colptr[i]..L.colptr[i + 1] {
            s += L.nzval[j] * x[L.rowval[j]];
        }
        x[i] -= s;
    }
}

// out-of-place permutations, x = b[p] and x[p] = b
fn permute<A: Copy>(x: &mut [A], b: &[A], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn ipermute<A: Copy>(x: &mut [A], b: &[A], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Symmetrically permute an upper triangular matrix A into a new upper
// triangular matrix, recording the mapping from input entries to
// permuted entries.  Follows the approach in Davis, "Direct Methods
// for Sparse Linear Systems".
fn permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let mut P = CscMatrix::<T>::spalloc((n, n), A.nnz());
    let mut map = vec![0; A.nnz()];

    // count the entries each column of P will receive.  An entry
    // (row, col) lands in the column holding the larger of the two
    // permuted indices, since P is also upper triangular.
    let mut counts = vec![0; n];
    for col in 0..n {
        let colP = iperm[col];
        for &row in &A.rowval[A.colptr[col]..A.colptr[col + 1]] {
            let rowP = iperm[row];
            counts[usize::max(rowP, colP)] += 1;
        }
    }

    // cumulative sum into P.colptr, then use free-slot counters
    P.colptr[0] = 0;
    for i in 0..n {
        P.colptr[i + 1] = P.colptr[i] + counts[i];
    }
    let mut slots: Vec<usize> = P.colptr[0..n].to_vec();

    for col in 0..n {
        let colP = iperm[col];
        for idx in A.colptr[col]..A.colptr[col + 1] {
            let rowP = iperm[A.rowval[idx]];

            let dest_col = usize::max(colP, rowP);
            let dest = slots[dest_col];
            slots[dest_col] += 1;

            P.rowval[dest] = usize::min(colP, rowP);
            P.nzval[dest] = A.nzval[idx];
            map[idx] = dest;
        }
    }

    (P, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    // triu of the quasi-definite matrix
    // [ 4  1  1 ]
    // [ 1  3  2 ]
    // [ 1  2 -2 ]
    fn test_matrix() -> CscMatrix<f64> {
        CscMatrix::new(
            3,
            3,
            vec![0, 1, 3, 6],
            vec![0, 0, 1, 0, 1, 2],
            vec![4., 1., 3., 1., 2., -2.],
        )
    }

    #[test]
    fn test_sparse_ldl_solve() {
        let K = test_matrix();
        let opts = LdlSettingsBuilder::default()
            .dsigns(vec![1, 1, -1])
            .build()
            .unwrap();

        let mut ldl = SparseLdlFactorization::init_symbolic(&K, opts).unwrap();
        ldl.factor().unwrap();

        let b = vec![6., 6., 1.];
        let mut x = b.clone();
        ldl.solve(&mut x);

        // check K x = b against a dense solve of the same system
        let Kdense = Matrix::new_from_slice(
            (3, 3),
            &[
                4., 1., 1., //
                1., 3., 2., //
                1., 2., -2.,
            ],
        );
        let mut r = b;
        Kdense.symv(&mut r, &x, -1.0, 1.0);
        assert!(r.norm_inf() < 1e-12);
    }

    #[test]
    fn test_sparse_ldl_refresh_values() {
        let K = test_matrix();
        let opts = LdlSettingsBuilder::default()
            .dsigns(vec![1, 1, -1])
            .build()
            .unwrap();

        let mut ldl = SparseLdlFactorization::init_symbolic(&K, opts).unwrap();
        ldl.factor().unwrap();

        // scale the diagonal (3,3) entry and refactor; index 5 is the
        // (2,2) position in the input ordering
        ldl.update_values(&[5], &[-4.]);
        ldl.factor().unwrap();

        let mut x = vec![0., 0., -4.];
        ldl.solve(&mut x);

        let Kdense = Matrix::new_from_slice(
            (3, 3),
            &[
                4., 1., 1., //
                1., 3., 2., //
                1., 2., -4.,
            ],
        );
        let mut r = vec![0., 0., -4.];
        Kdense.symv(&mut r, &x, -1.0, 1.0);
        assert!(r.norm_inf() < 1e-12);
    }

    #[test]
    fn test_sparse_ldl_rejects_bad_structure() {
        // not upper triangular
        let K = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1.]);
        let res = SparseLdlFactorization::init_symbolic(&K, LdlSettings::default());
        assert!(matches!(res, Err(LdlError::NotUpperTriangular)));
    }
}
