#![allow(non_snake_case)]
use crate::algebra::*;
use std::iter::zip;

// number of Ruiz sweeps attempted, and the norm deviation from one at
// which the scaling is considered converged
const RUIZ_MAX_SWEEPS: usize = 10;
const RUIZ_TOL: f64 = 1e-3;

/// Diagonal scalings produced by stacked Ruiz equilibration.
///
/// The vectors hold divisors: the scaled data is
/// `A ← D_A⁻¹ A D_col⁻¹`, `G ← D_G⁻¹ G D_col⁻¹`, `Q ← D_col⁻¹ Q D_col⁻¹`,
/// with `b`, `h` and `c` divided elementwise by `d_a`, `d_g` and `d_col`.
pub struct DefaultEquilibrationData<T> {
    /// row scaling of the equality operator A
    pub d_a: Vec<T>,
    /// row scaling of the conic operator G
    pub d_g: Vec<T>,
    /// column scaling shared by A, G and (symmetrically) Q
    pub d_col: Vec<T>,
}

impl<T> DefaultEquilibrationData<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        Self {
            d_a: vec![T::one(); m],
            d_g: vec![T::one(); k],
            d_col: vec![T::one(); n],
        }
    }
}

/// Drive the row ∞-norms of [A; G] and the column ∞-norms of [A; G; Q]
/// toward one by repeated two-sided diagonal scaling, accumulating the
/// applied divisors into `equil`.
pub(crate) fn ruiz_equilibrate<T, M>(
    Q: &mut M,
    A: &mut M,
    G: &mut M,
    b: &mut [T],
    c: &mut [T],
    h: &mut [T],
    equil: &mut DefaultEquilibrationData<T>,
) where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    let (m, n) = A.size();
    let k = G.nrows();

    let mut r_a = vec![T::zero(); m];
    let mut r_g = vec![T::zero(); k];
    let mut r_col = vec![T::zero(); n];

    let tol: T = RUIZ_TOL.as_T();

    for _ in 0..RUIZ_MAX_SWEEPS {
        A.row_norms(&mut r_a);
        G.row_norms(&mut r_g);

        A.col_norms(&mut r_col);
        G.col_norms_no_reset(&mut r_col);
        Q.col_norms_sym_no_reset(&mut r_col);

        // zero rows or columns should not get scaled
        r_a.scalarop(|x| if x == T::zero() { T::one() } else { x });
        r_g.scalarop(|x| if x == T::zero() { T::one() } else { x });
        r_col.scalarop(|x| if x == T::zero() { T::one() } else { x });

        let deviation = [
            norm_deviation(&r_a),
            norm_deviation(&r_g),
            norm_deviation(&r_col),
        ]
        .iter()
        .fold(T::zero(), |a, &b| T::max(a, b));
        if deviation <= tol {
            break;
        }

        // divide rows and columns by the square roots of their norms
        r_a.rsqrt();
        r_g.rsqrt();
        r_col.rsqrt();

        A.lrscale(&r_a, &r_col);
        G.lrscale(&r_g, &r_col);
        Q.lrscale(&r_col, &r_col);

        // accumulate the equivalent divisors
        accumulate_divisors(&mut equil.d_a, &r_a);
        accumulate_divisors(&mut equil.d_g, &r_g);
        accumulate_divisors(&mut equil.d_col, &r_col);
    }

    // transform the linear terms consistently
    divide_elementwise(b, &equil.d_a);
    divide_elementwise(h, &equil.d_g);
    divide_elementwise(c, &equil.d_col);
}

fn norm_deviation<T: FloatT>(r: &[T]) -> T {
    r.iter()
        .fold(T::zero(), |acc, &x| T::max(acc, T::abs(T::one() - x)))
}

// d holds accumulated divisors; f holds the reciprocal factors that
// were just applied to the data
fn accumulate_divisors<T: FloatT>(d: &mut [T], f: &[T]) {
    zip(d, f).for_each(|(d, f)| *d /= *f);
}

fn divide_elementwise<T: FloatT>(v: &mut [T], d: &[T]) {
    zip(v, d).for_each(|(v, d)| *v /= *d);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruiz_drives_norms_to_one() {
        // badly row-scaled stacked operator
        let mut A = Matrix::new_from_slice((2, 2), &[1., 0., 0., 1e8]);
        let mut G = Matrix::new_from_slice((2, 2), &[-1., 0., 0., -1e-4]);
        let mut Q = Matrix::<f64>::zeros((2, 2));
        let mut b = vec![1., 1.];
        let mut c = vec![1., 1.];
        let mut h = vec![0., 0.];

        let mut equil = DefaultEquilibrationData::new(2, 2, 2);
        ruiz_equilibrate(&mut Q, &mut A, &mut G, &mut b, &mut c, &mut h, &mut equil);

        let mut r_a = vec![0.; 2];
        let mut r_g = vec![0.; 2];
        let mut r_col = vec![0.; 2];
        A.row_norms(&mut r_a);
        G.row_norms(&mut r_g);
        A.col_norms(&mut r_col);
        G.col_norms_no_reset(&mut r_col);

        for &v in r_a.iter().chain(r_g.iter()).chain(r_col.iter()) {
            assert!((v - 1.0).abs() < 5e-2);
        }
    }

    #[test]
    fn test_ruiz_roundtrip() {
        let a_orig: [f64; 4] = [1., 2., 0., 4e6];
        let mut A = Matrix::new_from_slice((2, 2), &a_orig);
        let mut G = Matrix::identity(2);
        let mut Q = Matrix::identity(2);
        let mut b = vec![1., 2.];
        let mut c = vec![3., 4.];
        let mut h = vec![5., 6.];
        let (b_orig, c_orig, h_orig) = (b.clone(), c.clone(), h.clone());

        let mut equil = DefaultEquilibrationData::new(2, 2, 2);
        ruiz_equilibrate(&mut Q, &mut A, &mut G, &mut b, &mut c, &mut h, &mut equil);

        // undo the scaling and compare to the originals
        A.lrscale(&equil.d_a, &equil.d_col);
        for (i, &v) in a_orig.iter().enumerate() {
            let rel = if v == 0.0 { A.data[i].abs() } else { (A.data[i] - v).abs() / v.abs() };
            assert!(rel <= 10.0 * f64::EPSILON);
        }
        for i in 0..2 {
            assert!((b[i] * equil.d_a[i] - b_orig[i]).abs() <= 10.0 * f64::EPSILON * b_orig[i].abs());
            assert!((c[i] * equil.d_col[i] - c_orig[i]).abs() <= 10.0 * f64::EPSILON * c_orig[i].abs());
            assert!((h[i] * equil.d_g[i] - h_orig[i]).abs() <= 10.0 * f64::EPSILON * h_orig[i].abs());
        }
    }
}
