#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::traits::ProblemData;

// ---------------
// Data type for default problem format
// ---------------

/// Problem data (Q, A, G, b, c, h), generic over the matrix storage,
/// implementing the [`ProblemData`](crate::solver::core::traits::ProblemData) trait.
///
/// The data is copied at construction and scaled in place by the
/// equilibrator; the original user arrays are never modified.
pub struct DefaultProblemData<T, M> {
    /// quadratic cost, symmetric PSD, lower-triangle canonical
    pub Q: M,
    /// equality constraint operator (m x n)
    pub A: M,
    /// conic constraint operator (k x n)
    pub G: M,
    pub b: Vec<T>,
    pub c: Vec<T>,
    pub h: Vec<T>,
    /// number of primal variables
    pub n: usize,
    /// number of equality constraints
    pub m: usize,
    /// number of conic constraints
    pub k: usize,
    /// equilibration scalings, identity unless `outer_equil` is set
    pub equilibration: DefaultEquilibrationData<T>,

    // 2-norms of the linear terms after equilibration, used in the
    // scaled convergence measures
    pub(crate) norm_b: T,
    pub(crate) norm_c: T,
    pub(crate) norm_h: T,

    // 2-norm estimates of the scaled operators, used to set the large
    // regularization and reported in the setup summary
    pub(crate) norm_est_Q: T,
    pub(crate) norm_est_A: T,
    pub(crate) norm_est_G: T,
}

impl<T, M> DefaultProblemData<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    pub fn new(Q: &M, A: &M, G: &M, b: &[T], c: &[T], h: &[T]) -> Self {
        let (m, n) = A.size();
        let k = G.nrows();

        assert!(Q.is_square(), "Q must be square");
        assert_eq!(Q.ncols(), n, "Q and A have incompatible dimensions");
        assert_eq!(G.ncols(), n, "A and G have incompatible dimensions");
        assert_eq!(b.len(), m, "A and b have incompatible dimensions");
        assert_eq!(c.len(), n, "Q and c have incompatible dimensions");
        assert_eq!(h.len(), k, "G and h have incompatible dimensions");

        let equilibration = DefaultEquilibrationData::<T>::new(n, m, k);

        Self {
            Q: Q.sym_canonical(),
            A: A.clone(),
            G: G.clone(),
            b: b.to_vec(),
            c: c.to_vec(),
            h: h.to_vec(),
            n,
            m,
            k,
            equilibration,
            norm_b: T::zero(),
            norm_c: T::zero(),
            norm_h: T::zero(),
            norm_est_Q: T::zero(),
            norm_est_A: T::zero(),
            norm_est_G: T::zero(),
        }
    }

    /// 2-norm estimate of the stacked operator, `‖Q‖ + ‖A‖ + ‖G‖ + 1`.
    /// Used to scale the large regularization.
    pub(crate) fn operator_norm_estimate(&self) -> T {
        self.norm_est_Q + self.norm_est_A + self.norm_est_G + T::one()
    }

    // called once after equilibration so that all scaled norms are
    // available to the driver and the KKT assembler
    fn update_norms(&mut self, basis_size: usize) {
        self.norm_b = self.b.norm();
        self.norm_c = self.c.norm();
        self.norm_h = self.h.norm();
        self.norm_est_Q = self.Q.sym_norm_two_est(basis_size);
        self.norm_est_A = self.A.norm_two_est(basis_size);
        self.norm_est_G = self.G.norm_two_est(basis_size);
    }
}

impl<T, M> ProblemData<T, DefaultSettings<T>> for DefaultProblemData<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    fn equilibrate(&mut self, settings: &DefaultSettings<T>) {
        // the equilibration data initializes to the identity scaling,
        // so there is nothing to do when disabled
        if settings.outer_equil {
            ruiz_equilibrate(
                &mut self.Q,
                &mut self.A,
                &mut self.G,
                &mut self.b,
                &mut self.c,
                &mut self.h,
                &mut self.equilibration,
            );
        }
        self.update_norms(settings.two_norm_krylov_basis_size);
    }

    fn print_summary(&self, settings: &DefaultSettings<T>) {
        if !settings.print {
            return;
        }
        println!("problem dimensions: n = {}, m = {}, k = {}", self.n, self.m, self.k);
        println!("|| Q ||_2 estimate: {:.6e}", self.norm_est_Q);
        println!("|| c ||_2 = {:.6e}", self.norm_c);
        println!("|| A ||_2 estimate: {:.6e}", self.norm_est_A);
        println!("|| b ||_2 = {:.6e}", self.norm_b);
        println!("|| G ||_2 estimate: {:.6e}", self.norm_est_G);
        println!("|| h ||_2 = {:.6e}", self.norm_h);
    }
}

#[test]
fn test_problem_data_dims_and_norms() {
    use crate::solver::core::traits::ProblemData as _;

    let Q = Matrix::identity(2);
    let A = Matrix::new_from_slice((1, 2), &[1., 1.]);
    let G = Matrix::new_from_slice((2, 2), &[-1., 0., 0., -1.]);
    let b = [1.];
    let c = [1., 2.];
    let h = [0., 0.];

    let mut data = DefaultProblemData::new(&Q, &A, &G, &b, &c, &h);
    let settings = DefaultSettings::<f64>::default();
    data.equilibrate(&settings);

    assert_eq!((data.n, data.m, data.k), (2, 1, 2));
    assert!(data.norm_b > 0.0);
    assert!(data.operator_norm_estimate() > 1.0);
}
