#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::ProblemData as _, Solver};
use std::iter::zip;
use std::marker::PhantomData;

/// Solver for problems in affine conic form, generic over the matrix
/// storage `M`.
///
/// Use the [`DenseSolver`] and [`SparseSolver`] aliases, and run the
/// iteration through [`IPSolver::solve`](crate::solver::IPSolver::solve).
pub type DefaultSolver<T, M> = Solver<
    T,
    DefaultProblemData<T, M>,
    DefaultVariables<T>,
    DefaultResiduals<T>,
    DefaultKKTSystem<T, M>,
    DefaultInfo<T>,
    DefaultSolution<T>,
    DefaultSettings<T>,
>;

/// Solver over dense column-major storage.
pub type DenseSolver<T = f64> = DefaultSolver<T, Matrix<T>>;

/// Solver over compressed sparse column storage.
pub type SparseSolver<T = f64> = DefaultSolver<T, CscMatrix<T>>;

impl<T, M> DefaultSolver<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T> + HasKKTEngine<T>,
{
    /// Build a solver for the problem
    ///
    /// ```text
    /// minimize   (1/2) xᵀQx + cᵀx
    /// subject to A x = b,  G x + s = h,  s ≥ 0
    /// ```
    ///
    /// The data is copied internally and, unless disabled in the
    /// settings, Ruiz equilibrated on the spot.  Warm starts may then
    /// be supplied through
    /// [`warm_start_primal`](DefaultSolver::warm_start_primal) and
    /// [`warm_start_dual`](DefaultSolver::warm_start_dual).
    ///
    /// # Panics
    /// Panics on dimensionally incompatible problem data.
    pub fn new(
        Q: &M,
        A: &M,
        G: &M,
        b: &[T],
        c: &[T],
        h: &[T],
        settings: DefaultSettings<T>,
    ) -> Self {
        let mut data = DefaultProblemData::new(Q, A, G, b, c, h);
        data.equilibrate(&settings);

        let (n, m, k) = (data.n, data.m, data.k);

        let kktsystem = DefaultKKTSystem::new(&data, &settings);
        let variables = DefaultVariables::new(n, m, k);
        let residuals = DefaultResiduals::new(n, m, k);
        let step_aff = DefaultVariables::new(n, m, k);
        let step = DefaultVariables::new(n, m, k);
        let info = DefaultInfo::new();
        let solution = DefaultSolution::new(n, m, k);

        Self {
            data,
            variables,
            residuals,
            kktsystem,
            step_aff,
            step,
            info,
            solution,
            settings,
            phantom: PhantomData,
        }
    }

    /// Install (x, s) as the primal starting point.  The values are
    /// carried into the equilibrated space, and the cone check at the
    /// first iteration requires s > 0.
    pub fn warm_start_primal(&mut self, x: &[T], s: &[T]) {
        assert_eq!(x.len(), self.data.n);
        assert_eq!(s.len(), self.data.k);

        let equil = &self.data.equilibration;
        for (out, (&v, &d)) in zip(&mut self.variables.x, zip(x, &equil.d_col)) {
            *out = v * d;
        }
        for (out, (&v, &d)) in zip(&mut self.variables.s, zip(s, &equil.d_g)) {
            *out = v / d;
        }
        self.settings.primal_init = true;
    }

    /// Install (y, z) as the dual starting point; z > 0 is required at
    /// the first iteration.
    pub fn warm_start_dual(&mut self, y: &[T], z: &[T]) {
        assert_eq!(y.len(), self.data.m);
        assert_eq!(z.len(), self.data.k);

        let equil = &self.data.equilibration;
        for (out, (&v, &d)) in zip(&mut self.variables.y, zip(y, &equil.d_a)) {
            *out = v * d;
        }
        for (out, (&v, &d)) in zip(&mut self.variables.z, zip(z, &equil.d_g)) {
            *out = v * d;
        }
        self.settings.dual_init = true;
    }
}
