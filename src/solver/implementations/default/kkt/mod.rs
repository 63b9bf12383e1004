#![allow(non_snake_case)]
//! The KKT system facade: block assembly, LDLᵀ factorization and
//! iteratively refined solves of the regularized saddle-point operator
//!
//! ```text
//! J = [ Q + γ_x·I       Aᵀ            Gᵀ         ]
//!     [      A       -γ_y·I           0          ]
//!     [      G          0     -(s∘z⁻¹)·I - γ_z·I ]
//! ```
//!
//! The matrix actually factored carries the additional large
//! regularization vector reg_L on its diagonal.  Refinement can target
//! either the factored system or the unregularized J, by folding
//! reg_L∘x back into the residual.

mod dense;
mod sparse;

pub use dense::*;
pub use sparse::*;

use super::*;
use crate::algebra::*;
use crate::ldl::{LdlError, LdlSettings, LdlSettingsBuilder};
use crate::solver::core::{traits::KKTSystem, SolverError};

/// Workspace for iterative refinement.
pub struct RefineWork<T> {
    e: Vec<T>,
    dx: Vec<T>,
}

impl<T: FloatT> RefineWork<T> {
    fn new(dim: usize) -> Self {
        Self {
            e: vec![T::zero(); dim],
            dx: vec![T::zero(); dim],
        }
    }
}

/// Storage-specific KKT assembly and factorization backend.
///
/// An engine owns the assembled KKT matrix in its preferred storage and
/// a matching LDLᵀ factorization.  The structure is fixed at
/// construction; per-iteration updates touch only the (3,3) diagonal.
pub trait KKTEngine<T: FloatT> {
    /// Write -s_i/z_i + diag33_offset_i into the (3,3) diagonal.
    fn refresh_scaling(&mut self, s: &[T], z: &[T], diag33_offset: &[T]);

    /// Factor the current matrix.
    fn factor(&mut self) -> Result<(), LdlError>;

    /// Single factorization solve, `x = K⁻¹ b`.
    fn solve_once(&mut self, x: &mut [T], b: &[T]);

    /// Apply the assembled operator, `y = K x`.
    fn apply(&self, y: &mut [T], x: &[T]);

    /// Solve with iterative refinement.  When `unregularized` carries
    /// the large regularization vector, the refinement residual targets
    /// the system without it; otherwise the factored system itself.
    /// Returns true if the requested relative tolerance was met.
    fn solve_refined(
        &mut self,
        x: &mut [T],
        b: &[T],
        unregularized: Option<&[T]>,
        work: &mut RefineWork<T>,
        ctrl: &SolveControl<T>,
    ) -> bool {
        self.solve_once(x, b);
        let norm_b = b.norm();

        for sweep in 0..=ctrl.max_refine_iters {
            // e = b - K x, plus reg_L ∘ x when targeting the
            // unregularized operator
            self.apply(&mut work.e, x);
            work.e.axpby(T::one(), b, -T::one());
            if let Some(reg) = unregularized {
                for ((e, &r), &xi) in work.e.iter_mut().zip(reg).zip(x.iter()) {
                    *e += r * xi;
                }
            }

            let norm_e = work.e.norm();
            let rel_error = if norm_b > T::zero() {
                norm_e / norm_b
            } else {
                norm_e
            };
            if ctrl.progress {
                println!("refine sweep {sweep}: relative error {rel_error:.3e}");
            }
            if rel_error <= ctrl.rel_tol {
                return true;
            }
            if sweep == ctrl.max_refine_iters {
                break;
            }

            self.solve_once(&mut work.dx, &work.e);
            x.axpby(T::one(), &work.dx, T::one());
        }
        false
    }
}

/// Binds a matrix storage type to its KKT engine.
pub trait HasKKTEngine<T: FloatT>: Sized {
    type Engine: KKTEngine<T>;

    /// Assemble the engine from problem matrices, with the static
    /// diagonal offsets for the (1,1) and (2,2) blocks already
    /// combining the small and large regularizations.
    fn new_engine(
        Q: &Self,
        A: &Self,
        G: &Self,
        diag11: &[T],
        diag22: &[T],
        opts: LdlSettings<T>,
    ) -> Self::Engine;
}

// ---------------
// KKT system for default problem format
// ---------------

/// Standard-form KKT system implementing the
/// [`KKTSystem`](crate::solver::core::traits::KKTSystem) trait,
/// generic over the matrix storage.
pub struct DefaultKKTSystem<T, M>
where
    T: FloatT,
    M: HasKKTEngine<T>,
{
    n: usize,
    m: usize,
    k: usize,

    engine: M::Engine,

    // large regularization, sign pattern (+, -, -), pre-scaled by the
    // two-norm estimate of the problem data
    reg_large: Vec<T>,
    // -γ_z + reg_large for the (3,3) diagonal refresh
    diag33_offset: Vec<T>,

    // right hand side and solution for the assembled system
    d: Vec<T>,
    sol: Vec<T>,
    work: RefineWork<T>,

    // unit scaling used for the initialization solves
    unit: Vec<T>,
}

impl<T, M> DefaultKKTSystem<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T> + HasKKTEngine<T>,
{
    pub fn new(data: &DefaultProblemData<T, M>, settings: &DefaultSettings<T>) -> Self {
        let (n, m, k) = (data.n, data.m, data.k);
        let dim = n + m + k;

        let norm_est = data.operator_norm_estimate();

        let mut reg_large = vec![T::zero(); dim];
        for (i, reg) in reg_large.iter_mut().enumerate() {
            let signed = if i < n {
                settings.x_reg_large
            } else if i < n + m {
                -settings.y_reg_large
            } else {
                -settings.z_reg_large
            };
            *reg = signed * norm_est;
        }

        let mut diag11 = vec![T::zero(); n];
        for (i, v) in diag11.iter_mut().enumerate() {
            *v = settings.x_reg_small + reg_large[i];
        }
        let mut diag22 = vec![T::zero(); m];
        for (i, v) in diag22.iter_mut().enumerate() {
            *v = -settings.y_reg_small + reg_large[n + i];
        }
        let mut diag33_offset = vec![T::zero(); k];
        for (i, v) in diag33_offset.iter_mut().enumerate() {
            *v = -settings.z_reg_small + reg_large[n + m + i];
        }

        // the expected inertia of the quasi-definite system
        let mut dsigns = vec![1_i8; dim];
        dsigns[n..].iter_mut().for_each(|x| *x = -1);

        let opts = LdlSettingsBuilder::default()
            .dsigns(dsigns)
            .build()
            .unwrap();

        let engine = M::new_engine(&data.Q, &data.A, &data.G, &diag11, &diag22, opts);

        Self {
            n,
            m,
            k,
            engine,
            reg_large,
            diag33_offset,
            d: vec![T::zero(); dim],
            sol: vec![T::zero(); dim],
            work: RefineWork::new(dim),
            unit: vec![T::one(); k],
        }
    }

    // two solve strategies, tried in order when two_stage is enabled:
    // refinement against the unregularized system first, then against
    // the regularized system actually factored
    fn solve_linear(&mut self, settings: &DefaultSettings<T>) -> Result<(), SolverError> {
        let ctrl = &settings.solve;

        let mut ok = false;
        if settings.two_stage {
            ok = self.engine.solve_refined(
                &mut self.sol,
                &self.d,
                Some(&self.reg_large),
                &mut self.work,
                ctrl,
            );
        }
        if !ok {
            ok = self
                .engine
                .solve_refined(&mut self.sol, &self.d, None, &mut self.work, ctrl);
        }

        if ok {
            Ok(())
        } else {
            Err(SolverError::SolveFailure)
        }
    }
}

impl<T, M>
    KKTSystem<T, DefaultProblemData<T, M>, DefaultVariables<T>, DefaultResiduals<T>, DefaultSettings<T>>
    for DefaultKKTSystem<T, M>
where
    T: FloatT,
    M: ProblemMatrix<T> + HasKKTEngine<T>,
{
    fn update(
        &mut self,
        _data: &DefaultProblemData<T, M>,
        variables: &DefaultVariables<T>,
        _settings: &DefaultSettings<T>,
    ) -> Result<(), SolverError> {
        self.engine
            .refresh_scaling(&variables.s, &variables.z, &self.diag33_offset);
        self.engine
            .factor()
            .map_err(|_| SolverError::SolveFailure)
    }

    fn solve(
        &mut self,
        step: &mut DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        variables: &DefaultVariables<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<(), SolverError> {
        let (n, m, k) = (self.n, self.m, self.k);

        // pack d = ( -r_c, -r_b, -(r_h + r_μ / z) )
        self.d[0..n].scalarop_from(|v| -v, &residuals.rc);
        self.d[n..n + m].scalarop_from(|v| -v, &residuals.rb);
        for i in 0..k {
            self.d[n + m + i] = -(residuals.rh[i] + residuals.rμ[i] / variables.z[i]);
        }

        self.solve_linear(settings)?;

        // expand into the direction, Δs = -(r_μ + s ∘ Δz) / z
        step.x.copy_from(&self.sol[0..n]);
        step.y.copy_from(&self.sol[n..n + m]);
        step.z.copy_from(&self.sol[n + m..]);
        for i in 0..k {
            step.s[i] = -(residuals.rμ[i] + variables.s[i] * step.z[i]) / variables.z[i];
        }

        Ok(())
    }

    fn solve_initial_point(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T, M>,
        settings: &DefaultSettings<T>,
    ) -> Result<(), SolverError> {
        let (n, m) = (self.n, self.m);

        // factor the unit-scaling system, with s = z = 𝟙 in the (3,3) block
        self.engine.refresh_scaling(
            &self.unit,
            &self.unit,
            &self.diag33_offset,
        );
        self.engine
            .factor()
            .map_err(|_| SolverError::SolveFailure)?;

        if !settings.primal_init {
            // (x, s) from the least-norm primal system with RHS (0, b, h)
            self.d[0..n].set(T::zero());
            self.d[n..n + m].copy_from(&data.b);
            self.d[n + m..].copy_from(&data.h);
            self.solve_linear(settings)?;

            variables.x.copy_from(&self.sol[0..n]);
            variables.s.scalarop_from(|v| -v, &self.sol[n + m..]);
        }

        if !settings.dual_init {
            // (y, z) from the least-norm dual system with RHS (-c, 0, 0)
            self.d[0..n].scalarop_from(|v| -v, &data.c);
            self.d[n..].set(T::zero());
            self.solve_linear(settings)?;

            variables.y.copy_from(&self.sol[n..n + m]);
            variables.z.copy_from(&self.sol[n + m..]);
        }

        Ok(())
    }
}
