use super::error::SolverError;
use super::traits::*;
use crate::algebra::*;
use std::marker::PhantomData;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Final disposition of a solve call.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SolverStatus {
    /// no solve has been run, or the last solve terminated with an error
    #[default]
    Unsolved,
    /// tolerances met, or met with stagnating progress
    Solved,
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Generic interior-point solver.
///
/// Assembled from a set of cooperating component types; see
/// [`traits`](crate::solver::core::traits).  Users should construct one
/// of the concrete aliases, e.g.
/// [`DenseSolver`](crate::solver::DenseSolver) or
/// [`SparseSolver`](crate::solver::SparseSolver).
pub struct Solver<T, D, V, R, K, I, SO, SE> {
    pub data: D,
    pub variables: V,
    pub residuals: R,
    pub kktsystem: K,
    pub step_aff: V,
    pub step: V,
    pub info: I,
    pub solution: SO,
    pub settings: SE,
    pub(crate) phantom: PhantomData<T>,
}

// ---------------------------------
// IPSolver trait and its standard implementation
// ---------------------------------

/// The Mehrotra predictor-corrector interior-point iteration.
pub trait IPSolver<T> {
    /// Run the solver on the current problem data and iterate.
    fn solve(&mut self) -> Result<(), SolverError>;
}

impl<T, D, V, R, K, I, SO, SE> IPSolver<T> for Solver<T, D, V, R, K, I, SO, SE>
where
    T: FloatT,
    D: ProblemData<T, SE>,
    V: Variables<T>,
    R: Residuals<T, D, V>,
    K: KKTSystem<T, D, V, R, SE>,
    I: Info<T, V, R, SE>,
    SO: Solution<T, D, V, I>,
    SE: Settings<T>,
{
    fn solve(&mut self) -> Result<(), SolverError> {
        self.info.reset();
        self.data.print_summary(&self.settings);

        self.default_start()?;

        let max_iters = self.settings.core().max_iters;

        // ----------
        // main loop
        // ----------
        for iter in 0..=max_iters {
            // ensure that s and z are in the cone
            // ===================================
            let (s_count, z_count) = self.variables.count_outside_cone();
            if s_count > 0 || z_count > 0 {
                return Err(SolverError::ConeViolation { s_count, z_count });
            }

            // duality measure, residuals and convergence state
            // ================================================
            let μ = self.variables.calc_mu();
            self.residuals.update(&self.variables, &self.data);
            self.info.update(&self.variables, &self.residuals, μ, iter);
            self.info.print_status(&self.settings);

            if self.info.check_termination(&self.settings, iter)? {
                break;
            }

            // the affine search direction
            // ===========================
            self.residuals.set_affine_complementarity(&self.variables);

            let affine_result = self
                .kktsystem
                .update(&self.data, &self.variables, &self.settings)
                .and_then(|_| {
                    self.kktsystem.solve(
                        &mut self.step_aff,
                        &self.residuals,
                        &self.variables,
                        &self.settings,
                    )
                });
            if let Err(e) = affine_result {
                if self.info.met_tolerances() {
                    break;
                }
                return Err(e);
            }

            if self.settings.core().check_residuals && self.settings.core().print {
                let errors = self
                    .residuals
                    .direction_errors(&self.data, &self.step_aff);
                self.info.print_direction_errors(&self.settings, errors);
            }

            // centrality parameter
            // ====================
            let force_same_step = self.settings.core().force_same_step;
            let (mut α_pri_aff, mut α_dual_aff) =
                self.variables.max_step_lengths(&self.step_aff, T::one());
            if force_same_step {
                α_pri_aff = T::min(α_pri_aff, α_dual_aff);
                α_dual_aff = α_pri_aff;
            }

            let μ_aff = self.variables.mu_affine(&self.step_aff, α_pri_aff, α_dual_aff);
            let σ = (self.settings.core().centrality_rule)(μ, μ_aff, α_pri_aff, α_dual_aff);
            self.info
                .print_centrality(&self.settings, α_pri_aff, α_dual_aff, μ_aff, μ, σ);

            // the combined direction, reusing the factorization
            // =================================================
            self.residuals.set_combined_complementarity(
                σ * μ,
                &self.step_aff,
                self.settings.core().mehrotra,
            );

            let combined_result = self.kktsystem.solve(
                &mut self.step,
                &self.residuals,
                &self.variables,
                &self.settings,
            );
            if let Err(e) = combined_result {
                if self.info.met_tolerances() {
                    break;
                }
                return Err(e);
            }

            // step lengths and iterate update
            // ===============================
            let max_step_ratio = self.settings.core().max_step_ratio;
            let (mut α_pri, mut α_dual) = self
                .variables
                .max_step_lengths(&self.step, T::recip(max_step_ratio));
            α_pri = T::min(max_step_ratio * α_pri, T::one());
            α_dual = T::min(max_step_ratio * α_dual, T::one());
            if force_same_step {
                α_pri = T::min(α_pri, α_dual);
                α_dual = α_pri;
            }
            self.info.print_step_lengths(&self.settings, α_pri, α_dual);

            self.variables.add_step(&self.step, α_pri, α_dual);
            self.info.save_scalars(μ, σ, α_pri, α_dual, iter);

            if α_pri == T::zero() && α_dual == T::zero() {
                if self.info.met_tolerances() {
                    break;
                }
                return Err(SolverError::Stalled);
            }
        }

        // every exit from the loop other than an error return is a
        // successful termination, including the met-tolerances
        // recovery paths
        self.info.set_status(SolverStatus::Solved);
        self.solution
            .finalize(&self.data, &self.variables, &self.info);
        self.info.print_footer(&self.settings);

        Ok(())
    }
}

impl<T, D, V, R, K, I, SO, SE> Solver<T, D, V, R, K, I, SO, SE>
where
    T: FloatT,
    D: ProblemData<T, SE>,
    V: Variables<T>,
    R: Residuals<T, D, V>,
    K: KKTSystem<T, D, V, R, SE>,
    I: Info<T, V, R, SE>,
    SO: Solution<T, D, V, I>,
    SE: Settings<T>,
{
    // produce starting values for any of (x,s) and (y,z) that the
    // caller did not warm start, then lift s and z into the interior
    fn default_start(&mut self) -> Result<(), SolverError> {
        let primal_init = self.settings.core().primal_init;
        let dual_init = self.settings.core().dual_init;
        let shift = self.settings.core().standard_init_shift;

        if primal_init && dual_init {
            return Ok(());
        }

        self.kktsystem
            .solve_initial_point(&mut self.variables, &self.data, &self.settings)?;

        self.variables
            .shift_to_interior(shift, !primal_init, !dual_init);

        Ok(())
    }
}
