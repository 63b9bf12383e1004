//! Required traits for types providing a solver implementation.
//!
//! A solver is assembled from a collection of mutually cooperating
//! component types.  The traits here are parameterized over their
//! collaborators rather than tied to concrete storage, so that a single
//! driver runs over any {scalar, storage} combination.  In nearly all
//! cases there is no need to implement these directly; use the types in
//! [`implementations::default`](crate::solver::implementations::default).

use super::{CoreSettings, SolverError, SolverStatus};
use crate::algebra::FloatT;

/// Data for a quadratic program in affine conic form.
pub trait ProblemData<T: FloatT, SE> {
    /// Equilibrate internal data before the solver starts.
    fn equilibrate(&mut self, settings: &SE);

    /// Print a summary of the problem data norms.
    fn print_summary(&self, settings: &SE);
}

/// The primal-dual iterate (x, y, z, s).
pub trait Variables<T: FloatT> {
    /// Count the entries of s and z that are outside the cone,
    /// i.e. not strictly positive.
    fn count_outside_cone(&self) -> (usize, usize);

    /// The duality measure μ = sᵀz / k.
    fn calc_mu(&self) -> T;

    /// The largest (α_pri, α_dual) in [0, cap] for which s + α_pri·Δs
    /// and z + α_dual·Δz remain nonnegative.
    fn max_step_lengths(&self, step: &Self, cap: T) -> (T, T);

    /// The duality measure after a trial step of the given lengths.
    fn mu_affine(&self, step: &Self, α_pri: T, α_dual: T) -> T;

    /// Apply the update, scaling primal components by `α_pri` and dual
    /// components by `α_dual`.
    fn add_step(&mut self, step: &Self, α_pri: T, α_dual: T);

    /// Shift s (if `primal`) and z (if `dual`) so their smallest entry
    /// is at least `margin`.
    fn shift_to_interior(&mut self, margin: T, primal: bool, dual: bool);
}

/// KKT residuals of the iterate, including the complementarity vector
/// r_μ shared between the affine and combined solves.
pub trait Residuals<T: FloatT, D, V> {
    /// Recompute all residuals, norms and objective values.
    fn update(&mut self, variables: &V, data: &D);

    /// r_μ = s ∘ z.
    fn set_affine_complementarity(&mut self, variables: &V);

    /// r_μ ← r_μ - σμ·𝟙, plus the Δs_a ∘ Δz_a correction when
    /// `mehrotra` is enabled.
    fn set_combined_complementarity(&mut self, σμ: T, step_aff: &V, mehrotra: bool);

    /// Recompute the residuals of a direction against the KKT equations,
    /// reported relative to (1 + ‖r_b‖₂), (1 + ‖r_c‖₂), (1 + ‖r_h‖₂).
    /// Diagnostic only; must not alter the iterate.
    fn direction_errors(&mut self, data: &D, step: &V) -> (T, T, T);
}

/// The KKT system facade: assembly, factorization and refined solves.
pub trait KKTSystem<T: FloatT, D, V, R, SE> {
    /// Write the current complementarity scaling into the KKT matrix
    /// and refactor.
    fn update(&mut self, data: &D, variables: &V, settings: &SE) -> Result<(), SolverError>;

    /// Solve for a step direction from the current residuals.  The
    /// factorization from the last [`update`](KKTSystem::update) is reused.
    fn solve(
        &mut self,
        step: &mut V,
        residuals: &R,
        variables: &V,
        settings: &SE,
    ) -> Result<(), SolverError>;

    /// Produce least-norm starting values for whichever of the primal
    /// and dual pairs was not supplied by the caller.
    fn solve_initial_point(
        &mut self,
        variables: &mut V,
        data: &D,
        settings: &SE,
    ) -> Result<(), SolverError>;
}

/// Convergence state, iteration scalars and progress output.
pub trait Info<T: FloatT, V, R, SE> {
    /// Reset internal state at the start of a solve.
    fn reset(&mut self);

    /// Update objective values, relative gaps and the DIMACS error.
    fn update(&mut self, variables: &V, residuals: &R, μ: T, iter: u32);

    /// Termination check.  Returns `Ok(true)` on a successful exit,
    /// `Ok(false)` to continue iterating.
    fn check_termination(&mut self, settings: &SE, iter: u32) -> Result<bool, SolverError>;

    /// True if all convergence tolerances were met at the last update.
    fn met_tolerances(&self) -> bool;

    /// Record the scalars chosen in this iteration.
    fn save_scalars(&mut self, μ: T, σ: T, α_pri: T, α_dual: T, iter: u32);

    /// Record the termination status.
    fn set_status(&mut self, status: SolverStatus);

    fn print_status(&self, settings: &SE);
    fn print_centrality(&self, settings: &SE, α_pri_aff: T, α_dual_aff: T, μ_aff: T, μ: T, σ: T);
    fn print_step_lengths(&self, settings: &SE, α_pri: T, α_dual: T);
    fn print_direction_errors(&self, settings: &SE, errors: (T, T, T));
    fn print_footer(&self, settings: &SE);
}

/// The user-facing solution, unscaled back to the original problem.
pub trait Solution<T: FloatT, D, V, I> {
    /// Populate from the final iterate at solver termination.
    fn finalize(&mut self, data: &D, variables: &V, info: &I);
}

/// Settings for the solver.
///
/// Implementors can carry any additional configuration they wish, but
/// must be able to produce the [`CoreSettings`](crate::solver::core::CoreSettings)
/// record consumed by the driver.
pub trait Settings<T: FloatT> {
    /// Return the core settings.
    fn core(&self) -> &CoreSettings<T>;

    /// Return the core settings (mutably).
    fn core_mut(&mut self) -> &mut CoreSettings<T>;
}
