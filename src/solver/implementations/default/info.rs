use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::Info, SolverError, SolverStatus};

// ---------------
// Info type for default problem format
// ---------------

/// Convergence state and per-iteration scalars, implementing the
/// [`Info`](crate::solver::core::traits::Info) trait.
pub struct DefaultInfo<T> {
    pub μ: T,
    pub σ: T,
    pub step_length_pri: T,
    pub step_length_dual: T,
    pub iterations: u32,

    pub prim_obj: T,
    pub dual_obj: T,
    pub rel_obj_gap: T,
    pub rel_comp_gap: T,
    pub max_rel_gap: T,
    pub infeas_error: T,
    pub dimacs_error: T,
    pub dimacs_error_prev: T,

    // scaled residual norms from the last update
    pub rb_conv: T,
    pub rc_conv: T,
    pub rh_conv: T,

    pub status: SolverStatus,

    pub(crate) met_tol: bool,

    // iterate norms, retained for progress printing
    pub(crate) norm_x: T,
    pub(crate) norm_y: T,
    pub(crate) norm_z: T,
    pub(crate) norm_s: T,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        let mut out = Self {
            μ: T::zero(),
            σ: T::zero(),
            step_length_pri: T::zero(),
            step_length_dual: T::zero(),
            iterations: 0,
            prim_obj: T::zero(),
            dual_obj: T::zero(),
            rel_obj_gap: T::one(),
            rel_comp_gap: T::one(),
            max_rel_gap: T::one(),
            infeas_error: T::one(),
            dimacs_error: T::one(),
            dimacs_error_prev: T::one(),
            rb_conv: T::one(),
            rc_conv: T::one(),
            rh_conv: T::one(),
            status: SolverStatus::Unsolved,
            met_tol: false,
            norm_x: T::zero(),
            norm_y: T::zero(),
            norm_z: T::zero(),
            norm_s: T::zero(),
        };
        out.reset_state();
        out
    }

    fn reset_state(&mut self) {
        self.iterations = 0;
        self.infeas_error = T::one();
        self.dimacs_error = T::one();
        self.dimacs_error_prev = T::one();
        self.met_tol = false;
        self.status = SolverStatus::Unsolved;
    }
}

impl<T> Default for DefaultInfo<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

// These two gap measures are defined on the pair of objective values
// and the duality product sᵀz.  The complementarity gap degrades to a
// 200% error when the objective signs are inadmissible.

pub(crate) fn relative_objective_gap<T: FloatT>(prim_obj: T, dual_obj: T) -> T {
    T::abs(prim_obj - dual_obj) / (T::max(T::abs(prim_obj), T::abs(dual_obj)) + T::one())
}

pub(crate) fn relative_complementarity_gap<T: FloatT>(prim_obj: T, dual_obj: T, dot_sz: T) -> T {
    if prim_obj < T::zero() {
        dot_sz / -prim_obj
    } else if dual_obj > T::zero() {
        dot_sz / dual_obj
    } else {
        (2.0).as_T()
    }
}

impl<T> Info<T, DefaultVariables<T>, DefaultResiduals<T>, DefaultSettings<T>> for DefaultInfo<T>
where
    T: FloatT,
{
    fn reset(&mut self) {
        self.reset_state();
    }

    fn update(
        &mut self,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        μ: T,
        iter: u32,
    ) {
        self.μ = μ;
        self.iterations = iter;

        // objectives and relative gaps
        let half: T = (0.5).as_T();
        self.prim_obj = half * residuals.dot_xQx + residuals.dot_cx;
        self.dual_obj = -half * residuals.dot_xQx - residuals.dot_by - residuals.dot_hz;
        self.rel_obj_gap = relative_objective_gap(self.prim_obj, self.dual_obj);
        self.rel_comp_gap =
            relative_complementarity_gap(self.prim_obj, self.dual_obj, residuals.dot_sz);
        self.max_rel_gap = T::max(self.rel_obj_gap, self.rel_comp_gap);

        // scaled residual norms, precomputed alongside the residuals
        self.rb_conv = residuals.rb_conv;
        self.rc_conv = residuals.rc_conv;
        self.rh_conv = residuals.rh_conv;

        self.dimacs_error_prev = self.dimacs_error;
        self.infeas_error = T::max(T::max(self.rb_conv, self.rc_conv), self.rh_conv);
        self.dimacs_error = T::max(self.infeas_error, self.max_rel_gap);

        self.norm_x = variables.x.norm();
        self.norm_y = variables.y.norm();
        self.norm_z = variables.z.norm();
        self.norm_s = variables.s.norm();
    }

    fn check_termination(
        &mut self,
        settings: &DefaultSettings<T>,
        iter: u32,
    ) -> Result<bool, SolverError> {
        self.met_tol = self.infeas_error <= settings.infeasibility_tol
            && self.rel_comp_gap <= settings.relative_complementarity_gap_tol
            && self.rel_obj_gap <= settings.relative_objective_gap_tol;

        if self.met_tol {
            if self.dimacs_error >= settings.min_dimacs_decrease_ratio * self.dimacs_error_prev {
                // tolerances are met and the last iteration made no
                // significant progress
                self.status = SolverStatus::Solved;
                return Ok(true);
            } else if iter == settings.max_iters {
                // out of iterations, but successful regardless
                self.status = SolverStatus::Solved;
                return Ok(true);
            }
        } else if iter == settings.max_iters {
            return Err(SolverError::ExceededIterations(settings.max_iters));
        }
        Ok(false)
    }

    fn met_tolerances(&self) -> bool {
        self.met_tol
    }

    fn save_scalars(&mut self, μ: T, σ: T, α_pri: T, α_dual: T, iter: u32) {
        self.μ = μ;
        self.σ = σ;
        self.step_length_pri = α_pri;
        self.step_length_dual = α_dual;
        self.iterations = iter;
    }

    fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }

    fn print_status(&self, settings: &DefaultSettings<T>) {
        self.print_status_impl(settings);
    }
    fn print_centrality(
        &self,
        settings: &DefaultSettings<T>,
        α_pri_aff: T,
        α_dual_aff: T,
        μ_aff: T,
        μ: T,
        σ: T,
    ) {
        self.print_centrality_impl(settings, α_pri_aff, α_dual_aff, μ_aff, μ, σ);
    }
    fn print_step_lengths(&self, settings: &DefaultSettings<T>, α_pri: T, α_dual: T) {
        self.print_step_lengths_impl(settings, α_pri, α_dual);
    }
    fn print_direction_errors(&self, settings: &DefaultSettings<T>, errors: (T, T, T)) {
        self.print_direction_errors_impl(settings, errors);
    }
    fn print_footer(&self, settings: &DefaultSettings<T>) {
        self.print_footer_impl(settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_gaps() {
        // matching objectives of either sign give a zero gap
        assert_eq!(relative_objective_gap(-7.0, -7.0), 0.0);
        assert_eq!(relative_objective_gap(3.0, 1.0), 0.5);

        assert_eq!(relative_complementarity_gap(-2.0, -2.0, 1.0), 0.5);
        assert_eq!(relative_complementarity_gap(4.0, 2.0, 1.0), 0.5);
        // inadmissible signs: 200% penalty
        assert_eq!(relative_complementarity_gap(1.0, -1.0, 1.0), 2.0);
    }
}
