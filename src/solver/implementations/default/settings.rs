use crate::algebra::*;
use crate::solver::core::traits::Settings;
use derive_builder::Builder;

/// Policy producing the centrality parameter σ from
/// (μ, μ_aff, α_pri_aff, α_dual_aff).
pub type CentralityRule<T> = fn(T, T, T, T) -> T;

/// Mehrotra's centrality heuristic, σ = (μ_aff/μ)³ clipped to [0,1].
/// This is the default [`centrality_rule`](DefaultSettings::centrality_rule).
pub fn mehrotra_centrality<T: FloatT>(μ: T, μ_aff: T, _α_pri_aff: T, _α_dual_aff: T) -> T {
    if μ == T::zero() {
        return T::zero();
    }
    T::powi(μ_aff / μ, 3).clip(T::zero(), T::one())
}

/// Iterative refinement control for the KKT solves.
#[derive(Debug, Clone)]
pub struct SolveControl<T: FloatT> {
    /// relative residual required of a refined solve
    pub rel_tol: T,
    /// maximum number of refinement sweeps
    pub max_refine_iters: u32,
    /// print per-sweep refinement progress
    pub progress: bool,
}

impl<T: FloatT> Default for SolveControl<T> {
    fn default() -> Self {
        Self {
            rel_tol: T::epsilon().sqrt(),
            max_refine_iters: 10,
            progress: false,
        }
    }
}

/// Standard-form solver settings, implementing the
/// [`Settings`](crate::solver::core::traits::Settings) trait.
///
/// Defaults are produced with
/// `DefaultSettings::default()` or through `DefaultSettingsBuilder`.

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DefaultSettings<T: FloatT> {
    /// treat the supplied (x, s) as a warm start.  Managed by the
    /// solver's `warm_start_primal` method
    #[builder(default = "false")]
    pub primal_init: bool,

    /// treat the supplied (y, z) as a warm start
    #[builder(default = "false")]
    pub dual_init: bool,

    /// interior margin targeted when lifting s and z into the
    /// positive orthant during initialization
    #[builder(default = "T::one()")]
    pub standard_init_shift: T,

    /// apply Ruiz equilibration to the problem data before the
    /// iteration, undoing the scaling at exit
    #[builder(default = "true")]
    pub outer_equil: bool,

    /// upper bound on outer iterations
    #[builder(default = "100")]
    pub max_iters: u32,

    /// tolerance on the scaled primal, dual and conic residuals
    #[builder(default = "(1e-8).as_T()")]
    pub infeasibility_tol: T,

    /// tolerance on the relative complementarity gap
    #[builder(default = "(1e-8).as_T()")]
    pub relative_complementarity_gap_tol: T,

    /// tolerance on the relative objective gap
    #[builder(default = "(1e-8).as_T()")]
    pub relative_objective_gap_tol: T,

    /// once tolerances are met, terminate unless the DIMACS error is
    /// still decreasing by at least this ratio per iteration
    #[builder(default = "(0.99).as_T()")]
    pub min_dimacs_decrease_ratio: T,

    /// fraction of the distance to the cone boundary permitted in a step
    #[builder(default = "(0.99).as_T()")]
    pub max_step_ratio: T,

    /// constrain the primal and dual step lengths to their minimum
    #[builder(default = "false")]
    pub force_same_step: bool,

    /// apply the Δs_aff ∘ Δz_aff second-order correction to the
    /// combined step
    #[builder(default = "true")]
    pub mehrotra: bool,

    /// policy producing the centrality parameter σ
    #[builder(default = "mehrotra_centrality::<T>")]
    pub centrality_rule: CentralityRule<T>,

    /// static (small) diagonal regularization of the KKT x block
    #[builder(default = "T::epsilon().powf((0.8).as_T())")]
    pub x_reg_small: T,

    /// static (small) diagonal regularization of the KKT y block
    #[builder(default = "T::epsilon().powf((0.8).as_T())")]
    pub y_reg_small: T,

    /// static (small) diagonal regularization of the KKT z block
    #[builder(default = "T::epsilon().powf((0.8).as_T())")]
    pub z_reg_small: T,

    /// dynamic (large) regularization of the x block, scaled by the
    /// two-norm estimate of the problem data
    #[builder(default = "T::epsilon().powf((0.6).as_T())")]
    pub x_reg_large: T,

    /// dynamic (large) regularization of the y block
    #[builder(default = "T::epsilon().powf((0.6).as_T())")]
    pub y_reg_large: T,

    /// dynamic (large) regularization of the z block
    #[builder(default = "T::epsilon().powf((0.6).as_T())")]
    pub z_reg_large: T,

    /// iterative refinement control for the KKT solves
    #[builder(default = "SolveControl::default()")]
    pub solve: SolveControl<T>,

    /// attempt a refined solve against the unregularized KKT system
    /// before falling back to regularized refinement
    #[builder(default = "true")]
    pub two_stage: bool,

    /// basis size for the power-iteration two-norm estimates of Q, A, G
    #[builder(default = "15")]
    pub two_norm_krylov_basis_size: usize,

    /// per-iteration progress printing
    #[builder(default = "false")]
    pub print: bool,

    /// recompute and report the KKT residuals of each affine direction.
    /// Diagnostic only; requires `print`
    #[builder(default = "false")]
    pub check_residuals: bool,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    //NB: CoreSettings is typedef'd to DefaultSettings
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), String> {
        if let Some(ratio) = self.max_step_ratio {
            if ratio <= T::zero() || ratio > T::one() {
                return Err(format!("max_step_ratio must be in (0,1]: {}", ratio));
            }
        }
        if let Some(shift) = self.standard_init_shift {
            if shift <= T::zero() {
                return Err(format!("standard_init_shift must be positive: {}", shift));
            }
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    DefaultSettingsBuilder::<f64>::default().build().unwrap();

    // fail on a step ratio outside (0,1]
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_step_ratio(1.5)
        .build()
        .is_err());

    // fail on a nonpositive init shift
    assert!(DefaultSettingsBuilder::<f64>::default()
        .standard_init_shift(0.0)
        .build()
        .is_err());
}

#[test]
fn test_mehrotra_centrality_clips() {
    assert_eq!(mehrotra_centrality(1.0, 0.5, 1.0, 1.0), 0.125);
    assert_eq!(mehrotra_centrality(0.5, 1.0, 1.0, 1.0), 1.0);
    assert_eq!(mehrotra_centrality(0.0, 1.0, 1.0, 1.0), 0.0);
}
