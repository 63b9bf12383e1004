use thiserror::Error;

/// Terminal conditions surfaced by the interior-point driver.
///
/// A factorization or refinement failure occurring after the convergence
/// tolerances have already been met is converted into a successful
/// termination rather than surfacing as [`SolveFailure`](SolverError::SolveFailure).
#[derive(Error, Debug)]
pub enum SolverError {
    /// The iterate left the cone: s or z acquired a nonpositive entry.
    /// This indicates a logic error and is always fatal.
    #[error("{s_count} entries of s and {z_count} entries of z were nonpositive")]
    ConeViolation { s_count: usize, z_count: usize },

    /// The KKT factorization or its iterative refinement failed to reach
    /// the requested tolerance before the iterate converged.
    #[error("could not achieve tolerances: the KKT solve failed")]
    SolveFailure,

    /// Both step lengths collapsed to zero before tolerances were met.
    #[error("could not achieve tolerances: the iteration stalled")]
    Stalled,

    /// The iteration budget ran out without meeting tolerances.
    #[error("maximum number of iterations ({0}) exceeded without achieving tolerances")]
    ExceededIterations(u32),
}
