#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Residuals;
use itertools::izip;

// ---------------
// Residuals type for default problem format
// ---------------

/// KKT residuals of the current iterate, implementing the
/// [`Residuals`](crate::solver::core::traits::Residuals) trait.
///
/// Holds r_b = Ax - b, r_c = Qx + Aᵀy + Gᵀz + c, r_h = Gx + s - h and
/// the complementarity vector r_μ = s ∘ z, along with the inner
/// products the convergence measures are built from.
pub struct DefaultResiduals<T> {
    pub rb: Vec<T>,
    pub rc: Vec<T>,
    pub rh: Vec<T>,
    pub rμ: Vec<T>,

    // 2-norms of the residuals at the last update
    pub rb_norm: T,
    pub rc_norm: T,
    pub rh_norm: T,

    // the same norms scaled by (1 + ‖b‖₂), (1 + ‖c‖₂), (1 + ‖h‖₂)
    pub rb_conv: T,
    pub rc_conv: T,
    pub rh_conv: T,

    // various inner products
    pub dot_sz: T,
    pub dot_xQx: T,
    pub dot_cx: T,
    pub dot_by: T,
    pub dot_hz: T,

    // the product Qx, kept for reuse within an update
    Qx: Vec<T>,

    // scratch for the optional direction residual check
    work_n: Vec<T>,
    work_m: Vec<T>,
    work_k: Vec<T>,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        Self {
            rb: vec![T::zero(); m],
            rc: vec![T::zero(); n],
            rh: vec![T::zero(); k],
            rμ: vec![T::zero(); k],
            rb_norm: T::one(),
            rc_norm: T::one(),
            rh_norm: T::one(),
            rb_conv: T::one(),
            rc_conv: T::one(),
            rh_conv: T::one(),
            dot_sz: T::zero(),
            dot_xQx: T::zero(),
            dot_cx: T::zero(),
            dot_by: T::zero(),
            dot_hz: T::zero(),
            Qx: vec![T::zero(); n],
            work_n: vec![T::zero(); n],
            work_m: vec![T::zero(); m],
            work_k: vec![T::zero(); k],
        }
    }
}

impl<T, M> Residuals<T, DefaultProblemData<T, M>, DefaultVariables<T>> for DefaultResiduals<T>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    fn update(&mut self, variables: &DefaultVariables<T>, data: &DefaultProblemData<T, M>) {
        let (x, y, z, s) = (&variables.x, &variables.y, &variables.z, &variables.s);

        // products appearing in both objectives
        data.Q.symv(&mut self.Qx, x, T::one(), T::zero());
        self.dot_xQx = self.Qx.dot(x);
        self.dot_cx = data.c.dot(x);
        self.dot_by = data.b.dot(y);
        self.dot_hz = data.h.dot(z);
        self.dot_sz = s.dot(z);

        // r_b = A x - b
        self.rb.scalarop_from(|b| -b, &data.b);
        data.A.gemv(&mut self.rb, MatrixShape::N, x, T::one(), T::one());
        self.rb_norm = self.rb.norm();

        // r_c = Q x + Aᵀ y + Gᵀ z + c
        self.rc.copy_from(&data.c);
        self.rc.axpby(T::one(), &self.Qx, T::one());
        data.A.gemv(&mut self.rc, MatrixShape::T, y, T::one(), T::one());
        data.G.gemv(&mut self.rc, MatrixShape::T, z, T::one(), T::one());
        self.rc_norm = self.rc.norm();

        // r_h = G x + s - h
        self.rh.waxpby(T::one(), s, -T::one(), &data.h);
        data.G.gemv(&mut self.rh, MatrixShape::N, x, T::one(), T::one());
        self.rh_norm = self.rh.norm();

        self.rb_conv = self.rb_norm / (T::one() + data.norm_b);
        self.rc_conv = self.rc_norm / (T::one() + data.norm_c);
        self.rh_conv = self.rh_norm / (T::one() + data.norm_h);
    }

    fn set_affine_complementarity(&mut self, variables: &DefaultVariables<T>) {
        self.rμ.copy_from(&variables.s);
        self.rμ.hadamard(&variables.z);
    }

    fn set_combined_complementarity(
        &mut self,
        σμ: T,
        step_aff: &DefaultVariables<T>,
        mehrotra: bool,
    ) {
        self.rμ.translate(-σμ);
        if mehrotra {
            // r_μ += Δs_aff ∘ Δz_aff
            for (r, &ds, &dz) in izip!(self.rμ.iter_mut(), &step_aff.s, &step_aff.z) {
                *r += ds * dz;
            }
        }
    }

    fn direction_errors(
        &mut self,
        data: &DefaultProblemData<T, M>,
        step: &DefaultVariables<T>,
    ) -> (T, T, T) {
        // || r_b + A Δx ||_2 / (1 + || r_b ||_2)
        self.work_m.copy_from(&self.rb);
        data.A
            .gemv(&mut self.work_m, MatrixShape::N, &step.x, T::one(), T::one());
        let dx_error = self.work_m.norm() / (T::one() + self.rb_norm);

        // || r_c + Q Δx + Aᵀ Δy + Gᵀ Δz ||_2 / (1 + || r_c ||_2)
        self.work_n.copy_from(&self.rc);
        data.Q.symv(&mut self.work_n, &step.x, T::one(), T::one());
        data.A
            .gemv(&mut self.work_n, MatrixShape::T, &step.y, T::one(), T::one());
        data.G
            .gemv(&mut self.work_n, MatrixShape::T, &step.z, T::one(), T::one());
        let dy_error = self.work_n.norm() / (T::one() + self.rc_norm);

        // || r_h + G Δx + Δs ||_2 / (1 + || r_h ||_2)
        self.work_k.waxpby(T::one(), &self.rh, T::one(), &step.s);
        data.G
            .gemv(&mut self.work_k, MatrixShape::N, &step.x, T::one(), T::one());
        let dz_error = self.work_k.norm() / (T::one() + self.rh_norm);

        (dx_error, dy_error, dz_error)
    }
}

#[test]
fn test_residuals_at_feasible_point() {
    use crate::solver::core::traits::Residuals as _;

    // min ½‖x‖² - x₁ s.t. x ≥ 0, with optimum x = e₁
    let Q = Matrix::identity(2);
    let A = Matrix::zeros((0, 2));
    let G = Matrix::new_from_slice((2, 2), &[-1., 0., 0., -1.]);
    let b: [f64; 0] = [];
    let c = [-1., 0.];
    let h = [0., 0.];

    let data = DefaultProblemData::new(&Q, &A, &G, &b, &c, &h);
    let mut variables = DefaultVariables::<f64>::new(2, 0, 2);
    variables.x.copy_from_slice(&[1., 0.]);
    variables.s.copy_from_slice(&[1., 0.]);
    variables.z.copy_from_slice(&[0., 0.]);

    let mut residuals = DefaultResiduals::new(2, 0, 2);
    residuals.update(&variables, &data);

    // primal feasible and stationary in x₁; z = 0 makes r_c = Qx + c
    assert!(residuals.rh_norm < 1e-15);
    assert!(residuals.rc_norm < 1e-15);
    assert_eq!(residuals.dot_xQx, 1.0);
    assert_eq!(residuals.dot_cx, -1.0);
}
