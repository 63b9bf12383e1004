use crate::algebra::*;
use crate::solver::core::traits::Variables;
use itertools::izip;

// ---------------
// Variables type for default problem format
// ---------------

/// The primal-dual iterate (x, y, z, s), implementing the
/// [`Variables`](crate::solver::core::traits::Variables) trait.
///
/// The cone variables s and z are strictly positive at the start of
/// every outer iteration; the driver treats any violation as fatal.
pub struct DefaultVariables<T> {
    /// primal variables
    pub x: Vec<T>,
    /// equality duals
    pub y: Vec<T>,
    /// conic duals, strictly positive
    pub z: Vec<T>,
    /// conic slacks, strictly positive
    pub s: Vec<T>,
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            z: vec![T::zero(); k],
            s: vec![T::zero(); k],
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DefaultVariables<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x: {:?}\ny: {:?}\nz: {:?}\ns: {:?}\n",
            self.x, self.y, self.z, self.s
        )
    }
}

impl<T> Variables<T> for DefaultVariables<T>
where
    T: FloatT,
{
    fn count_outside_cone(&self) -> (usize, usize) {
        let s_count = self.s.iter().filter(|&&v| v <= T::zero()).count();
        let z_count = self.z.iter().filter(|&&v| v <= T::zero()).count();
        (s_count, z_count)
    }

    fn calc_mu(&self) -> T {
        let k = self.s.len();
        if k == 0 {
            return T::zero();
        }
        self.s.dot(&self.z) / T::from_usize(k).unwrap()
    }

    fn max_step_lengths(&self, step: &Self, cap: T) -> (T, T) {
        let α_pri = max_step_in_orthant(&self.s, &step.s, cap);
        let α_dual = max_step_in_orthant(&self.z, &step.z, cap);
        (α_pri, α_dual)
    }

    fn mu_affine(&self, step: &Self, α_pri: T, α_dual: T) -> T {
        let k = self.s.len();
        if k == 0 {
            return T::zero();
        }
        let total = izip!(&self.s, &step.s, &self.z, &step.z)
            .fold(T::zero(), |acc, (&s, &ds, &z, &dz)| {
                acc + (s + α_pri * ds) * (z + α_dual * dz)
            });
        total / T::from_usize(k).unwrap()
    }

    fn add_step(&mut self, step: &Self, α_pri: T, α_dual: T) {
        self.x.axpby(α_pri, &step.x, T::one());
        self.s.axpby(α_pri, &step.s, T::one());
        self.y.axpby(α_dual, &step.y, T::one());
        self.z.axpby(α_dual, &step.z, T::one());
    }

    fn shift_to_interior(&mut self, margin: T, primal: bool, dual: bool) {
        if primal {
            shift_into_orthant(&mut self.s, margin);
        }
        if dual {
            shift_into_orthant(&mut self.z, margin);
        }
    }
}

// largest α in [0, cap] keeping v + α·dv in the nonnegative orthant
fn max_step_in_orthant<T: FloatT>(v: &[T], dv: &[T], cap: T) -> T {
    let mut α = cap;
    for (&vi, &dvi) in std::iter::zip(v, dv) {
        if dvi < T::zero() {
            α = T::min(α, -vi / dvi);
        }
    }
    α
}

// uniform bump lifting every entry to at least `margin`
fn shift_into_orthant<T: FloatT>(v: &mut [T], margin: T) {
    if v.is_empty() {
        return;
    }
    let vmin = v.minimum();
    if vmin < margin {
        v.translate(margin - vmin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_step_lengths() {
        let mut v = DefaultVariables::<f64>::new(0, 0, 2);
        v.s.copy_from_slice(&[1., 2.]);
        v.z.copy_from_slice(&[1., 1.]);

        let mut step = DefaultVariables::<f64>::new(0, 0, 2);
        step.s.copy_from_slice(&[-2., 1.]);
        step.z.copy_from_slice(&[1., 1.]);

        let (α_pri, α_dual) = v.max_step_lengths(&step, 1.0);
        assert_eq!(α_pri, 0.5);
        assert_eq!(α_dual, 1.0);

        // the cap bounds steps that never hit the boundary
        let (_, α_dual) = v.max_step_lengths(&step, 10.0);
        assert_eq!(α_dual, 10.0);
    }

    #[test]
    fn test_shift_to_interior() {
        let mut v = DefaultVariables::<f64>::new(0, 0, 3);
        v.s.copy_from_slice(&[-1., 0.5, 2.]);
        v.z.copy_from_slice(&[3., 4., 5.]);

        v.shift_to_interior(1.0, true, true);
        assert_eq!(v.s, vec![1., 2.5, 4.]);
        // z was already interior with margin 1
        assert_eq!(v.z, vec![3., 4., 5.]);

        let (s_count, z_count) = v.count_outside_cone();
        assert_eq!((s_count, z_count), (0, 0));
    }

    #[test]
    fn test_mu_and_mu_affine() {
        let mut v = DefaultVariables::<f64>::new(0, 0, 2);
        v.s.copy_from_slice(&[1., 2.]);
        v.z.copy_from_slice(&[3., 4.]);
        assert_eq!(v.calc_mu(), 5.5);

        let mut step = DefaultVariables::<f64>::new(0, 0, 2);
        step.s.copy_from_slice(&[-1., -1.]);
        step.z.copy_from_slice(&[-1., -2.]);

        // a full step lands on the boundary with zero complementarity
        assert_eq!(v.mu_affine(&step, 1.0, 1.0), 1.0);
    }
}
