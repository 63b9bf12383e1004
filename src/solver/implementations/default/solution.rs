use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::Solution, SolverStatus};
use std::iter::zip;

// ---------------
// Solution type for default problem format
// ---------------

/// The final iterate unscaled back to the original problem,
/// implementing the [`Solution`](crate::solver::core::traits::Solution) trait.
pub struct DefaultSolution<T> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub z: Vec<T>,
    pub s: Vec<T>,

    pub prim_obj: T,
    pub dual_obj: T,
    pub iterations: u32,
    pub status: SolverStatus,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            z: vec![T::zero(); k],
            s: vec![T::zero(); k],
            prim_obj: T::nan(),
            dual_obj: T::nan(),
            iterations: 0,
            status: SolverStatus::Unsolved,
        }
    }
}

impl<T, M> Solution<T, DefaultProblemData<T, M>, DefaultVariables<T>, DefaultInfo<T>>
    for DefaultSolution<T>
where
    T: FloatT,
    M: ProblemMatrix<T>,
{
    fn finalize(
        &mut self,
        data: &DefaultProblemData<T, M>,
        variables: &DefaultVariables<T>,
        info: &DefaultInfo<T>,
    ) {
        let equil = &data.equilibration;

        // invert the equilibration transform:
        // x ← x / d_col, y ← y / d_a, z ← z / d_g, s ← d_g ∘ s
        for (out, (&v, &d)) in zip(&mut self.x, zip(&variables.x, &equil.d_col)) {
            *out = v / d;
        }
        for (out, (&v, &d)) in zip(&mut self.y, zip(&variables.y, &equil.d_a)) {
            *out = v / d;
        }
        for (out, (&v, &d)) in zip(&mut self.z, zip(&variables.z, &equil.d_g)) {
            *out = v / d;
        }
        for (out, (&v, &d)) in zip(&mut self.s, zip(&variables.s, &equil.d_g)) {
            *out = v * d;
        }

        // objective values are invariant under the scaling
        self.prim_obj = info.prim_obj;
        self.dual_obj = info.dual_obj;
        self.iterations = info.iterations;
        self.status = info.status;
    }
}
