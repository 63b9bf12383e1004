#![allow(non_snake_case)]

use quadrant::{algebra::*, solver::*};

fn diagonal_qp() -> DenseSolver<f64> {
    let Q = Matrix::identity(3);
    let A = Matrix::zeros((0, 3));
    let mut G = Matrix::<f64>::zeros((3, 3));
    for i in 0..3 {
        G[(i, i)] = -1.0;
    }
    let b: [f64; 0] = [];
    let c = [-1., -2., -3.];
    let h = [0., 0., 0.];

    DenseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default())
}

#[test]
fn test_warm_start_with_converged_iterate() {
    // first solve from a cold start
    let mut cold = diagonal_qp();
    cold.solve().unwrap();
    let sol = &cold.solution;

    // restart from the converged iterate on both sides
    let mut warm = diagonal_qp();
    warm.warm_start_primal(&sol.x, &sol.s);
    warm.warm_start_dual(&sol.y, &sol.z);
    warm.solve().unwrap();

    assert_eq!(warm.solution.status, SolverStatus::Solved);
    assert!(warm.solution.iterations <= 2);

    // the iterate should be unchanged to well within tolerance
    let tol = 1e-7;
    assert!(warm.solution.x.norm_inf_diff(&sol.x) <= tol);
    assert!(warm.solution.s.norm_inf_diff(&sol.s) <= tol);
    assert!(warm.solution.z.norm_inf_diff(&sol.z) <= tol);
}

#[test]
fn test_warm_start_primal_only() {
    let mut cold = diagonal_qp();
    cold.solve().unwrap();
    let (x, s) = (cold.solution.x.clone(), cold.solution.s.clone());

    let mut warm = diagonal_qp();
    warm.warm_start_primal(&x, &s);
    warm.solve().unwrap();

    assert_eq!(warm.solution.status, SolverStatus::Solved);
    assert!(warm.solution.x.norm_inf_diff(&x) <= 1e-6);
}

#[test]
fn test_warm_start_interior_point() {
    // a strictly interior but non-optimal warm start also converges
    let mut solver = diagonal_qp();
    solver.warm_start_primal(&[1., 1., 1.], &[1., 1., 1.]);
    solver.warm_start_dual(&[], &[0.5, 0.5, 0.5]);
    solver.solve().unwrap();

    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
}
