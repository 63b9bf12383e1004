#![allow(non_snake_case)]

use quadrant::{algebra::*, solver::*};

// a feasible 2-variable LP with badly scaled equality rows:
// A = diag(1, 1e8), b = (1, 1e8), x ≥ 0, optimum x = (1, 1)
fn ill_conditioned_lp(outer_equil: bool) -> DenseSolver<f64> {
    let Q = Matrix::zeros((2, 2));
    let mut A = Matrix::<f64>::zeros((2, 2));
    A[(0, 0)] = 1.0;
    A[(1, 1)] = 1e8;
    let mut G = Matrix::<f64>::zeros((2, 2));
    G[(0, 0)] = -1.0;
    G[(1, 1)] = -1.0;
    let b = [1., 1e8];
    let c = [1., 1.];
    let h = [0., 0.];

    let settings = DefaultSettingsBuilder::default()
        .outer_equil(outer_equil)
        .build()
        .unwrap();

    DenseSolver::new(&Q, &A, &G, &b, &c, &h, settings)
}

#[test]
fn test_ill_conditioned_with_equilibration() {
    let mut solver = ill_conditioned_lp(true);
    solver.solve().unwrap();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.iterations <= 30);
    assert!(solver.solution.x.norm_inf_diff(&[1., 1.]) <= 1e-5);
}

#[test]
fn test_ill_conditioned_without_equilibration() {
    // without scaling, either convergence within budget or a solver
    // failure is acceptable, but the outcome must be reproducible
    let run = || {
        let mut solver = ill_conditioned_lp(false);
        let result = solver.solve();
        (result.is_ok(), solver.solution.x.clone())
    };

    let (ok1, x1) = run();
    let (ok2, x2) = run();

    assert_eq!(ok1, ok2);
    assert_eq!(x1, x2);

    if ok1 {
        assert!(x1.norm_inf_diff(&[1., 1.]) <= 1e-4);
    }
}

#[test]
fn test_solution_unscaled_to_original_problem() {
    // the returned iterate must satisfy the ORIGINAL constraints, not
    // the equilibrated ones
    let mut solver = ill_conditioned_lp(true);
    solver.solve().unwrap();

    let x = &solver.solution.x;
    assert!((x[0] - 1.0).abs() <= 1e-5);
    assert!((1e8 * x[1] - 1e8).abs() <= 1e8 * 1e-5);

    // s = h - Gx = x for this problem
    for i in 0..2 {
        assert!((solver.solution.s[i] - x[i]).abs() <= 1e-5);
    }
}
