#![allow(non_snake_case)]

use quadrant::{algebra::*, solver::*};

// min ½‖x‖² - x₁ - 2x₂ - 3x₃  s.t.  x ≥ 0,
// with known optimum x = s = (1, 2, 3), z = 0 and objective -7
fn diagonal_qp_dense() -> DenseSolver<f64> {
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
fn test_qp_diagonal_dense() {
    let mut solver = diagonal_qp_dense();
    solver.solve().unwrap();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
    assert!(solver.solution.s.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
    assert!(solver.solution.z.norm_inf() <= 1e-6);
    assert!((solver.solution.prim_obj - (-7.0)).abs() <= 1e-6);
    assert!((solver.solution.dual_obj - (-7.0)).abs() <= 1e-6);
}

#[test]
fn test_qp_diagonal_sparse() {
    let Q = CscMatrix::identity(3);
    let A = CscMatrix::zeros((0, 3));
    let mut G = CscMatrix::identity(3);
    G.scale(-1.0);
    let b: [f64; 0] = [];
    let c = [-1., -2., -3.];
    let h = [0., 0., 0.];

    let mut solver = SparseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    solver.solve().unwrap();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
    assert!((solver.solution.prim_obj - (-7.0)).abs() <= 1e-6);
}

#[test]
fn test_qp_eq_constrained() {
    // min ½‖x‖²  s.t.  x₁ + x₂ = 2, x ≥ 0, optimum x = (1, 1)
    let Q = Matrix::identity(2);
    let A = Matrix::new_from_slice((1, 2), &[1., 1.]);
    let mut G = Matrix::<f64>::zeros((2, 2));
    G[(0, 0)] = -1.0;
    G[(1, 1)] = -1.0;
    let b = [2.];
    let c = [0., 0.];
    let h = [0., 0.];

    let mut solver = DenseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    solver.solve().unwrap();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf_diff(&[1., 1.]) <= 1e-6);
    assert!((solver.solution.prim_obj - 1.0).abs() <= 1e-6);
}

#[test]
fn test_qp_force_same_step_and_no_mehrotra() {
    // exercising the policy switches should not change the optimum
    let settings = DefaultSettingsBuilder::default()
        .force_same_step(true)
        .mehrotra(false)
        .build()
        .unwrap();

    let mut solver = diagonal_qp_dense();
    solver.settings = settings;
    solver.solve().unwrap();

    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
}

#[test]
fn test_qp_diagnostic_output() {
    // exercise the progress printing and the residual self-check; the
    // diagnostics must not perturb the result
    let settings = DefaultSettingsBuilder::default()
        .print(true)
        .check_residuals(true)
        .build()
        .unwrap();

    let mut solver = diagonal_qp_dense();
    solver.settings = settings;
    solver.solve().unwrap();

    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-6);
}

#[test]
fn test_qp_centrality_rule_override() {
    // a pure centering rule still converges, if more slowly
    fn always_center(_mu: f64, _mu_aff: f64, _ap: f64, _ad: f64) -> f64 {
        0.5
    }

    let settings = DefaultSettingsBuilder::default()
        .centrality_rule(always_center as CentralityRule<f64>)
        .build()
        .unwrap();

    let mut solver = diagonal_qp_dense();
    solver.settings = settings;
    solver.solve().unwrap();

    assert!(solver.solution.x.norm_inf_diff(&[1., 2., 3.]) <= 1e-5);
}
