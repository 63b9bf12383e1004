#![allow(non_snake_case)]

use quadrant::{algebra::*, solver::*};

#[test]
fn test_primal_infeasible_lp() {
    // x₁ + x₂ = -1 with x ≥ 0 has no feasible point; the solver must
    // not claim success
    let Q = Matrix::zeros((2, 2));
    let A = Matrix::new_from_slice((1, 2), &[1., 1.]);
    let mut G = Matrix::<f64>::zeros((2, 2));
    G[(0, 0)] = -1.0;
    G[(1, 1)] = -1.0;
    let b = [-1.];
    let c = [1., 1.];
    let h = [0., 0.];

    let mut solver = DenseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    let result = solver.solve();

    match result {
        Err(SolverError::ExceededIterations(_))
        | Err(SolverError::Stalled)
        | Err(SolverError::SolveFailure) => {}
        other => panic!("expected a terminal failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(solver.solution.status, SolverStatus::Unsolved);
}

#[test]
fn test_primal_infeasible_sparse() {
    let Q = CscMatrix::zeros((2, 2));
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
    let mut G = CscMatrix::identity(2);
    G.scale(-1.0);
    let b = [-1.];
    let c = [1., 1.];
    let h = [0., 0.];

    let mut solver = SparseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    assert!(solver.solve().is_err());
}
