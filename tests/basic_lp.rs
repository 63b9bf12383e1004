#![allow(non_snake_case)]

use quadrant::{algebra::*, solver::*};

// min cᵀx  s.t.  Σx = 1, x ≥ 0 with c = (1, 2, 3); optimum x = e₁
fn simplex_lp_data() -> (
    CscMatrix<f64>,
    CscMatrix<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
) {
    let Q = CscMatrix::zeros((3, 3));
    let A = CscMatrix::new(1, 3, vec![0, 1, 2, 3], vec![0, 0, 0], vec![1., 1., 1.]);
    let mut G = CscMatrix::identity(3);
    G.scale(-1.0);
    let b = vec![1.];
    let c = vec![1., 2., 3.];
    let h = vec![0., 0., 0.];
    (Q, A, G, b, c, h)
}

#[test]
fn test_lp_simplex_sparse() {
    let (Q, A, G, b, c, h) = simplex_lp_data();

    let mut solver = SparseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    solver.solve().unwrap();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.norm_inf_diff(&[1., 0., 0.]) <= 1e-6);
    assert!((solver.solution.prim_obj - 1.0).abs() <= 1e-6);

    // complementarity at the returned point
    let comp = solver.solution.s.dot(&solver.solution.z) / 3.0;
    assert!(comp <= 1e-7);
}

#[test]
fn test_lp_simplex_dense() {
    let Q = Matrix::zeros((3, 3));
    let A = Matrix::new_from_slice((1, 3), &[1., 1., 1.]);
    let mut G = Matrix::<f64>::zeros((3, 3));
    for i in 0..3 {
        G[(i, i)] = -1.0;
    }
    let b = [1.];
    let c = [1., 2., 3.];
    let h = [0., 0., 0.];

    let mut solver = DenseSolver::new(&Q, &A, &G, &b, &c, &h, DefaultSettings::default());
    solver.solve().unwrap();

    assert!(solver.solution.x.norm_inf_diff(&[1., 0., 0.]) <= 1e-6);

    // the equality dual prices the cheapest vertex
    assert!((solver.solution.y[0] + 1.0).abs() <= 1e-5);
    assert!(solver.solution.z.norm_inf_diff(&[0., 1., 2.]) <= 1e-5);
}
