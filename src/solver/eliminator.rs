//! Fourier-Motzkin elimination over the rationals.
//!
//! Decides whether a system of linear inequalities has a real-valued
//! solution by projecting out one variable at a time. This is the classical
//! real relaxation: a feasible answer does not guarantee an integer
//! solution, so the dependence tester built on top of it over-approximates.
//! Downstream legality checks rely on that conservative behavior.

use crate::solver::matrix::ConstraintMatrix;
use num_rational::Rational64;
use num_traits::{Signed, Zero};

/// Outcome of looking at a single row in isolation.
enum RowStatus {
    /// All coefficients zero, negative constant: `0 <= k < 0`
    Inconsistent,
    /// All coefficients zero, non-negative constant: always satisfied
    Trivial,
    /// Mentions at least one variable
    Keep,
}

fn classify(row: &[Rational64]) -> RowStatus {
    let (coeffs, constant) = row.split_at(row.len() - 1);
    if coeffs.iter().any(|c| !c.is_zero()) {
        RowStatus::Keep
    } else if constant[0].is_negative() {
        RowStatus::Inconsistent
    } else {
        RowStatus::Trivial
    }
}

/// Divide a row by the absolute value of its entry in `col`, so that the
/// entry becomes +1 or -1.
fn normalize(mut row: Vec<Rational64>, col: usize) -> Vec<Rational64> {
    let pivot = row[col].abs();
    for entry in &mut row {
        *entry /= pivot;
    }
    row
}

fn add_rows(a: &[Rational64], b: &[Rational64]) -> Vec<Rational64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Whether the inequality system has a real-valued solution.
///
/// The caller's matrix is never modified; elimination runs on a private
/// copy. An empty matrix is vacuously feasible.
pub fn has_real_solution(matrix: &ConstraintMatrix) -> bool {
    let mut rows: Vec<Vec<Rational64>> = Vec::with_capacity(matrix.row_count());
    for row in matrix.rows() {
        match classify(row) {
            RowStatus::Inconsistent => return false,
            RowStatus::Trivial => {}
            RowStatus::Keep => rows.push(row.to_vec()),
        }
    }

    for col in 0..matrix.num_vars() {
        // Partition on the sign of the target column. Negative coefficient
        // rows bound the variable from below, positive from above.
        let mut lower: Vec<Vec<Rational64>> = Vec::new();
        let mut upper: Vec<Vec<Rational64>> = Vec::new();
        let mut rest: Vec<Vec<Rational64>> = Vec::new();
        for row in rows {
            let pivot = row[col];
            if pivot.is_negative() {
                lower.push(normalize(row, col));
            } else if pivot.is_zero() {
                rest.push(row);
            } else {
                upper.push(normalize(row, col));
            }
        }

        // Each (lower, upper) pair yields one projected row with the
        // target column cancelled. Unpaired bounds impose nothing once the
        // variable is gone and are dropped.
        for low in &lower {
            for up in &upper {
                let combined = add_rows(low, up);
                match classify(&combined) {
                    RowStatus::Inconsistent => return false,
                    RowStatus::Trivial => {}
                    RowStatus::Keep => rest.push(combined),
                }
            }
        }

        rows = rest;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(num_vars: usize, rows: Vec<Vec<i64>>) -> ConstraintMatrix {
        ConstraintMatrix::from_rows(num_vars, rows).unwrap()
    }

    #[test]
    fn test_empty_matrix_is_feasible() {
        assert!(has_real_solution(&ConstraintMatrix::new(3)));
        assert!(has_real_solution(&ConstraintMatrix::new(0)));
    }

    #[test]
    fn test_constant_rows() {
        // 0 <= 5 holds, 0 <= -1 does not
        assert!(has_real_solution(&matrix(0, vec![vec![5]])));
        assert!(!has_real_solution(&matrix(0, vec![vec![-1]])));
        assert!(!has_real_solution(&matrix(2, vec![vec![0, 0, -1]])));
    }

    #[test]
    fn test_single_variable_box() {
        // 10 <= x <= 5 is empty
        assert!(!has_real_solution(&matrix(1, vec![vec![-1, -10], vec![1, 5]])));
        // 5 <= x <= 10 is not
        assert!(has_real_solution(&matrix(1, vec![vec![-1, -5], vec![1, 10]])));
    }

    #[test]
    fn test_unbounded_direction_is_feasible() {
        // x <= 20 alone
        assert!(has_real_solution(&matrix(2, vec![vec![1, 0, 20]])));
    }

    #[test]
    fn test_three_variable_system_feasible() {
        let m = matrix(
            3,
            vec![
                vec![1, 1, 1, 10],
                vec![1, -1, 2, 20],
                vec![2, -1, -1, -1],
                vec![-1, 1, -1, 5],
            ],
        );
        assert!(has_real_solution(&m));
    }

    #[test]
    fn test_contradictory_difference_infeasible() {
        // 10 <= x <= 20, 0 <= y <= 5, x - y <= 4 forces x <= 9
        let m = matrix(
            2,
            vec![
                vec![1, 0, 20],
                vec![-1, 0, -10],
                vec![0, 1, 5],
                vec![0, -1, 0],
                vec![1, -1, 4],
            ],
        );
        assert!(!has_real_solution(&m));
    }

    #[test]
    fn test_fractional_solution_counts() {
        // 2x >= 1 and 2x <= 1 admit only x = 1/2; real feasibility accepts it
        let m = matrix(1, vec![vec![-2, -1], vec![2, 1]]);
        assert!(has_real_solution(&m));
    }

    #[test]
    fn test_input_matrix_untouched() {
        let m = matrix(2, vec![vec![1, -1, 4], vec![-1, 1, -4]]);
        let copy = m.clone();
        let first = has_real_solution(&m);
        let second = has_real_solution(&m);
        assert_eq!(first, second);
        assert!(m.is_equivalent_to(&copy));
    }
}
