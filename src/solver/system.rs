//! Dependence system construction.
//!
//! A [`DependenceSystem`] captures one access pair: loop bounds for the
//! common nest, per-dimension affine subscript coefficients for the source
//! ("write") and sink ("read") occurrence, and the number of shared scalar
//! columns. [`DependenceSystem::build`] turns a candidate direction vector
//! into a [`ConstraintMatrix`] whose feasibility means "this relative
//! iteration ordering can touch the same element".

use crate::solver::eliminator::has_real_solution;
use crate::solver::matrix::ConstraintMatrix;
use crate::utils::errors::{InvalidSystemError, InvalidSystemKind};
use num_rational::Rational64;
use num_traits::Zero;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Relative ordering of source and sink iteration at one loop level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// < (source iteration strictly earlier)
    Lt,
    /// = (same iteration)
    Eq,
    /// > (source iteration strictly later)
    Gt,
    /// <= (earlier or same)
    Le,
    /// >= (later or same)
    Ge,
    /// * (unconstrained)
    Any,
}

impl Direction {
    /// Get the character representation.
    pub fn to_char(&self) -> char {
        match self {
            Direction::Lt => '<',
            Direction::Eq => '=',
            Direction::Gt => '>',
            Direction::Le => '≤',
            Direction::Ge => '≥',
            Direction::Any => '*',
        }
    }

    /// Check if this direction allows parallel execution of the level.
    pub fn allows_parallel(&self) -> bool {
        matches!(self, Direction::Eq)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Render a direction vector as `<, =, *`.
pub(crate) fn format_directions(directions: &[Direction]) -> String {
    directions
        .iter()
        .map(|d| d.to_char().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One access pair's dependence system.
///
/// Coefficient rows use the layout `[constant, level coefficients outermost
/// first, scalar coefficients]`, one row per array dimension, and must all
/// have length `1 + depth + num_scalars`. "Write" and "read" name the source
/// and sink occurrence of the pair; for an anti dependence the source is the
/// read.
#[derive(Debug, Clone)]
pub struct DependenceSystem {
    lower_bounds: Vec<i64>,
    upper_bounds: Vec<i64>,
    write_coeffs: Vec<Vec<Rational64>>,
    read_coeffs: Vec<Vec<Rational64>>,
    num_scalars: usize,
}

impl DependenceSystem {
    /// Create a validated system.
    pub fn new(
        lower_bounds: Vec<i64>,
        upper_bounds: Vec<i64>,
        write_coeffs: Vec<Vec<Rational64>>,
        read_coeffs: Vec<Vec<Rational64>>,
        num_scalars: usize,
    ) -> Result<Self, InvalidSystemError> {
        if lower_bounds.len() != upper_bounds.len() {
            return Err(InvalidSystemError {
                message: format!(
                    "{} lower bounds but {} upper bounds",
                    lower_bounds.len(),
                    upper_bounds.len()
                ),
                kind: InvalidSystemKind::MismatchedBounds,
            });
        }
        if write_coeffs.len() != read_coeffs.len() {
            return Err(InvalidSystemError {
                message: format!(
                    "{} write subscripts but {} read subscripts",
                    write_coeffs.len(),
                    read_coeffs.len()
                ),
                kind: InvalidSystemKind::MismatchedSubscripts,
            });
        }
        let row_len = 1 + lower_bounds.len() + num_scalars;
        for row in write_coeffs.iter().chain(read_coeffs.iter()) {
            if row.len() != row_len {
                return Err(InvalidSystemError {
                    message: format!(
                        "coefficient row has {} entries, expected {}",
                        row.len(),
                        row_len
                    ),
                    kind: InvalidSystemKind::RaggedRow,
                });
            }
        }
        Ok(Self {
            lower_bounds,
            upper_bounds,
            write_coeffs,
            read_coeffs,
            num_scalars,
        })
    }

    /// Create a system from integer coefficient rows.
    pub fn with_integer_coeffs(
        lower_bounds: Vec<i64>,
        upper_bounds: Vec<i64>,
        write_coeffs: Vec<Vec<i64>>,
        read_coeffs: Vec<Vec<i64>>,
        num_scalars: usize,
    ) -> Result<Self, InvalidSystemError> {
        let to_rational = |rows: Vec<Vec<i64>>| -> Vec<Vec<Rational64>> {
            rows.into_iter()
                .map(|row| row.into_iter().map(Rational64::from_integer).collect())
                .collect()
        };
        Self::new(
            lower_bounds,
            upper_bounds,
            to_rational(write_coeffs),
            to_rational(read_coeffs),
            num_scalars,
        )
    }

    /// Nesting depth of the common loops.
    pub fn depth(&self) -> usize {
        self.lower_bounds.len()
    }

    /// Number of array dimensions.
    pub fn num_dims(&self) -> usize {
        self.write_coeffs.len()
    }

    /// Number of shared scalar columns.
    pub fn num_scalars(&self) -> usize {
        self.num_scalars
    }

    fn check_direction(&self, direction: &[Direction]) -> Result<(), InvalidSystemError> {
        if direction.len() != self.depth() {
            return Err(InvalidSystemError {
                message: format!(
                    "direction vector has {} components, nest depth is {}",
                    direction.len(),
                    self.depth()
                ),
                kind: InvalidSystemKind::DirectionLength,
            });
        }
        Ok(())
    }

    /// Build the constraint matrix for one candidate direction vector.
    ///
    /// Columns are the source iteration variables (one per level), the sink
    /// iteration variables, the shared scalar columns, then the constant.
    /// Rows are emitted bounds first, subscript equalities second (two
    /// opposing inequalities per dimension), direction rows last.
    pub fn build(&self, direction: &[Direction]) -> Result<ConstraintMatrix, InvalidSystemError> {
        self.check_direction(direction)?;
        let n = self.depth();
        let width = 2 * n + self.num_scalars;
        let mut matrix = ConstraintMatrix::new(width);

        let one = Rational64::from_integer(1);
        let minus_one = Rational64::from_integer(-1);

        for level in 0..n {
            let lb = Rational64::from_integer(self.lower_bounds[level]);
            let ub = Rational64::from_integer(self.upper_bounds[level]);
            for col in [level, n + level] {
                let mut row = vec![Rational64::zero(); width];
                row[col] = minus_one;
                matrix.add_row(&row, -lb)?;
                row[col] = one;
                matrix.add_row(&row, ub)?;
            }
        }

        for dim in 0..self.write_coeffs.len() {
            let (coeffs, constant) = self.subscript_row(dim, width);
            let negated: Vec<Rational64> = coeffs.iter().map(|c| -c).collect();
            matrix.add_row(&coeffs, constant)?;
            matrix.add_row(&negated, -constant)?;
        }

        for (level, dir) in direction.iter().enumerate() {
            let mut row = vec![Rational64::zero(); width];
            match dir {
                Direction::Lt | Direction::Le => {
                    row[level] = one;
                    row[n + level] = minus_one;
                    let constant = if *dir == Direction::Lt { minus_one } else { Rational64::zero() };
                    matrix.add_row(&row, constant)?;
                }
                Direction::Gt | Direction::Ge => {
                    row[level] = minus_one;
                    row[n + level] = one;
                    let constant = if *dir == Direction::Gt { minus_one } else { Rational64::zero() };
                    matrix.add_row(&row, constant)?;
                }
                Direction::Eq => {
                    row[level] = one;
                    row[n + level] = minus_one;
                    matrix.add_row(&row, Rational64::zero())?;
                    row[level] = minus_one;
                    row[n + level] = one;
                    matrix.add_row(&row, Rational64::zero())?;
                }
                Direction::Any => {}
            }
        }

        Ok(matrix)
    }

    /// The equality "write subscript equals read subscript" for one
    /// dimension, as a single `<=` row (the caller adds the negation).
    fn subscript_row(&self, dim: usize, width: usize) -> (Vec<Rational64>, Rational64) {
        let n = self.depth();
        let write = &self.write_coeffs[dim];
        let read = &self.read_coeffs[dim];
        let mut coeffs = vec![Rational64::zero(); width];
        for level in 0..n {
            coeffs[level] = write[1 + level];
            coeffs[n + level] = -read[1 + level];
        }
        for k in 0..self.num_scalars {
            coeffs[2 * n + k] = write[1 + n + k] - read[1 + n + k];
        }
        (coeffs, read[0] - write[0])
    }

    /// Decide whether the direction vector is achievable.
    ///
    /// Dimensions whose subscripts are constant on both sides short-circuit
    /// the eliminator: differing constants prove independence outright, and
    /// if every dimension is a matching constant pair the accesses always
    /// overlap. Everything else goes through [`has_real_solution`].
    pub fn test(&self, direction: &[Direction]) -> Result<bool, InvalidSystemError> {
        self.check_direction(direction)?;

        let mut all_constant = true;
        for dim in 0..self.write_coeffs.len() {
            let write = &self.write_coeffs[dim];
            let read = &self.read_coeffs[dim];
            let write_const = write[1..].iter().all(|c| c.is_zero());
            let read_const = read[1..].iter().all(|c| c.is_zero());
            if write_const && read_const {
                if write[0] != read[0] {
                    return Ok(false);
                }
            } else {
                all_constant = false;
            }
        }
        if all_constant {
            return Ok(true);
        }

        let matrix = self.build(direction)?;
        Ok(has_real_solution(&matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_matrix_layout() {
        // a[i] written, a[i - 1] read, loop 0..=9
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1]],
            vec![vec![-1, 1]],
            0,
        )
        .unwrap();
        let matrix = system.build(&[Direction::Any]).unwrap();
        let expected = ConstraintMatrix::from_rows(
            2,
            vec![
                vec![-1, 0, 0],
                vec![1, 0, 9],
                vec![0, -1, 0],
                vec![0, 1, 9],
                vec![1, -1, -1],
                vec![-1, 1, 1],
            ],
        )
        .unwrap();
        assert!(matrix.is_equivalent_to(&expected));
    }

    #[test]
    fn test_builder_direction_rows() {
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1]],
            vec![vec![0, 1]],
            0,
        )
        .unwrap();
        let matrix = system.build(&[Direction::Lt]).unwrap();
        let expected = ConstraintMatrix::from_rows(
            2,
            vec![
                vec![-1, 0, 0],
                vec![1, 0, 9],
                vec![0, -1, 0],
                vec![0, 1, 9],
                vec![1, -1, 0],
                vec![-1, 1, 0],
                // source strictly before sink
                vec![1, -1, -1],
            ],
        )
        .unwrap();
        assert!(matrix.is_equivalent_to(&expected));

        let eq = system.build(&[Direction::Eq]).unwrap();
        assert_eq!(eq.row_count(), 8);

        // weak orderings emit a single zero-constant row
        let le = system.build(&[Direction::Le]).unwrap();
        assert_eq!(le.row_count(), 7);
        let ge = system.build(&[Direction::Ge]).unwrap();
        assert_eq!(ge.row_count(), 7);
        assert!(!le.is_equivalent_to(&ge));
    }

    #[test]
    fn test_scalar_columns_are_shared() {
        // a[i + n] vs a[i]: n occupies one shared column
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1, 1]],
            vec![vec![0, 1, 0]],
            1,
        )
        .unwrap();
        let matrix = system.build(&[Direction::Any]).unwrap();
        assert_eq!(matrix.num_vars(), 3);
        // subscript equality: w - r + n = 0
        let expected_rows = ConstraintMatrix::from_rows(
            3,
            vec![
                vec![-1, 0, 0, 0],
                vec![1, 0, 0, 9],
                vec![0, -1, 0, 0],
                vec![0, 1, 0, 9],
                vec![1, -1, 1, 0],
                vec![-1, 1, -1, 0],
            ],
        )
        .unwrap();
        assert!(matrix.is_equivalent_to(&expected_rows));
    }

    #[test]
    fn test_validation_errors() {
        let err = DependenceSystem::with_integer_coeffs(
            vec![0, 0],
            vec![9],
            vec![],
            vec![],
            0,
        )
        .unwrap_err();
        assert_eq!(err.kind, InvalidSystemKind::MismatchedBounds);

        let err = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1]],
            vec![],
            0,
        )
        .unwrap_err();
        assert_eq!(err.kind, InvalidSystemKind::MismatchedSubscripts);

        let err = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1, 7]],
            vec![vec![0, 1, 7]],
            0,
        )
        .unwrap_err();
        assert_eq!(err.kind, InvalidSystemKind::RaggedRow);

        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![0, 1]],
            vec![vec![0, 1]],
            0,
        )
        .unwrap();
        let err = system.test(&[]).unwrap_err();
        assert_eq!(err.kind, InvalidSystemKind::DirectionLength);
    }

    #[test]
    fn test_constant_subscript_fast_path() {
        // a[5] vs a[7]: never the same element
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![5, 0]],
            vec![vec![7, 0]],
            0,
        )
        .unwrap();
        assert!(!system.test(&[Direction::Any]).unwrap());

        // a[5] vs a[5]: always the same element
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![5, 0]],
            vec![vec![5, 0]],
            0,
        )
        .unwrap();
        assert!(system.test(&[Direction::Any]).unwrap());

        // one constant dimension differing decides a mixed case too
        let system = DependenceSystem::with_integer_coeffs(
            vec![0],
            vec![9],
            vec![vec![5, 0], vec![0, 1]],
            vec![vec![7, 0], vec![0, 1]],
            0,
        )
        .unwrap();
        assert!(!system.test(&[Direction::Any]).unwrap());
    }

    #[test]
    fn test_depth_zero_system() {
        // accesses outside any common loop
        let system = DependenceSystem::with_integer_coeffs(
            vec![],
            vec![],
            vec![vec![3]],
            vec![vec![3]],
            0,
        )
        .unwrap();
        assert_eq!(system.depth(), 0);
        assert!(system.test(&[]).unwrap());

        let system = DependenceSystem::with_integer_coeffs(
            vec![],
            vec![],
            vec![vec![3]],
            vec![vec![4]],
            0,
        )
        .unwrap();
        assert!(!system.test(&[]).unwrap());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Lt.to_string(), "<");
        assert_eq!(Direction::Any.to_string(), "*");
        assert_eq!(format_directions(&[Direction::Eq, Direction::Lt]), "=, <");
        assert!(Direction::Eq.allows_parallel());
        assert!(!Direction::Lt.allows_parallel());
    }
}
