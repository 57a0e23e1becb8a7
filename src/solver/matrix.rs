//! Inequality-row matrices with exact rational arithmetic.
//!
//! A [`ConstraintMatrix`] holds rows of the form `c1*x1 + ... + cn*xn <= k`
//! over a fixed number of variable columns. The dependence system builder
//! appends rows; the eliminator consumes a private copy. Equivalence between
//! matrices ignores row order and per-row positive rescaling, since both
//! encode the same half-spaces.

use crate::utils::errors::{InvalidSystemError, InvalidSystemKind};
use num_integer::Integer;
use num_rational::Rational64;
use std::fmt;

/// A growable matrix of linear inequality rows.
///
/// Each stored row has `num_vars` coefficient entries followed by the
/// constant, so a row `[a, b | k]` reads `a*x1 + b*x2 <= k`. `Clone`
/// produces a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatrix {
    rows: Vec<Vec<Rational64>>,
    num_vars: usize,
}

impl ConstraintMatrix {
    /// Create an empty matrix over `num_vars` variable columns.
    pub fn new(num_vars: usize) -> Self {
        Self { rows: Vec::new(), num_vars }
    }

    /// Create a matrix from integer rows, each `num_vars` coefficients
    /// followed by the constant.
    pub fn from_rows(num_vars: usize, rows: Vec<Vec<i64>>) -> Result<Self, InvalidSystemError> {
        let mut matrix = Self::new(num_vars);
        for row in rows {
            let rational: Vec<Rational64> =
                row.into_iter().map(Rational64::from_integer).collect();
            let (coeffs, constant) = split_checked(&rational, num_vars)?;
            matrix.add_row(coeffs, constant)?;
        }
        Ok(matrix)
    }

    /// Append the inequality `coefficients . x <= constant`.
    pub fn add_row(
        &mut self,
        coefficients: &[Rational64],
        constant: Rational64,
    ) -> Result<(), InvalidSystemError> {
        if coefficients.len() != self.num_vars {
            return Err(InvalidSystemError {
                message: format!(
                    "row has {} coefficients, expected {}",
                    coefficients.len(),
                    self.num_vars
                ),
                kind: InvalidSystemKind::RaggedRow,
            });
        }
        let mut row = Vec::with_capacity(self.num_vars + 1);
        row.extend_from_slice(coefficients);
        row.push(constant);
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite an existing row in place.
    pub fn set_row(
        &mut self,
        index: usize,
        coefficients: &[Rational64],
        constant: Rational64,
    ) -> Result<(), InvalidSystemError> {
        if index >= self.rows.len() {
            return Err(InvalidSystemError {
                message: format!("row index {} out of range ({} rows)", index, self.rows.len()),
                kind: InvalidSystemKind::RowIndex,
            });
        }
        if coefficients.len() != self.num_vars {
            return Err(InvalidSystemError {
                message: format!(
                    "row has {} coefficients, expected {}",
                    coefficients.len(),
                    self.num_vars
                ),
                kind: InvalidSystemKind::RaggedRow,
            });
        }
        let row = &mut self.rows[index];
        row.clear();
        row.extend_from_slice(coefficients);
        row.push(constant);
        Ok(())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of variable columns.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Row width including the constant column.
    pub fn width(&self) -> usize {
        self.num_vars + 1
    }

    /// A full row (coefficients then constant).
    pub fn row(&self, index: usize) -> Option<&[Rational64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// The constant of a row.
    pub fn constant(&self, index: usize) -> Option<Rational64> {
        self.rows.get(index).map(|row| row[self.num_vars])
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Rational64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Whether two matrices encode the same constraint set.
    ///
    /// Rows are matched as a multiset after canonicalization, so row order
    /// and positive per-row rescaling do not matter. Negating a row does:
    /// `x <= 5` and `-x <= -5` are different constraints.
    pub fn is_equivalent_to(&self, other: &ConstraintMatrix) -> bool {
        if self.num_vars != other.num_vars || self.rows.len() != other.rows.len() {
            return false;
        }
        let mut lhs: Vec<Vec<Rational64>> = self.rows.iter().map(|r| canonical_row(r)).collect();
        let mut rhs: Vec<Vec<Rational64>> = other.rows.iter().map(|r| canonical_row(r)).collect();
        lhs.sort();
        rhs.sort();
        lhs == rhs
    }
}

impl fmt::Display for ConstraintMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in &self.rows {
            write!(f, "  [")?;
            for (j, val) in row.iter().enumerate() {
                if j == self.num_vars {
                    write!(f, " | ")?;
                } else if j > 0 {
                    write!(f, ", ")?;
                }
                if val.is_integer() {
                    write!(f, "{}", val.numer())?;
                } else {
                    write!(f, "{}/{}", val.numer(), val.denom())?;
                }
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}

fn split_checked(
    row: &[Rational64],
    num_vars: usize,
) -> Result<(&[Rational64], Rational64), InvalidSystemError> {
    if row.len() != num_vars + 1 {
        return Err(InvalidSystemError {
            message: format!("row has {} entries, expected {}", row.len(), num_vars + 1),
            kind: InvalidSystemKind::RaggedRow,
        });
    }
    Ok((&row[..num_vars], row[num_vars]))
}

/// Scale a row to its canonical representative: clear denominators, then
/// divide out the (positive) GCD of the entries. All-zero rows are their
/// own representative.
fn canonical_row(row: &[Rational64]) -> Vec<Rational64> {
    let denom_lcm = row.iter().fold(1i64, |acc, r| acc.lcm(r.denom()));
    let ints: Vec<i64> = row
        .iter()
        .map(|r| (*r * Rational64::from_integer(denom_lcm)).to_integer())
        .collect();
    let g = vector_gcd(&ints);
    if g == 0 {
        return row.to_vec();
    }
    ints.into_iter().map(|v| Rational64::from_integer(v / g)).collect()
}

/// Compute the GCD of a vector of integers.
pub fn vector_gcd(v: &[i64]) -> i64 {
    v.iter().fold(0, |acc, &x| acc.gcd(&x))
}

/// Compute the LCM of a vector of integers.
pub fn vector_lcm(v: &[i64]) -> i64 {
    v.iter().fold(1, |acc, &x| acc.lcm(&x))
}
