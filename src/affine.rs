//! Canonical affine form for subscript expressions.
//!
//! A [`LinearExpr`] is a sum `c1*v1 + c2*v2 + ... + k` with rational
//! coefficients over interned variables. Extraction from the input tree
//! normalizes structurally different but mathematically equal expressions
//! (`a + 3`, `3 + a`, `2 + a + 1`) to the same value, so downstream matrix
//! generation never depends on source-text ordering.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::utils::errors::{NonAffineError, NonAffineErrorKind};
use crate::utils::intern::Symbol;
use num_rational::Rational64;
use num_traits::{Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// An affine expression in canonical form.
///
/// Invariant: no stored coefficient is zero. All construction paths
/// maintain this, so structural equality coincides with mathematical
/// equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearExpr {
    coefficients: BTreeMap<Symbol, Rational64>,
    constant: Rational64,
}

impl Default for LinearExpr {
    fn default() -> Self {
        Self::zero()
    }
}

impl LinearExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant: Rational64::zero(),
        }
    }

    /// A constant expression.
    pub fn constant(value: i64) -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant: Rational64::from_integer(value),
        }
    }

    /// A single variable with coefficient one.
    pub fn variable(sym: Symbol) -> Self {
        let mut coefficients = BTreeMap::new();
        coefficients.insert(sym, Rational64::from_integer(1));
        Self { coefficients, constant: Rational64::zero() }
    }

    /// Reduce an input expression to affine form.
    ///
    /// Handles negation, addition, subtraction, multiplication with one
    /// constant side, and division by a non-zero constant. Anything else
    /// (variable products, modulo, nested array accesses) fails with the
    /// matching [`NonAffineErrorKind`].
    pub fn from_expr(expr: &Expr) -> Result<Self, NonAffineError> {
        match expr {
            Expr::Literal(value) => Ok(Self::constant(*value)),
            Expr::Access(access) => {
                if access.is_scalar() {
                    Ok(Self::variable(access.base))
                } else {
                    Err(NonAffineError {
                        message: format!("array access '{}' nested inside a subscript", access),
                        kind: NonAffineErrorKind::NestedAccess,
                    })
                }
            }
            Expr::Unary { op, operand } => {
                let inner = Self::from_expr(operand)?;
                Ok(match op {
                    UnaryOp::Neg => -inner,
                    UnaryOp::Plus => inner,
                })
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::Add => Ok(Self::from_expr(left)? + Self::from_expr(right)?),
                BinaryOp::Sub => Ok(Self::from_expr(left)? - Self::from_expr(right)?),
                BinaryOp::Mul => {
                    let lhs = Self::from_expr(left)?;
                    let rhs = Self::from_expr(right)?;
                    if lhs.is_constant() {
                        Ok(rhs.scale(lhs.constant))
                    } else if rhs.is_constant() {
                        Ok(lhs.scale(rhs.constant))
                    } else {
                        Err(NonAffineError {
                            message: format!("product of non-constant expressions in '{}'", expr),
                            kind: NonAffineErrorKind::Product,
                        })
                    }
                }
                BinaryOp::Div => {
                    let lhs = Self::from_expr(left)?;
                    let rhs = Self::from_expr(right)?;
                    if !rhs.is_constant() {
                        Err(NonAffineError {
                            message: format!("division by non-constant expression in '{}'", expr),
                            kind: NonAffineErrorKind::NonConstantDivisor,
                        })
                    } else if rhs.constant.is_zero() {
                        Err(NonAffineError {
                            message: format!("division by zero in '{}'", expr),
                            kind: NonAffineErrorKind::DivisionByZero,
                        })
                    } else {
                        Ok(lhs.scale(rhs.constant.recip()))
                    }
                }
                BinaryOp::Mod => Err(NonAffineError {
                    message: format!("modulo operator in '{}'", expr),
                    kind: NonAffineErrorKind::UnsupportedOperator,
                }),
            },
        }
    }

    /// The coefficient of a variable (zero if absent).
    pub fn coefficient(&self, sym: Symbol) -> Rational64 {
        self.coefficients.get(&sym).copied().unwrap_or_else(Rational64::zero)
    }

    /// The constant term.
    pub fn constant_term(&self) -> Rational64 {
        self.constant
    }

    /// The variables with non-zero coefficients, in symbol order.
    pub fn variables(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.coefficients.keys().copied()
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Multiply the whole expression by a rational factor.
    pub fn scale(mut self, factor: Rational64) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        for coeff in self.coefficients.values_mut() {
            *coeff *= factor;
        }
        self.constant *= factor;
        self
    }

    fn add_term(&mut self, sym: Symbol, coeff: Rational64) {
        let entry = self.coefficients.entry(sym).or_insert_with(Rational64::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.coefficients.remove(&sym);
        }
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        for (sym, coeff) in rhs.coefficients {
            self.add_term(sym, coeff);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(mut self) -> LinearExpr {
        for coeff in self.coefficients.values_mut() {
            *coeff = -*coeff;
        }
        self.constant = -self.constant;
        self
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one = Rational64::from_integer(1);
        let mut first = true;
        for (sym, coeff) in &self.coefficients {
            if first {
                if *coeff == one {
                    write!(f, "{}", sym)?;
                } else if *coeff == -one {
                    write!(f, "-{}", sym)?;
                } else {
                    write!(f, "{}{}", coeff, sym)?;
                }
                first = false;
            } else {
                let (sep, abs) = if coeff.is_negative() {
                    (" - ", -*coeff)
                } else {
                    (" + ", *coeff)
                };
                if abs == one {
                    write!(f, "{}{}", sep, sym)?;
                } else {
                    write!(f, "{}{}{}", sep, abs, sym)?;
                }
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant.is_zero() {
            Ok(())
        } else if self.constant.is_negative() {
            write!(f, " - {}", -self.constant)
        } else {
            write!(f, " + {}", self.constant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AccessExpr;
    use crate::utils::intern::intern;

    #[test]
    fn test_normalization() {
        // 2 + 3 + a, a + 5 and 5 + a are the same affine expression
        let e1 = LinearExpr::from_expr(&Expr::add(
            Expr::add(Expr::lit(2), Expr::lit(3)),
            Expr::var("a"),
        ))
        .unwrap();
        let e2 = LinearExpr::from_expr(&Expr::add(Expr::var("a"), Expr::lit(5))).unwrap();
        let e3 = LinearExpr::from_expr(&Expr::add(Expr::lit(5), Expr::var("a"))).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(e2, e3);
    }

    #[test]
    fn test_coefficient_folding() {
        // 2*i + 3*i - 5*i cancels to zero
        let expr = Expr::sub(
            Expr::add(
                Expr::mul(Expr::lit(2), Expr::var("i")),
                Expr::mul(Expr::lit(3), Expr::var("i")),
            ),
            Expr::mul(Expr::lit(5), Expr::var("i")),
        );
        let lin = LinearExpr::from_expr(&expr).unwrap();
        assert!(lin.is_constant());
        assert_eq!(lin, LinearExpr::zero());
    }

    #[test]
    fn test_negation_distributes() {
        // -(i - 3) == -i + 3
        let lin = LinearExpr::from_expr(&Expr::neg(Expr::sub(Expr::var("i"), Expr::lit(3)))).unwrap();
        let i = intern("i");
        assert_eq!(lin.coefficient(i), Rational64::from_integer(-1));
        assert_eq!(lin.constant_term(), Rational64::from_integer(3));
    }

    #[test]
    fn test_constant_times_variable() {
        let lin = LinearExpr::from_expr(&Expr::mul(
            Expr::add(Expr::lit(1), Expr::lit(2)),
            Expr::var("j"),
        ))
        .unwrap();
        assert_eq!(lin.coefficient(intern("j")), Rational64::from_integer(3));
    }

    #[test]
    fn test_division_by_constant() {
        let lin = LinearExpr::from_expr(&Expr::div(Expr::var("i"), Expr::lit(2))).unwrap();
        assert_eq!(lin.coefficient(intern("i")), Rational64::new(1, 2));
    }

    #[test]
    fn test_product_of_variables_fails() {
        let err = LinearExpr::from_expr(&Expr::mul(Expr::var("i"), Expr::var("j"))).unwrap_err();
        assert_eq!(err.kind, NonAffineErrorKind::Product);
    }

    #[test]
    fn test_division_failures() {
        let err = LinearExpr::from_expr(&Expr::div(Expr::var("i"), Expr::var("j"))).unwrap_err();
        assert_eq!(err.kind, NonAffineErrorKind::NonConstantDivisor);

        let err = LinearExpr::from_expr(&Expr::div(Expr::var("i"), Expr::lit(0))).unwrap_err();
        assert_eq!(err.kind, NonAffineErrorKind::DivisionByZero);
    }

    #[test]
    fn test_modulo_fails() {
        let err = LinearExpr::from_expr(&Expr::modulo(Expr::var("i"), Expr::lit(2))).unwrap_err();
        assert_eq!(err.kind, NonAffineErrorKind::UnsupportedOperator);
    }

    #[test]
    fn test_nested_access_fails() {
        // a[b[i]]
        let expr = Expr::Access(AccessExpr::array(
            "b",
            vec![Expr::var("i")],
        ));
        let err = LinearExpr::from_expr(&expr).unwrap_err();
        assert_eq!(err.kind, NonAffineErrorKind::NestedAccess);
    }

    #[test]
    fn test_display() {
        let lin = LinearExpr::from_expr(&Expr::sub(
            Expr::add(Expr::mul(Expr::lit(2), Expr::var("i")), Expr::var("n")),
            Expr::lit(3),
        ))
        .unwrap();
        let s = lin.to_string();
        assert!(s.contains("2i"));
        assert!(s.contains("n"));
        assert!(s.contains("- 3"));
    }
}
