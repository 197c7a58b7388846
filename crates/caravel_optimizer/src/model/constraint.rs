use serde::Serialize;

use super::expr::LinearExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// `expr <sense> rhs`, labelled for solver logs and infeasibility reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    label: String,
    expr: LinearExpr,
    sense: Sense,
    rhs: f64,
}

impl Constraint {
    pub fn le(label: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            label: label.into(),
            expr,
            sense: Sense::Le,
            rhs,
        }
    }

    pub fn ge(label: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            label: label.into(),
            expr,
            sense: Sense::Ge,
            rhs,
        }
    }

    pub fn eq(label: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            label: label.into(),
            expr,
            sense: Sense::Eq,
            rhs,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Whether the assignment satisfies this row within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tolerance,
            Sense::Ge => lhs >= self.rhs - tolerance,
            Sense::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}
