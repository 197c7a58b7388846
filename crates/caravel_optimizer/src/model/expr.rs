use serde::Serialize;

use super::variable::VarId;

/// Sparse linear combination of decision variables plus a constant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(var: VarId, coefficient: f64) -> Self {
        Self {
            terms: vec![(var, coefficient)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) -> &mut LinearExpr {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
        self
    }

    pub fn add_constant(&mut self, constant: f64) -> &mut LinearExpr {
        self.constant += constant;
        self
    }

    pub fn add(&mut self, other: &LinearExpr) -> &mut LinearExpr {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    /// Value of the expression under a flat assignment vector indexed by
    /// [`VarId`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var.get()])
            .sum::<f64>()
            + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_sums_terms_and_constant() {
        let mut expr = LinearExpr::new();
        expr.add_term(VarId::new(0), 2.0);
        expr.add_term(VarId::new(2), -1.0);
        expr.add_constant(5.0);

        assert_eq!(expr.evaluate(&[3.0, 100.0, 4.0]), 2.0 * 3.0 - 4.0 + 5.0);
    }

    #[test]
    fn zero_coefficients_are_dropped() {
        let mut expr = LinearExpr::new();
        expr.add_term(VarId::new(0), 0.0);

        assert!(expr.is_empty());
    }
}
