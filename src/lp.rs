//! Backend-neutral linear programs.
//!
//! The model builder describes each pass as a [`LinearProgram`] over named,
//! continuous, non-negative variables. Any [`LpBackend`] can solve it; the
//! crate ships [`MicroLpBackend`], a pure-Rust simplex that also runs in the
//! browser.

use std::collections::HashMap;

use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};

use crate::error::SolverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Bound on the value of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Free,
    Lower(f64),
    Upper(f64),
    Double(f64, f64),
    Fixed(f64),
}

/// A coefficient on a named variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub var: String,
    pub coef: f64,
}

impl Term {
    pub fn new(var: impl Into<String>, coef: f64) -> Self {
        Term {
            var: var.into(),
            coef,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    /// Label used in logs
    pub name: String,
    pub terms: Vec<Term>,
    pub bound: Bound,
}

/// A linear program over non-negative continuous variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub direction: Direction,
    /// Variable names in column order
    pub variables: Vec<String>,
    /// Objective terms; repeated variables are summed
    pub objective: Vec<Term>,
    pub constraints: Vec<ConstraintRow>,
}

impl LinearProgram {
    pub fn new(direction: Direction) -> Self {
        LinearProgram {
            direction,
            variables: Vec::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Summed objective coefficient of a variable.
    pub fn objective_coef(&self, var: &str) -> f64 {
        self.objective
            .iter()
            .filter(|t| t.var == var)
            .map(|t| t.coef)
            .sum()
    }

    /// Row with the given name.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintRow> {
        self.constraints.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Undefined,
}

/// What a backend returns for one program.
#[derive(Debug, Clone, PartialEq)]
pub struct LpOutcome {
    pub status: LpStatus,
    /// Variable values; empty unless the status is optimal
    pub values: HashMap<String, f64>,
    pub objective: f64,
}

impl LpOutcome {
    pub fn failed(status: LpStatus) -> Self {
        LpOutcome {
            status,
            values: HashMap::new(),
            objective: 0.0,
        }
    }
}

/// A numeric LP solver.
pub trait LpBackend {
    /// Solves `lp`. Infeasible or unbounded programs are reported through
    /// [`LpOutcome::status`]; `Err` is reserved for malformed programs.
    fn solve(&self, lp: &LinearProgram) -> Result<LpOutcome, SolverError>;
}

/// [`LpBackend`] using the `microlp` simplex solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl MicroLpBackend {
    /// Resolves names to columns, summing duplicates. `microlp` rejects rows
    /// that mention a column twice.
    fn terms(
        columns: &HashMap<&str, Variable>,
        terms: &[Term],
        row: &str,
    ) -> Result<Vec<(Variable, f64)>, SolverError> {
        let mut out: Vec<(Variable, f64)> = Vec::with_capacity(terms.len());
        for term in terms {
            let var = *columns.get(term.var.as_str()).ok_or_else(|| {
                SolverError::Solver(format!("row {} uses unknown variable {}", row, term.var))
            })?;
            match out.iter_mut().find(|(v, _)| *v == var) {
                Some((_, coef)) => *coef += term.coef,
                None => out.push((var, term.coef)),
            }
        }
        Ok(out)
    }
}

impl<B: LpBackend + ?Sized> LpBackend for &B {
    fn solve(&self, lp: &LinearProgram) -> Result<LpOutcome, SolverError> {
        (**self).solve(lp)
    }
}

impl Bound {
    /// Whether `value` lies within the bound.
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Bound::Free => true,
            Bound::Lower(lb) => value >= lb,
            Bound::Upper(ub) => value <= ub,
            Bound::Double(lb, ub) => value >= lb && value <= ub,
            Bound::Fixed(v) => value == v,
        }
    }
}

impl LpBackend for MicroLpBackend {
    fn solve(&self, lp: &LinearProgram) -> Result<LpOutcome, SolverError> {
        // Rows without terms constrain the constant 0.
        if lp
            .constraints
            .iter()
            .any(|row| row.terms.is_empty() && !row.bound.admits(0.0))
        {
            return Ok(LpOutcome::failed(LpStatus::Infeasible));
        }
        if lp.variables.is_empty() {
            return Ok(LpOutcome {
                status: LpStatus::Optimal,
                values: HashMap::new(),
                objective: 0.0,
            });
        }

        let direction = match lp.direction {
            Direction::Minimize => OptimizationDirection::Minimize,
            Direction::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);

        let mut columns: HashMap<&str, Variable> = HashMap::with_capacity(lp.variables.len());
        for name in &lp.variables {
            if columns.contains_key(name.as_str()) {
                return Err(SolverError::Solver(format!("duplicate variable {}", name)));
            }
            let var = problem.add_var(lp.objective_coef(name), (0.0, f64::INFINITY));
            columns.insert(name.as_str(), var);
        }
        if let Some(term) = lp.objective.iter().find(|t| !columns.contains_key(t.var.as_str())) {
            return Err(SolverError::Solver(format!(
                "objective uses unknown variable {}",
                term.var
            )));
        }

        for row in lp.constraints.iter().filter(|row| !row.terms.is_empty()) {
            let terms = Self::terms(&columns, &row.terms, &row.name)?;
            match row.bound {
                Bound::Free => {}
                Bound::Lower(lb) => problem.add_constraint(terms, ComparisonOp::Ge, lb),
                Bound::Upper(ub) => problem.add_constraint(terms, ComparisonOp::Le, ub),
                Bound::Double(lb, ub) => {
                    problem.add_constraint(terms.clone(), ComparisonOp::Ge, lb);
                    problem.add_constraint(terms, ComparisonOp::Le, ub);
                }
                Bound::Fixed(value) => problem.add_constraint(terms, ComparisonOp::Eq, value),
            }
        }

        match problem.solve() {
            Ok(solution) => {
                let values = lp
                    .variables
                    .iter()
                    .map(|name| (name.clone(), *solution.var_value(columns[name.as_str()])))
                    .collect();
                Ok(LpOutcome {
                    status: LpStatus::Optimal,
                    values,
                    objective: solution.objective(),
                })
            }
            Err(microlp::Error::Infeasible) => Ok(LpOutcome::failed(LpStatus::Infeasible)),
            Err(microlp::Error::Unbounded) => Ok(LpOutcome::failed(LpStatus::Unbounded)),
            Err(_) => Ok(LpOutcome::failed(LpStatus::Undefined)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_solves_small_minimization() {
        let mut lp = LinearProgram::new(Direction::Minimize);
        lp.variables = vec!["x".into(), "y".into()];
        lp.objective = vec![Term::new("x", 1.0), Term::new("y", 2.0)];
        lp.constraints.push(ConstraintRow {
            name: "demand".into(),
            terms: vec![Term::new("x", 1.0), Term::new("y", 1.0)],
            bound: Bound::Lower(4.0),
        });
        lp.constraints.push(ConstraintRow {
            name: "cap x".into(),
            terms: vec![Term::new("x", 1.0)],
            bound: Bound::Upper(3.0),
        });

        let outcome = MicroLpBackend.solve(&lp).unwrap();
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert!(approx(outcome.values["x"], 3.0));
        assert!(approx(outcome.values["y"], 1.0));
        assert!(approx(outcome.objective, 5.0));
    }

    #[test]
    fn test_duplicate_terms_are_summed() {
        let mut lp = LinearProgram::new(Direction::Maximize);
        lp.variables = vec!["x".into()];
        lp.objective = vec![Term::new("x", 1.0)];
        lp.constraints.push(ConstraintRow {
            name: "cap".into(),
            terms: vec![Term::new("x", 1.0), Term::new("x", 1.0)],
            bound: Bound::Upper(10.0),
        });

        let outcome = MicroLpBackend.solve(&lp).unwrap();
        assert!(approx(outcome.values["x"], 5.0));
    }

    #[test]
    fn test_reports_infeasible_and_unbounded() {
        let mut lp = LinearProgram::new(Direction::Minimize);
        lp.variables = vec!["x".into()];
        lp.objective = vec![Term::new("x", 1.0)];
        lp.constraints.push(ConstraintRow {
            name: "low".into(),
            terms: vec![Term::new("x", 1.0)],
            bound: Bound::Lower(2.0),
        });
        lp.constraints.push(ConstraintRow {
            name: "high".into(),
            terms: vec![Term::new("x", 1.0)],
            bound: Bound::Upper(1.0),
        });
        assert_eq!(MicroLpBackend.solve(&lp).unwrap().status, LpStatus::Infeasible);

        let mut lp = LinearProgram::new(Direction::Minimize);
        lp.variables = vec!["x".into()];
        lp.objective = vec![Term::new("x", -1.0)];
        lp.constraints.push(ConstraintRow {
            name: "floor".into(),
            terms: vec![Term::new("x", 1.0)],
            bound: Bound::Lower(1.0),
        });
        assert_eq!(MicroLpBackend.solve(&lp).unwrap().status, LpStatus::Unbounded);
    }

    #[test]
    fn test_empty_rows() {
        let mut lp = LinearProgram::new(Direction::Minimize);
        lp.variables = vec!["x".into()];
        lp.objective = vec![Term::new("x", 1.0)];
        lp.constraints.push(ConstraintRow {
            name: "slack".into(),
            terms: Vec::new(),
            bound: Bound::Upper(0.0),
        });
        assert_eq!(MicroLpBackend.solve(&lp).unwrap().status, LpStatus::Optimal);

        lp.constraints.push(ConstraintRow {
            name: "demand".into(),
            terms: Vec::new(),
            bound: Bound::Upper(-5.0),
        });
        assert_eq!(MicroLpBackend.solve(&lp).unwrap().status, LpStatus::Infeasible);

        let empty = LinearProgram::new(Direction::Minimize);
        let outcome = MicroLpBackend.solve(&empty).unwrap();
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert!(outcome.values.is_empty());
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let mut lp = LinearProgram::new(Direction::Minimize);
        lp.variables = vec!["x".into()];
        lp.constraints.push(ConstraintRow {
            name: "bad".into(),
            terms: vec![Term::new("y", 1.0)],
            bound: Bound::Upper(1.0),
        });
        assert!(matches!(MicroLpBackend.solve(&lp), Err(SolverError::Solver(_))));
    }
}
