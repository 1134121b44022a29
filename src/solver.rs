//! Multi-pass production solving.
//!
//! A solve always starts with a rate pass that meets every hard rate target at
//! minimum cost. Each maximize target then gets its own pass, in descending
//! priority, against whatever input budget the previous passes left over. The
//! passes are strictly sequential: each one needs the graph rebuilt from all
//! the recipe multipliers accumulated before it.

use tracing::{debug, info, warn};

use crate::data::GameData;
use crate::error::SolverError;
use crate::graph::generate_production_graph;
use crate::lp::{LpBackend, LpStatus, MicroLpBackend};
use crate::model::{ModelBuilder, PassKey};
use crate::models::{
    FactoryOptions, Input, Inputs, ProductionGraph, ProductionSolution, Report, SolverResults,
    EPSILON,
};
use crate::normalize::{normalize, NormalizedRequest};
use crate::report::generate_production_report;

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Solves production plans for one configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use factory_planner::{data::load_all_data, models::FactoryOptions, solver::ProductionSolver};
///
/// let data = load_all_data(Path::new("data")).unwrap();
/// let options: FactoryOptions = serde_json::from_str(r#"{
///     "inputResources": [{ "itemKey": "Desc_OreIron_C", "value": 120, "weight": 1 }],
///     "productionItems": [{ "itemKey": "Desc_IronPlate_C", "mode": "per-minute", "value": 40 }],
///     "allowedRecipes": ["Recipe_IngotIron_C", "Recipe_IronPlate_C"]
/// }"#).unwrap();
///
/// let results = ProductionSolver::new(&options, &data).unwrap().exec();
/// assert!(results.error.is_empty());
/// ```
pub struct ProductionSolver<'a, B: LpBackend = MicroLpBackend> {
    data: &'a GameData,
    request: NormalizedRequest,
    backend: B,
}

impl<'a> ProductionSolver<'a, MicroLpBackend> {
    /// Validates `options` against `data`, using the default LP backend.
    pub fn new(options: &FactoryOptions, data: &'a GameData) -> Result<Self, SolverError> {
        Self::with_backend(options, data, MicroLpBackend)
    }
}

impl<'a, B: LpBackend> ProductionSolver<'a, B> {
    /// Validates `options` against `data`, solving with `backend`.
    pub fn with_backend(
        options: &FactoryOptions,
        data: &'a GameData,
        backend: B,
    ) -> Result<Self, SolverError> {
        Ok(ProductionSolver {
            data,
            request: normalize(options, data)?,
            backend,
        })
    }

    pub fn request(&self) -> &NormalizedRequest {
        &self.request
    }

    /// Runs every pass and packages the outcome. Never fails: errors end up
    /// in [`SolverResults::error`].
    pub fn exec(&self) -> SolverResults {
        let timestamp = now_ms();
        package(self.run(), timestamp)
    }

    /// Runs the rate pass and every maximize pass.
    ///
    /// # Errors
    ///
    /// [`SolverError::Infeasible`] if the rate targets cannot be met,
    /// [`SolverError::Unbounded`] if a maximize target has no limit, and
    /// [`SolverError::EmptySolution`] if nothing ends up being built.
    pub fn run(&self) -> Result<(ProductionGraph, Report), SolverError> {
        let mut solution = self.solve_pass(&PassKey::Rates, &self.request.inputs)?;
        let mut graph = generate_production_graph(self.data, &self.request, &solution);

        for target in &self.request.maximize_targets {
            let remaining = self.remaining_inputs(&graph);
            let pass = PassKey::Maximize(target.key.clone());
            for (recipe, multiplier) in self.solve_pass(&pass, &remaining)? {
                *solution.entry(recipe).or_insert(0.0) += multiplier;
            }
            graph = generate_production_graph(self.data, &self.request, &solution);
        }

        if graph.is_empty() {
            return Err(SolverError::EmptySolution);
        }
        let report = generate_production_report(self.data, &self.request.inputs, &graph);
        Ok((graph, report))
    }

    /// Input budget left after the consumption recorded in `graph`. Inputs
    /// that are used up are left out.
    pub fn remaining_inputs(&self, graph: &ProductionGraph) -> Inputs {
        self.request
            .inputs
            .iter()
            .filter_map(|(key, input)| {
                let used = graph
                    .node_of_type(key, input.kind.into())
                    .map_or(0.0, |n| n.multiplier);
                let amount = input.amount - used;
                (amount > EPSILON).then(|| {
                    (
                        key.clone(),
                        Input {
                            amount,
                            ..input.clone()
                        },
                    )
                })
            })
            .collect()
    }

    /// Builds and solves one pass, keeping recipes that run above tolerance.
    fn solve_pass(&self, pass: &PassKey, budget: &Inputs) -> Result<ProductionSolution, SolverError> {
        let lp = ModelBuilder::new(self.data, &self.request).build(pass, budget);
        let outcome = self.backend.solve(&lp)?;

        match outcome.status {
            LpStatus::Optimal => {}
            LpStatus::Infeasible => return Err(SolverError::Infeasible),
            LpStatus::Unbounded => return Err(SolverError::Unbounded),
            LpStatus::Undefined => {
                return Err(SolverError::Solver(format!("no definite solution for {:?}", pass)))
            }
        }

        let solution: ProductionSolution = outcome
            .values
            .into_iter()
            .filter(|(_, value)| *value > EPSILON)
            .collect();
        debug!(
            pass = ?pass,
            variables = lp.variables.len(),
            constraints = lp.constraints.len(),
            recipes_used = solution.len(),
            objective = outcome.objective,
            "solver pass finished"
        );
        Ok(solution)
    }
}

/// Validates `options` and solves them, timing both. Validation failures are
/// reported in [`SolverResults::error`] like solve failures.
pub fn solve_options(options: &FactoryOptions, data: &GameData) -> SolverResults {
    let timestamp = now_ms();
    let outcome = ProductionSolver::new(options, data).and_then(|solver| solver.run());
    package(outcome, timestamp)
}

fn package(outcome: Result<(ProductionGraph, Report), SolverError>, timestamp: f64) -> SolverResults {
    let compute_time = now_ms() - timestamp;

    match outcome {
        Ok((graph, report)) => {
            info!(
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                compute_time_ms = compute_time,
                "solved production plan"
            );
            SolverResults {
                production_graph: Some(graph),
                report: Some(report),
                timestamp,
                compute_time,
                error: String::new(),
            }
        }
        Err(e) => {
            warn!(error = %e, compute_time_ms = compute_time, "production solve failed");
            SolverResults {
                production_graph: None,
                report: None,
                timestamp,
                compute_time,
                error: e.to_string(),
            }
        }
    }
}
