//! Linear program construction for one solver pass.
//!
//! Every enabled recipe becomes a non-negative variable holding its throughput
//! multiplier (how many buildings run it at 100%). Each item touched by an
//! enabled recipe gets a mass-balance row whose bound depends on the pass:
//! an input budget, a rate target, a maximize target or plain balance.

use std::collections::HashMap;

use crate::data::GameData;
use crate::lp::{Bound, ConstraintRow, Direction, LinearProgram, Term};
use crate::models::{InputKind, Inputs, RateTarget, Recipe, POINTS_ITEM_KEY};
use crate::normalize::NormalizedRequest;

/// Scale applied to the terms of the item being maximized so they dominate
/// the cost terms of the objective.
pub const MAXIMIZE_TARGET_WEIGHTING: f64 = 1e6;

/// Sink points are modelled in thousands.
const POINTS_SCALE: f64 = 1000.0;

/// What a pass is solving for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassKey {
    /// Meet every rate target at minimum cost.
    Rates,
    /// Push output of one item as high as the remaining inputs allow.
    Maximize(String),
}

impl PassKey {
    fn maximizes(&self, key: &str) -> bool {
        matches!(self, PassKey::Maximize(target) if target == key)
    }
}

/// Builds the linear program of a pass from a request and a budget.
pub struct ModelBuilder<'a> {
    data: &'a GameData,
    request: &'a NormalizedRequest,
}

/// Objective coefficients indexed like the program's variables.
struct Objective<'r> {
    columns: HashMap<&'r str, usize>,
    coefs: Vec<f64>,
}

impl Objective<'_> {
    fn add(&mut self, var: &str, coef: f64) {
        if let Some(&col) = self.columns.get(var) {
            self.coefs[col] += coef;
        }
    }
}

impl<'a> ModelBuilder<'a> {
    pub fn new(data: &'a GameData, request: &'a NormalizedRequest) -> Self {
        ModelBuilder { data, request }
    }

    /// Enabled recipes in canonical order.
    fn enabled_recipes(&self) -> impl Iterator<Item = &'a Recipe> + '_ {
        self.data
            .recipes()
            .iter()
            .filter(|r| self.request.is_recipe_enabled(&r.id))
    }

    /// Cost of running one building of `recipe`.
    pub fn recipe_cost(&self, recipe: &Recipe) -> f64 {
        let weights = &self.request.weights;
        let power = self
            .data
            .building(&recipe.produced_in)
            .map_or(0.0, |b| b.power);
        let power_score = if power > 0.0 { power * weights.power } else { 0.0 };
        let complexity_score = recipe.ingredients.len() as f64 * weights.complexity;
        let resource_score: f64 = recipe
            .ingredients
            .iter()
            .filter_map(|ingredient| {
                self.request
                    .inputs
                    .get(&ingredient.item_class)
                    .map(|input| input.weight * ingredient.per_minute * weights.resources)
            })
            .sum();
        power_score + complexity_score + resource_score
    }

    /// Net sink points consumed by one building of `recipe`, in thousands.
    ///
    /// Only items that are not raw inputs count: map resources and
    /// hand-gathered items have no intrinsic value in the plan.
    pub fn points_coef(&self, recipe: &Recipe) -> f64 {
        let counts = |item: &str| match self.request.inputs.get(item) {
            None => true,
            Some(input) => input.kind == InputKind::InputItem,
        };
        let consumed: f64 = recipe
            .ingredients
            .iter()
            .filter(|i| counts(&i.item_class))
            .map(|i| i.per_minute * self.data.item_points(&i.item_class))
            .sum();
        let produced: f64 = recipe
            .products
            .iter()
            .filter(|p| counts(&p.item_class))
            .map(|p| p.per_minute * self.data.item_points(&p.item_class))
            .sum();
        (consumed - produced) / POINTS_SCALE
    }

    /// Builds the program for `pass` given the input `budget` still available.
    pub fn build(&self, pass: &PassKey, budget: &Inputs) -> LinearProgram {
        let mut lp = LinearProgram::new(Direction::Minimize);
        let recipes: Vec<&Recipe> = self.enabled_recipes().collect();

        let mut objective = Objective {
            columns: recipes
                .iter()
                .enumerate()
                .map(|(i, r)| (r.id.as_str(), i))
                .collect(),
            coefs: recipes.iter().map(|r| self.recipe_cost(r)).collect(),
        };
        lp.variables = recipes.iter().map(|r| r.id.clone()).collect();

        if *pass == PassKey::Rates {
            for recipe in &recipes {
                if let Some(target) = self.request.rate_targets.recipe(&recipe.id) {
                    lp.constraints.push(ConstraintRow {
                        name: format!("{} recipe constraint", recipe.id),
                        terms: vec![Term::new(&recipe.id, 1.0)],
                        bound: Bound::Lower(target.count),
                    });
                }
            }
        }

        self.add_points(&mut lp, &mut objective, &recipes, pass, budget);

        for item in self.data.items() {
            let mut terms: Vec<Term> = Vec::new();
            for recipe_key in &item.used_in_recipes {
                let Some(recipe) = self.enabled_recipe(recipe_key) else { continue };
                let rate = recipe.ingredient_rate(&item.id).unwrap_or(0.0);
                terms.push(Term::new(recipe_key, rate));
            }
            for recipe_key in &item.produced_from_recipes {
                let Some(recipe) = self.enabled_recipe(recipe_key) else { continue };
                let rate = recipe.product_rate(&item.id).unwrap_or(0.0);
                match terms.iter_mut().find(|t| &t.var == recipe_key) {
                    Some(term) => term.coef -= rate,
                    None => terms.push(Term::new(recipe_key, -rate)),
                }
            }
            if terms.is_empty() {
                continue;
            }

            let (name, bound) = if let Some(input) = budget.get(&item.id) {
                if input.amount.is_infinite() {
                    continue;
                }
                (format!("{} resource constraint", item.id), Bound::Upper(input.amount))
            } else if let Some(target) = self.rate_target(pass, &item.id) {
                (format!("{} final product constraint", item.id), Bound::Upper(-target.value))
            } else if pass.maximizes(&item.id) {
                for term in &terms {
                    objective.add(&term.var, term.coef * MAXIMIZE_TARGET_WEIGHTING);
                }
                (format!("{} final product constraint", item.id), Bound::Upper(0.0))
            } else {
                (format!("{} intermediates constraint", item.id), Bound::Upper(0.0))
            };
            lp.constraints.push(ConstraintRow { name, terms, bound });
        }

        lp.objective = lp
            .variables
            .iter()
            .zip(&objective.coefs)
            .map(|(var, &coef)| Term::new(var, coef))
            .collect();
        lp
    }

    fn rate_target(&self, pass: &PassKey, item: &str) -> Option<&'a RateTarget> {
        match pass {
            PassKey::Rates => self.request.rate_targets.item(item),
            PassKey::Maximize(_) => None,
        }
    }

    fn enabled_recipe(&self, key: &str) -> Option<&'a Recipe> {
        if self.request.is_recipe_enabled(key) {
            self.data.recipe(key)
        } else {
            None
        }
    }

    /// Adds the points row (rate pass) or folds points into the objective
    /// (points maximize pass).
    fn add_points(
        &self,
        lp: &mut LinearProgram,
        objective: &mut Objective<'_>,
        recipes: &[&Recipe],
        pass: &PassKey,
        budget: &Inputs,
    ) {
        let points_target = self.request.rate_targets.points();
        let rate_pass = *pass == PassKey::Rates && points_target.is_some();
        if !rate_pass && !pass.maximizes(POINTS_ITEM_KEY) {
            return;
        }

        let terms: Vec<Term> = recipes
            .iter()
            .map(|r| Term::new(&r.id, self.points_coef(r)))
            .collect();

        match points_target {
            Some(target) if rate_pass => {
                let mut intrinsic: f64 = budget
                    .iter()
                    .filter(|(_, input)| input.kind == InputKind::InputItem && input.amount.is_finite())
                    .map(|(key, input)| self.data.item_points(key) * input.amount)
                    .sum();
                intrinsic -= self
                    .request
                    .rate_targets
                    .by_item
                    .values()
                    .filter(|t| !t.is_points)
                    .map(|t| self.data.item_points(&t.item) * t.value)
                    .sum::<f64>();
                lp.constraints.push(ConstraintRow {
                    name: "sink points constraint".to_string(),
                    terms,
                    bound: Bound::Upper(-target.value + intrinsic / POINTS_SCALE),
                });
            }
            _ => {
                for term in &terms {
                    objective.add(&term.var, term.coef * MAXIMIZE_TARGET_WEIGHTING);
                }
            }
        }
    }
}
