//! Request normalization.
//!
//! Turns a raw [`FactoryOptions`] into the validated inputs, targets and
//! weights the model builder works on. Every failure here happens before any
//! linear program is built.

use std::collections::HashSet;

use tracing::debug;

use crate::data::GameData;
use crate::error::SolverError;
use crate::models::{
    FactoryOptions, GlobalWeights, Input, InputKind, Inputs, MaximizeTarget, RateTarget,
    RateTargets, RecipeTarget, GIFT_ITEM_KEY, POINTS_ITEM_KEY,
};

/// Weight given to hand-gathered inputs so they are used only as a last resort.
pub const HAND_GATHERED_WEIGHT: f64 = 1000.0;

const PER_MINUTE_MODE: &str = "per-minute";
const MAXIMIZE_MODE: &str = "maximize";

/// A validated solve request.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub weights: GlobalWeights,
    pub inputs: Inputs,
    pub rate_targets: RateTargets,
    /// Sorted by descending priority
    pub maximize_targets: Vec<MaximizeTarget>,
    /// Whether any request targets sink points
    pub has_points_target: bool,
    pub enabled_recipes: HashSet<String>,
}

impl NormalizedRequest {
    pub fn is_recipe_enabled(&self, key: &str) -> bool {
        self.enabled_recipes.contains(key)
    }

    pub fn is_maximize_target(&self, key: &str) -> bool {
        self.maximize_targets.iter().any(|t| t.key == key)
    }
}

/// Rejects NaN and negative numbers.
fn validate_number(value: f64, field: impl FnOnce() -> String) -> Result<f64, SolverError> {
    if value.is_nan() {
        Err(SolverError::not_a_number(field()))
    } else if value < 0.0 {
        Err(SolverError::negative(field()))
    } else {
        Ok(value)
    }
}

/// Scales the cost weights so the larger of the resource and power weights is
/// 1 and the complexity weight lies in `0..=10`.
///
/// # Example
///
/// ```
/// use factory_planner::normalize::normalize_weights;
///
/// let w = normalize_weights(1000.0, 1.0, 1.0);
/// assert_eq!(w.resources, 1.0);
/// assert_eq!(w.power, 0.001);
/// assert!((w.complexity - 0.01).abs() < 1e-12);
/// ```
pub fn normalize_weights(resources: f64, power: f64, complexity: f64) -> GlobalWeights {
    let max = resources.max(power);
    if max <= 0.0 {
        return GlobalWeights {
            resources: 0.0,
            power: 0.0,
            complexity: if complexity > 0.0 { 10.0 } else { 0.0 },
        };
    }
    GlobalWeights {
        resources: resources / max,
        power: power / max,
        complexity: (complexity / (max / 10.0)).min(10.0),
    }
}

/// Validates and canonicalizes a planner configuration.
///
/// # Errors
///
/// Any of the validation variants of [`SolverError`]: invalid numbers, an
/// item used as both input and output, duplicate maximize priorities, a
/// disabled or unknown target recipe, or no outputs at all.
pub fn normalize(options: &FactoryOptions, data: &GameData) -> Result<NormalizedRequest, SolverError> {
    let weighting = &options.weighting_options;
    let weights = normalize_weights(
        validate_number(weighting.resources.value(), || "resources weight".into())?,
        validate_number(weighting.power.value(), || "power weight".into())?,
        validate_number(weighting.complexity.value(), || "complexity weight".into())?,
    );

    let inputs = collect_inputs(options, data)?;

    let mut rate_targets = RateTargets::default();
    let mut maximize_targets: Vec<MaximizeTarget> = Vec::new();
    let mut has_points_target = false;

    for item in &options.production_items {
        if item.item_key.is_empty() {
            continue;
        }
        let amount = validate_number(item.value.value(), || format!("target {}", item.item_key))?;
        if amount == 0.0 {
            continue;
        }
        if inputs.contains_key(&item.item_key) {
            return Err(SolverError::ConflictingIO {
                item: item.item_key.clone(),
            });
        }
        let is_points = item.item_key == POINTS_ITEM_KEY;
        has_points_target |= is_points;

        match item.mode.as_str() {
            PER_MINUTE_MODE => {
                add_item_target(&mut rate_targets, &item.item_key, amount, is_points);
            }
            MAXIMIZE_MODE => match maximize_targets.iter_mut().find(|t| t.key == item.item_key) {
                Some(existing) => existing.priority = existing.priority.max(amount),
                None => maximize_targets.push(MaximizeTarget {
                    key: item.item_key.clone(),
                    priority: amount,
                }),
            },
            recipe_key => {
                let invalid_mode = || SolverError::InvalidOutputMode {
                    item: item.item_key.clone(),
                    mode: item.mode.clone(),
                };
                let recipe = data.recipe(recipe_key).ok_or_else(invalid_mode)?;
                if !options.allowed_recipes.contains(recipe_key) {
                    return Err(SolverError::DisabledRecipeTargeted {
                        recipe: recipe_key.to_string(),
                    });
                }
                let per_minute = recipe.product_rate(&item.item_key).ok_or_else(invalid_mode)?;

                add_item_target(&mut rate_targets, &item.item_key, per_minute * amount, false);
                rate_targets
                    .by_recipe
                    .entry(recipe_key.to_string())
                    .or_insert_with(|| RecipeTarget {
                        recipe: recipe_key.to_string(),
                        ..RecipeTarget::default()
                    })
                    .pin(&item.item_key, amount);
            }
        }
    }

    maximize_targets.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    if let Some(pair) = maximize_targets
        .windows(2)
        .find(|pair| pair[0].priority == pair[1].priority)
    {
        return Err(SolverError::DuplicatePriority {
            priority: pair[0].priority,
        });
    }

    if rate_targets.is_empty() && maximize_targets.is_empty() {
        return Err(SolverError::NoOutputsSpecified);
    }

    debug!(
        inputs = inputs.len(),
        rate_targets = rate_targets.by_item.len(),
        recipe_targets = rate_targets.by_recipe.len(),
        maximize_targets = maximize_targets.len(),
        "normalized request"
    );

    Ok(NormalizedRequest {
        weights,
        inputs,
        rate_targets,
        maximize_targets,
        has_points_target,
        enabled_recipes: options.allowed_recipes.clone(),
    })
}

fn add_item_target(targets: &mut RateTargets, key: &str, value: f64, is_points: bool) {
    targets
        .by_item
        .entry(key.to_string())
        .and_modify(|t| t.value += value)
        .or_insert_with(|| RateTarget {
            item: key.to_string(),
            value,
            is_points,
        });
}

/// Builds the input table: map resources first, then plain items merged into
/// them, then hand-gathered items.
fn collect_inputs(options: &FactoryOptions, data: &GameData) -> Result<Inputs, SolverError> {
    let mut inputs = Inputs::new();

    for resource in &options.input_resources {
        if data.resource(&resource.item_key).is_none() {
            continue;
        }
        let amount = if resource.unlimited {
            f64::INFINITY
        } else {
            validate_number(resource.value.value(), || format!("input {}", resource.item_key))?
        };
        if amount == 0.0 {
            continue;
        }
        let weight = validate_number(resource.weight.value(), || {
            format!("weight of {}", resource.item_key)
        })?;
        inputs.insert(
            resource.item_key.clone(),
            Input {
                amount,
                weight,
                kind: InputKind::Resource,
            },
        );
    }

    let max_weight = inputs.values().map(|i| i.weight).fold(0.0, f64::max);
    if max_weight > 0.0 {
        for input in inputs.values_mut() {
            input.weight /= max_weight;
        }
    }

    for item in &options.input_items {
        if item.item_key.is_empty() {
            continue;
        }
        let amount = if item.unlimited {
            f64::INFINITY
        } else {
            validate_number(item.value.value(), || format!("input {}", item.item_key))?
        };
        if amount == 0.0 {
            continue;
        }
        inputs
            .entry(item.item_key.clone())
            .and_modify(|i| i.amount += amount)
            .or_insert(Input {
                amount,
                weight: 0.0,
                kind: InputKind::InputItem,
            });
    }

    let hand_gathered = Input {
        amount: f64::INFINITY,
        weight: HAND_GATHERED_WEIGHT,
        kind: InputKind::HandGathered,
    };
    if options.allow_hand_gathered_items {
        for key in data.hand_gathered_items() {
            inputs.insert(key.clone(), hand_gathered.clone());
        }
    }
    inputs.insert(GIFT_ITEM_KEY.to_string(), hand_gathered);

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_number() {
        assert_eq!(validate_number(3.0, || "x".into()), Ok(3.0));
        assert_eq!(validate_number(f64::INFINITY, || "x".into()), Ok(f64::INFINITY));
        assert!(matches!(
            validate_number(-1.0, || "x".into()),
            Err(SolverError::InvalidValue { reason: "negative number", .. })
        ));
        assert!(matches!(
            validate_number(f64::NAN, || "x".into()),
            Err(SolverError::InvalidValue { reason: "not a number", .. })
        ));
    }

    #[test]
    fn test_normalize_weights_power_heavy() {
        let w = normalize_weights(1.0, 4.0, 2.0);
        assert_eq!(w.power, 1.0);
        assert_eq!(w.resources, 0.25);
        assert_eq!(w.complexity, 5.0);
    }

    #[test]
    fn test_normalize_weights_caps_complexity() {
        let w = normalize_weights(1.0, 1.0, 50.0);
        assert_eq!(w.resources.max(w.power), 1.0);
        assert_eq!(w.complexity, 10.0);
    }

    #[test]
    fn test_normalize_weights_all_zero() {
        let w = normalize_weights(0.0, 0.0, 0.0);
        assert_eq!(w, GlobalWeights { resources: 0.0, power: 0.0, complexity: 0.0 });
    }
}
