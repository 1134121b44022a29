//! Production graph reconstruction.
//!
//! Turns the flat recipe multipliers of a solution into an explicit flow
//! graph. For each item the producers and consumers are matched greedily in
//! canonical recipe order, so the same solution always yields the same graph.
//! Demand left over after matching is fed from the item's input, supply left
//! over goes to a final-product or side-product node.

use std::collections::HashMap;

use tracing::warn;

use crate::data::GameData;
use crate::models::{
    GraphEdge, GraphNode, NodeType, ProductionGraph, ProductionSolution, EPSILON,
};
use crate::normalize::NormalizedRequest;

/// Remaining amount of one recipe's production or consumption of an item.
#[derive(Debug, Clone, Copy)]
struct ProductionAmount<'a> {
    recipe: &'a str,
    amount: f64,
}

#[derive(Debug, Default)]
struct ItemFlows<'a> {
    produced_by: Vec<ProductionAmount<'a>>,
    used_by: Vec<ProductionAmount<'a>>,
}

/// Which role a node plays for its key. An item can have at most one source
/// node and one sink node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Recipe,
    Source,
    Sink,
}

impl From<NodeType> for Slot {
    fn from(node_type: NodeType) -> Self {
        if node_type.is_source() {
            Slot::Source
        } else if node_type.is_sink() {
            Slot::Sink
        } else {
            Slot::Recipe
        }
    }
}

#[derive(Default)]
struct GraphBuilder {
    graph: ProductionGraph,
    index: HashMap<(String, Slot), usize>,
}

impl GraphBuilder {
    /// Creates a node or adds `multiplier` to the existing one, returning its id.
    fn add_node(&mut self, key: &str, node_type: NodeType, multiplier: f64) -> String {
        let slot = (key.to_string(), Slot::from(node_type));
        if let Some(&idx) = self.index.get(&slot) {
            let node = &mut self.graph.nodes[idx];
            node.multiplier += multiplier;
            return node.id.clone();
        }
        let id = format!("n{}", self.graph.nodes.len());
        self.graph.nodes.push(GraphNode {
            id: id.clone(),
            key: key.to_string(),
            node_type,
            multiplier,
        });
        self.index.insert(slot, self.graph.nodes.len() - 1);
        id
    }

    fn recipe_id(&self, recipe: &str) -> String {
        self.index
            .get(&(recipe.to_string(), Slot::Recipe))
            .map(|&idx| self.graph.nodes[idx].id.clone())
            .unwrap_or_default()
    }

    fn add_edge(&mut self, item: &str, from: String, to: String, rate: f64) {
        self.graph.edges.push(GraphEdge {
            key: item.to_string(),
            from,
            to,
            production_rate: rate,
        });
    }
}

/// Builds the flow graph of `solution`.
///
/// # Arguments
///
/// * `data` - Static dataset; its recipe order is the matching order
/// * `request` - Normalized request the solution was computed for
/// * `solution` - Recipe id → throughput multiplier
pub fn generate_production_graph(
    data: &GameData,
    request: &NormalizedRequest,
    solution: &ProductionSolution,
) -> ProductionGraph {
    let mut builder = GraphBuilder::default();
    let mut flows: Vec<(&str, ItemFlows)> = Vec::new();
    let mut flow_index: HashMap<&str, usize> = HashMap::new();

    for recipe in data.recipes() {
        let Some(&multiplier) = solution.get(&recipe.id) else { continue };
        for product in &recipe.products {
            let idx = item_flows(&mut flows, &mut flow_index, &product.item_class);
            flows[idx].1.produced_by.push(ProductionAmount {
                recipe: &recipe.id,
                amount: multiplier * product.per_minute,
            });
        }
        for ingredient in &recipe.ingredients {
            let idx = item_flows(&mut flows, &mut flow_index, &ingredient.item_class);
            flows[idx].1.used_by.push(ProductionAmount {
                recipe: &recipe.id,
                amount: multiplier * ingredient.per_minute,
            });
        }
        builder.add_node(&recipe.id, NodeType::Recipe, multiplier);
    }

    for (item, flow) in flows.iter_mut() {
        match_item(&mut builder, data, request, *item, flow);
    }

    builder.graph
}

fn item_flows<'a>(
    flows: &mut Vec<(&'a str, ItemFlows<'a>)>,
    index: &mut HashMap<&'a str, usize>,
    item: &'a str,
) -> usize {
    *index.entry(item).or_insert_with(|| {
        flows.push((item, ItemFlows::default()));
        flows.len() - 1
    })
}

/// Matches the producers and consumers of one item and emits its edges.
fn match_item(
    builder: &mut GraphBuilder,
    data: &GameData,
    request: &NormalizedRequest,
    item: &str,
    flow: &mut ItemFlows<'_>,
) {
    let ItemFlows { produced_by, used_by } = flow;

    // Pinned recipe-count targets get their own edge first.
    for producer in produced_by.iter_mut() {
        let Some(target) = request.rate_targets.recipe(producer.recipe) else { continue };
        let count = target.count_for(item);
        if count <= 0.0 {
            continue;
        }
        let per_minute = data
            .recipe(producer.recipe)
            .and_then(|r| r.product_rate(item))
            .unwrap_or(0.0);
        let amount = (count * per_minute).min(producer.amount);
        if amount < EPSILON {
            continue;
        }
        producer.amount -= amount;
        let to = builder.add_node(item, NodeType::FinalProduct, amount);
        let from = builder.recipe_id(producer.recipe);
        builder.add_edge(item, from, to, amount);
    }

    let (mut i, mut j) = (0, 0);
    while i < used_by.len() && j < produced_by.len() {
        if used_by[i].amount < EPSILON {
            i += 1;
            continue;
        }
        if produced_by[j].amount < EPSILON {
            j += 1;
            continue;
        }
        let rate = used_by[i].amount.min(produced_by[j].amount);
        let from = builder.recipe_id(produced_by[j].recipe);
        let to = builder.recipe_id(used_by[i].recipe);
        builder.add_edge(item, from, to, rate);
        used_by[i].amount -= rate;
        produced_by[j].amount -= rate;
    }

    for consumer in &used_by[i..] {
        if consumer.amount <= EPSILON {
            continue;
        }
        match request.inputs.get(item) {
            Some(input) => {
                let from = builder.add_node(item, input.kind.into(), consumer.amount);
                let to = builder.recipe_id(consumer.recipe);
                builder.add_edge(item, from, to, consumer.amount);
            }
            None => warn!(
                item,
                recipe = consumer.recipe,
                amount = consumer.amount,
                "demand has no producer and no input"
            ),
        }
    }

    let sink_type = if request.rate_targets.item(item).is_some()
        || request.is_maximize_target(item)
        || (request.has_points_target && data.item_points(item) > 0.0)
    {
        NodeType::FinalProduct
    } else {
        NodeType::SideProduct
    };
    for producer in &produced_by[j..] {
        if producer.amount <= EPSILON {
            continue;
        }
        let to = builder.add_node(item, sink_type, producer.amount);
        let from = builder.recipe_id(producer.recipe);
        builder.add_edge(item, from, to, producer.amount);
    }
}
