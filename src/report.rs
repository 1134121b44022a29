//! Plan metrics derived from a production graph.

use crate::data::GameData;
use crate::models::{Inputs, NodeType, ProductionGraph, Report};

/// Area of one foundation in square metres.
const FOUNDATION_AREA: f64 = 64.0;

/// Aggregates power, area, building, material, points and resource metrics.
///
/// Partial buildings count as whole ones for area, counts and materials;
/// power scales with the exact multiplier. Resource efficiency weighs each
/// resource node by its normalized input weight.
pub fn generate_production_report(
    data: &GameData,
    inputs: &Inputs,
    graph: &ProductionGraph,
) -> Report {
    let mut report = Report::default();

    for node in &graph.nodes {
        match node.node_type {
            NodeType::Recipe => {
                let Some(building) = data
                    .recipe(&node.key)
                    .and_then(|r| data.building(&r.produced_in))
                else {
                    continue;
                };
                let count = node.multiplier.ceil();

                report.power_usage_estimate += node.multiplier * building.power;
                report.total_build_area += count * building.area;

                let usage = report.buildings_used.entry(building.id.clone()).or_default();
                usage.count += count;
                for cost in &building.build_cost {
                    let amount = count * cost.quantity;
                    *usage.material_cost.entry(cost.item_class.clone()).or_default() += amount;
                    *report
                        .total_material_cost
                        .entry(cost.item_class.clone())
                        .or_default() += amount;
                }
            }
            NodeType::FinalProduct => {
                report.points_produced += node.multiplier * data.item_points(&node.key);
            }
            NodeType::Resource => {
                let weight = inputs.get(&node.key).map_or(0.0, |i| i.weight);
                report.resource_efficiency_score += node.multiplier * weight;
            }
            NodeType::SideProduct | NodeType::InputItem | NodeType::HandGatheredResource => {}
        }
    }

    report.estimated_foundations = (2.0 * report.total_build_area / FOUNDATION_AREA).ceil();
    report
}
