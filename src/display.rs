//! Display and formatting utilities for the factory planner.
//!
//! This module provides functions for formatting numbers and printing a solved
//! production plan to the terminal.

use crate::data::GameData;
use crate::models::{GraphNode, NodeType, Report, SolverResults};

/// Formats an amount with at most three decimals, dropping trailing zeros.
///
/// # Example
///
/// ```
/// use factory_planner::display::format_amount;
///
/// assert_eq!(format_amount(60.0), "60");
/// assert_eq!(format_amount(12.5), "12.5");
/// assert_eq!(format_amount(1.23456), "1.235");
/// ```
pub fn format_amount(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Formats a compute time given in milliseconds.
///
/// # Example
///
/// ```
/// use factory_planner::display::format_compute_time;
///
/// assert_eq!(format_compute_time(12.34), "12.3ms");
/// assert_eq!(format_compute_time(2500.0), "2.50s");
/// ```
pub fn format_compute_time(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Display name of a graph node's key.
fn node_name(data: &GameData, node: &GraphNode) -> String {
    let name = match node.node_type {
        NodeType::Recipe => data.recipe(&node.key).map(|r| r.name.clone()),
        _ => data.item(&node.key).map(|i| i.name.clone()),
    };
    name.unwrap_or_else(|| node.key.clone())
}

fn item_name(data: &GameData, key: &str) -> String {
    data.item(key)
        .map(|i| i.name.clone())
        .unwrap_or_else(|| key.to_string())
}

fn print_nodes<'g>(
    data: &GameData,
    nodes: impl Iterator<Item = &'g GraphNode>,
    title: &str,
    unit: &str,
) {
    let nodes: Vec<&GraphNode> = nodes.collect();
    if nodes.is_empty() {
        return;
    }
    println!();
    println!("[{}]", title);
    println!("----------------------------------------------------------------");
    for node in nodes {
        println!(
            "  {:<40} {:>12}{}",
            node_name(data, node),
            format_amount(node.multiplier),
            unit
        );
    }
}

/// Displays the complete solve results to stdout.
///
/// This function prints:
/// - The recipes to build and how many buildings each needs
/// - Inputs consumed, final products and side products
/// - Every item flow between nodes
/// - The report summary
pub fn display_results(results: &SolverResults, data: &GameData) {
    println!();
    println!("+================================================================+");
    println!("|                  PRODUCTION PLANNER RESULTS                    |");
    println!("+================================================================+");

    if !results.error.is_empty() {
        println!();
        println!("[ERROR] {}", results.error);
        println!("  Compute time: {}", format_compute_time(results.compute_time));
        return;
    }

    if let Some(graph) = &results.production_graph {
        let of_type = |wanted: NodeType| move |t: NodeType| t == wanted;
        print_nodes(data, graph.nodes_where(of_type(NodeType::Recipe)), "BUILDINGS", "x");
        print_nodes(data, graph.nodes_where(NodeType::is_source), "INPUTS", "/min");
        print_nodes(
            data,
            graph.nodes_where(of_type(NodeType::FinalProduct)),
            "FINAL PRODUCTS",
            "/min",
        );
        print_nodes(
            data,
            graph.nodes_where(of_type(NodeType::SideProduct)),
            "SIDE PRODUCTS",
            "/min",
        );

        println!();
        println!("[FLOWS]");
        println!("----------------------------------------------------------------");
        for edge in &graph.edges {
            let from = graph
                .node_by_id(&edge.from)
                .map(|n| node_name(data, n))
                .unwrap_or_else(|| edge.from.clone());
            let to = graph
                .node_by_id(&edge.to)
                .map(|n| node_name(data, n))
                .unwrap_or_else(|| edge.to.clone());
            println!(
                "  {} -> {}: {} {}/min",
                from,
                to,
                format_amount(edge.production_rate),
                item_name(data, &edge.key)
            );
        }
    }

    if let Some(report) = &results.report {
        display_report(report, data);
    }

    println!();
    println!("  Compute time: {}", format_compute_time(results.compute_time));
    println!();
}

/// Displays the report summary and building list.
pub fn display_report(report: &Report, data: &GameData) {
    println!();
    println!("[SUMMARY]");
    println!("----------------------------------------------------------------");
    println!("  Points Produced:      {}/min", format_amount(report.points_produced));
    println!("  Power Usage:          {} MW", format_amount(report.power_usage_estimate));
    println!("  Resource Efficiency:  {}", format_amount(report.resource_efficiency_score));
    println!("  Total Build Area:     {} m2", format_amount(report.total_build_area));
    println!("  Foundations:          {}", format_amount(report.estimated_foundations));

    if report.buildings_used.is_empty() {
        return;
    }
    println!();
    println!("[BUILDINGS USED]");
    println!("----------------------------------------------------------------");
    for (key, usage) in &report.buildings_used {
        let name = data
            .building(key)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| key.clone());
        println!("  {:<40} {:>6}", name, format_amount(usage.count));
        for (item, amount) in &usage.material_cost {
            println!("      {:<36} {:>6}", item_name(data, item), format_amount(*amount));
        }
    }

    println!();
    println!("[TOTAL MATERIAL COST]");
    println!("----------------------------------------------------------------");
    for (item, amount) in &report.total_material_cost {
        println!("  {:<40} {:>6}", item_name(data, item), format_amount(*amount));
    }
}
