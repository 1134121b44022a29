//! WebAssembly bindings for the factory planner.
//!
//! This module provides JavaScript-accessible functions that take and return
//! JSON strings. The game data is embedded in the binary.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::data::{parse_game_data, GameData};
use crate::models::{FactoryOptions, SolverResults};
use crate::solver::{now_ms, solve_options};

/// Parses the game data embedded at build time.
fn get_embedded_data() -> Result<GameData, String> {
    parse_game_data(
        include_str!("../data/items.json"),
        include_str!("../data/recipes.json"),
        include_str!("../data/buildings.json"),
        include_str!("../data/resources.json"),
        include_str!("../data/handGatheredItems.json"),
    )
    .map_err(|e| format!("Embedded data is invalid: {}", e))
}

fn failure(error: String, timestamp: f64) -> SolverResults {
    report_to_console(&error);
    SolverResults {
        production_graph: None,
        report: None,
        timestamp,
        compute_time: now_ms() - timestamp,
        error,
    }
}

#[cfg(target_arch = "wasm32")]
fn report_to_console(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn report_to_console(_message: &str) {}

/// Solves a production plan.
///
/// Takes a JSON [`FactoryOptions`] document and returns a JSON
/// [`SolverResults`] document. Failures are reported in its `error` field.
#[wasm_bindgen]
pub fn solve(options_json: &str) -> String {
    let timestamp = now_ms();
    let results = match serde_json::from_str::<FactoryOptions>(options_json) {
        Err(e) => failure(format!("Invalid input: {}", e), timestamp),
        Ok(options) => match get_embedded_data() {
            Err(e) => failure(e, timestamp),
            Ok(data) => {
                let results = solve_options(&options, &data);
                if !results.error.is_empty() {
                    report_to_console(&results.error);
                }
                results
            }
        },
    };
    serde_json::to_string(&results).unwrap_or_default()
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Lists the recipes a new plan starts with enabled, as a JSON array of ids
/// in canonical order.
#[wasm_bindgen]
pub fn get_default_recipes() -> String {
    let Ok(data) = get_embedded_data() else {
        return "[]".to_string();
    };
    let enabled = data.default_enabled_recipes();
    let ids: Vec<&str> = data
        .recipes()
        .iter()
        .filter(|r| enabled.contains(&r.id))
        .map(|r| r.id.as_str())
        .collect();
    serde_json::to_string(&ids).unwrap_or_default()
}

/// Lists items that can be requested as outputs, as JSON `{key, name}` pairs.
#[wasm_bindgen]
pub fn get_target_items() -> String {
    #[derive(Serialize)]
    struct ItemInfo<'a> {
        key: &'a str,
        name: &'a str,
    }

    let Ok(data) = get_embedded_data() else {
        return "[]".to_string();
    };
    let items: Vec<ItemInfo> = data
        .items()
        .iter()
        .filter(|i| !i.produced_from_recipes.is_empty())
        .map(|i| ItemInfo {
            key: &i.id,
            name: &i.name,
        })
        .collect();
    serde_json::to_string(&items).unwrap_or_default()
}
