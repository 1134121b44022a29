//! # Factory Planner
//!
//! A command-line tool and library for computing optimal production plans in
//! Satisfactory-style factory building games.
//!
//! Given the resources and items available, the outputs wanted and the
//! recipes unlocked, the planner works out how many buildings must run each
//! recipe, reconstructs the flow of items between them and reports what the
//! plan costs:
//!
//! - Hard per-minute targets and exact building-count targets
//! - Prioritized "maximize" targets solved after the hard targets
//! - Sink points as a target currency
//! - Power, build area, foundations and construction materials
//!
//! ## Modules
//!
//! - [`models`] - Core data structures for game data, configuration, graphs and reports
//! - [`data`] - JSON game data loading
//! - [`normalize`] - Configuration validation
//! - [`lp`] - Linear program description and solver backends
//! - [`model`] - Linear program construction for each solver pass
//! - [`solver`] - Multi-pass solving
//! - [`graph`] - Production graph reconstruction
//! - [`report`] - Plan metrics
//! - [`display`] - Output formatting and display utilities
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```no_run
//! use factory_planner::{
//!     data::load_all_data,
//!     display::display_results,
//!     models::{FactoryOptions, ProductionItemOption, InputResourceOption},
//!     solver::ProductionSolver,
//! };
//! use std::path::Path;
//!
//! let data = load_all_data(Path::new("data")).unwrap();
//!
//! let options = FactoryOptions {
//!     input_resources: vec![InputResourceOption {
//!         item_key: "Desc_OreIron_C".to_string(),
//!         value: 240.0.into(),
//!         weight: 1.0.into(),
//!         unlimited: false,
//!     }],
//!     production_items: vec![ProductionItemOption {
//!         item_key: "Desc_IronPlate_C".to_string(),
//!         mode: "per-minute".to_string(),
//!         value: 60.0.into(),
//!     }],
//!     allowed_recipes: data.default_enabled_recipes(),
//!     ..Default::default()
//! };
//!
//! let results = ProductionSolver::new(&options, &data).unwrap().exec();
//! display_results(&results, &data);
//! ```
//!
//! ## Solving Strategy
//!
//! 1. **Rate pass**: meets every per-minute and building-count target at the
//!    lowest weighted cost of power, resources and recipe complexity.
//!
//! 2. **Maximize passes**: one per maximize target, highest priority first,
//!    each using only the inputs the earlier passes left unused.

pub mod data;
pub mod display;
pub mod error;
pub mod graph;
pub mod lp;
pub mod model;
pub mod models;
pub mod normalize;
pub mod report;
pub mod solver;
pub mod wasm;
