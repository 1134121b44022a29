//! Shared fixtures for the integration tests.
//!
//! Small hand-built datasets: a single-step chain (`Desc_A_C` into
//! `Desc_B_C`), a recipe with two products, and an iron line with a few side
//! branches. Also graph flow helpers.

#![allow(dead_code)]

use factory_planner::data::GameData;
use factory_planner::models::{
    BuildCost, Building, FactoryOptions, InputItemOption, InputResourceOption, Item, NodeType,
    ProductionGraph, ProductionItemOption, Recipe, RecipeItem, Resource,
};

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub fn item(id: &str, sink_points: f64) -> Item {
    Item {
        id: id.to_string(),
        slug: String::new(),
        name: id.to_string(),
        sink_points,
        is_ficsmas: false,
        used_in_recipes: Vec::new(),
        produced_from_recipes: Vec::new(),
    }
}

fn stacks(list: &[(&str, f64)]) -> Vec<RecipeItem> {
    list.iter()
        .map(|(item, per_minute)| RecipeItem {
            item_class: item.to_string(),
            per_minute: *per_minute,
        })
        .collect()
}

pub fn recipe(
    id: &str,
    building: &str,
    ingredients: &[(&str, f64)],
    products: &[(&str, f64)],
) -> Recipe {
    Recipe {
        id: id.to_string(),
        slug: String::new(),
        name: id.to_string(),
        is_alternate: false,
        ingredients: stacks(ingredients),
        products: stacks(products),
        produced_in: building.to_string(),
        is_ficsmas: false,
    }
}

pub fn building(id: &str, power: f64, area: f64, cost: &[(&str, f64)]) -> Building {
    Building {
        id: id.to_string(),
        slug: String::new(),
        name: id.to_string(),
        power,
        area,
        build_cost: cost
            .iter()
            .map(|(item, quantity)| BuildCost {
                item_class: item.to_string(),
                quantity: *quantity,
            })
            .collect(),
        is_ficsmas: false,
    }
}

pub fn resource(id: &str, max_extraction: Option<f64>) -> Resource {
    Resource {
        item_class: id.to_string(),
        max_extraction,
        relative_value: 1.0,
    }
}

/// `Recipe_AB_C` turns 60 A into 60 B per minute in a 10 MW machine.
pub fn chain_data() -> GameData {
    GameData::new(
        vec![item("Desc_A_C", 1.0), item("Desc_B_C", 10.0)],
        vec![recipe(
            "Recipe_AB_C",
            "Desc_Machine_C",
            &[("Desc_A_C", 60.0)],
            &[("Desc_B_C", 60.0)],
        )],
        vec![building("Desc_Machine_C", 10.0, 100.0, &[("Desc_B_C", 3.0)])],
        vec![resource("Desc_A_C", Some(600.0))],
        Vec::new(),
    )
    .expect("chain data is valid")
}

/// One recipe with two products, one of which feeds a second recipe.
pub fn split_data() -> GameData {
    GameData::new(
        vec![
            item("Desc_A_C", 1.0),
            item("Desc_X_C", 5.0),
            item("Desc_Y_C", 5.0),
            item("Desc_Z_C", 20.0),
        ],
        vec![
            recipe(
                "Recipe_Split_C",
                "Desc_Machine_C",
                &[("Desc_A_C", 60.0)],
                &[("Desc_X_C", 60.0), ("Desc_Y_C", 60.0)],
            ),
            recipe(
                "Recipe_XZ_C",
                "Desc_Machine_C",
                &[("Desc_X_C", 60.0)],
                &[("Desc_Z_C", 60.0)],
            ),
        ],
        vec![building("Desc_Machine_C", 10.0, 100.0, &[])],
        vec![resource("Desc_A_C", None)],
        Vec::new(),
    )
    .expect("split data is valid")
}

/// Ore, ingots, plates and rods, plus biomass power and a holiday recipe.
pub fn iron_data() -> GameData {
    let mut gift = item("Desc_Gift_C", 1.0);
    gift.is_ficsmas = true;

    let mut alternate_plate = recipe(
        "Recipe_Alternate_Plate_C",
        "Desc_Constructor_C",
        &[("Desc_Ore_C", 40.0)],
        &[("Desc_Plate_C", 20.0)],
    );
    alternate_plate.is_alternate = true;

    let mut gift_rod = recipe(
        "Recipe_GiftRod_C",
        "Desc_Constructor_C",
        &[("Desc_Gift_C", 10.0)],
        &[("Desc_Rod_C", 10.0)],
    );
    gift_rod.is_ficsmas = true;

    GameData::new(
        vec![
            item("Desc_Ore_C", 1.0),
            item("Desc_Ingot_C", 2.0),
            item("Desc_Plate_C", 6.0),
            item("Desc_Rod_C", 4.0),
            item("Desc_Leaves_C", 3.0),
            item("Desc_Biomass_C", 12.0),
            gift,
            item("Desc_Water_C", 0.0),
        ],
        vec![
            recipe(
                "Recipe_Ingot_C",
                "Desc_Smelter_C",
                &[("Desc_Ore_C", 30.0)],
                &[("Desc_Ingot_C", 30.0)],
            ),
            recipe(
                "Recipe_Plate_C",
                "Desc_Constructor_C",
                &[("Desc_Ingot_C", 30.0)],
                &[("Desc_Plate_C", 20.0)],
            ),
            recipe(
                "Recipe_Rod_C",
                "Desc_Constructor_C",
                &[("Desc_Ingot_C", 15.0)],
                &[("Desc_Rod_C", 15.0)],
            ),
            alternate_plate,
            recipe(
                "Recipe_Biomass_C",
                "Desc_Constructor_C",
                &[("Desc_Leaves_C", 120.0)],
                &[("Desc_Biomass_C", 60.0)],
            ),
            gift_rod,
            recipe(
                "Recipe_Power_C",
                "Desc_Generator_C",
                &[("Desc_Biomass_C", 30.0), ("Desc_Water_C", 45.0)],
                &[],
            ),
        ],
        vec![
            building("Desc_Smelter_C", 4.0, 54.0, &[("Desc_Rod_C", 5.0)]),
            building(
                "Desc_Constructor_C",
                4.0,
                80.0,
                &[("Desc_Plate_C", 2.0), ("Desc_Rod_C", 4.0)],
            ),
            building("Desc_Generator_C", -75.0, 260.0, &[("Desc_Plate_C", 10.0)]),
        ],
        vec![
            resource("Desc_Ore_C", Some(600.0)),
            resource("Desc_Water_C", None),
        ],
        vec!["Desc_Leaves_C".to_string(), "Desc_Gift_C".to_string()],
    )
    .expect("iron data is valid")
}

pub fn resource_input(key: &str, value: f64, weight: f64) -> InputResourceOption {
    InputResourceOption {
        item_key: key.to_string(),
        value: value.into(),
        weight: weight.into(),
        unlimited: false,
    }
}

pub fn unlimited_resource(key: &str, weight: f64) -> InputResourceOption {
    InputResourceOption {
        unlimited: true,
        ..resource_input(key, 0.0, weight)
    }
}

pub fn input_item(key: &str, value: f64) -> InputItemOption {
    InputItemOption {
        item_key: key.to_string(),
        value: value.into(),
        unlimited: false,
    }
}

pub fn per_minute(key: &str, value: f64) -> ProductionItemOption {
    ProductionItemOption {
        item_key: key.to_string(),
        mode: "per-minute".to_string(),
        value: value.into(),
    }
}

pub fn maximize(key: &str, priority: f64) -> ProductionItemOption {
    ProductionItemOption {
        item_key: key.to_string(),
        mode: "maximize".to_string(),
        value: priority.into(),
    }
}

pub fn recipe_target(key: &str, recipe: &str, count: f64) -> ProductionItemOption {
    ProductionItemOption {
        item_key: key.to_string(),
        mode: recipe.to_string(),
        value: count.into(),
    }
}

pub fn options(
    input_resources: Vec<InputResourceOption>,
    production_items: Vec<ProductionItemOption>,
    recipes: &[&str],
) -> FactoryOptions {
    FactoryOptions {
        input_resources,
        production_items,
        allowed_recipes: recipes.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
}

pub fn inflow(graph: &ProductionGraph, node_id: &str, item: &str) -> f64 {
    graph
        .edges
        .iter()
        .filter(|e| e.to == node_id && e.key == item)
        .map(|e| e.production_rate)
        .sum()
}

pub fn outflow(graph: &ProductionGraph, node_id: &str, item: &str) -> f64 {
    graph
        .edges
        .iter()
        .filter(|e| e.from == node_id && e.key == item)
        .map(|e| e.production_rate)
        .sum()
}

/// Every recipe node receives and emits exactly what its multiplier implies.
pub fn assert_recipe_flows_balance(data: &GameData, graph: &ProductionGraph) {
    for node in graph.nodes.iter().filter(|n| n.node_type == NodeType::Recipe) {
        let recipe = data.recipe(&node.key).unwrap();
        for ingredient in &recipe.ingredients {
            let expected = node.multiplier * ingredient.per_minute;
            let actual = inflow(graph, &node.id, &ingredient.item_class);
            assert!(
                approx_eq(actual, expected),
                "{} receives {} {} instead of {}",
                node.key,
                actual,
                ingredient.item_class,
                expected
            );
        }
        for product in &recipe.products {
            let expected = node.multiplier * product.per_minute;
            let actual = outflow(graph, &node.id, &product.item_class);
            assert!(
                approx_eq(actual, expected),
                "{} emits {} {} instead of {}",
                node.key,
                actual,
                product.item_class,
                expected
            );
        }
    }
}
