//! Static game data loading and indexing.
//!
//! The dataset is stored as five JSON documents in a data directory, each one
//! an object keyed by id. The key order of every document is the canonical
//! order of that table: the solver iterates recipes and items in this order,
//! so it decides how producers are matched to consumers in the production
//! graph.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::DataError;
use crate::models::{Building, Item, Recipe, Resource};

pub const ITEMS_FILE: &str = "items.json";
pub const RECIPES_FILE: &str = "recipes.json";
pub const BUILDINGS_FILE: &str = "buildings.json";
pub const RESOURCES_FILE: &str = "resources.json";
pub const HAND_GATHERED_FILE: &str = "handGatheredItems.json";

/// Read-only tables of items, recipes, buildings and resources.
///
/// Records are kept in canonical order with an id index next to them. The
/// per-item recipe lists are rebuilt from the recipe table on construction, so
/// they always agree with it.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    items: Vec<Item>,
    item_index: HashMap<String, usize>,
    recipes: Vec<Recipe>,
    recipe_index: HashMap<String, usize>,
    buildings: Vec<Building>,
    building_index: HashMap<String, usize>,
    resources: Vec<Resource>,
    resource_index: HashMap<String, usize>,
    hand_gathered: Vec<String>,
}

impl GameData {
    /// Indexes a set of tables.
    ///
    /// Items referenced by a recipe but missing from `items` are appended with
    /// their id as name and no sink value.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownBuilding`] if a recipe runs in a building
    /// that is not in `buildings`.
    pub fn new(
        items: Vec<Item>,
        recipes: Vec<Recipe>,
        buildings: Vec<Building>,
        resources: Vec<Resource>,
        hand_gathered: Vec<String>,
    ) -> Result<Self, DataError> {
        let building_index = index_by(&buildings, |b| &b.id);
        for recipe in &recipes {
            if !building_index.contains_key(&recipe.produced_in) {
                return Err(DataError::UnknownBuilding {
                    recipe: recipe.id.clone(),
                    building: recipe.produced_in.clone(),
                });
            }
        }

        let mut items = items;
        let mut item_index = index_by(&items, |i| &i.id);
        for item in items.iter_mut() {
            item.used_in_recipes.clear();
            item.produced_from_recipes.clear();
        }

        for recipe in &recipes {
            for ingredient in &recipe.ingredients {
                let idx = ensure_item(&mut items, &mut item_index, &ingredient.item_class);
                push_unique(&mut items[idx].used_in_recipes, &recipe.id);
            }
            for product in &recipe.products {
                let idx = ensure_item(&mut items, &mut item_index, &product.item_class);
                push_unique(&mut items[idx].produced_from_recipes, &recipe.id);
            }
        }

        Ok(GameData {
            item_index,
            items,
            recipe_index: index_by(&recipes, |r| &r.id),
            recipes,
            building_index,
            buildings,
            resource_index: index_by(&resources, |r| &r.item_class),
            resources,
            hand_gathered,
        })
    }

    pub fn item(&self, key: &str) -> Option<&Item> {
        self.item_index.get(key).map(|&i| &self.items[i])
    }

    pub fn recipe(&self, key: &str) -> Option<&Recipe> {
        self.recipe_index.get(key).map(|&i| &self.recipes[i])
    }

    pub fn building(&self, key: &str) -> Option<&Building> {
        self.building_index.get(key).map(|&i| &self.buildings[i])
    }

    /// Resource extracted as `item_key`, if it is a map resource.
    pub fn resource(&self, item_key: &str) -> Option<&Resource> {
        self.resource_index.get(item_key).map(|&i| &self.resources[i])
    }

    /// Items in canonical order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Recipes in canonical order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Items that can only be gathered by hand.
    pub fn hand_gathered_items(&self) -> &[String] {
        &self.hand_gathered
    }

    /// Sink points for one unit of an item. Holiday items and unknown ids
    /// score nothing.
    pub fn item_points(&self, key: &str) -> f64 {
        match self.item(key) {
            Some(item) if !item.is_ficsmas => item.sink_points,
            _ => 0.0,
        }
    }

    /// Recipes a fresh planner starts with: every standard, non-event recipe.
    pub fn default_enabled_recipes(&self) -> HashSet<String> {
        self.recipes
            .iter()
            .filter(|r| !r.is_alternate && !r.is_ficsmas)
            .map(|r| r.id.clone())
            .collect()
    }
}

fn index_by<T>(records: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (key(r).clone(), i))
        .collect()
}

fn ensure_item(items: &mut Vec<Item>, index: &mut HashMap<String, usize>, key: &str) -> usize {
    if let Some(&idx) = index.get(key) {
        return idx;
    }
    items.push(Item {
        id: key.to_string(),
        slug: String::new(),
        name: key.to_string(),
        sink_points: 0.0,
        is_ficsmas: false,
        used_in_recipes: Vec::new(),
        produced_from_recipes: Vec::new(),
    });
    index.insert(key.to_string(), items.len() - 1);
    items.len() - 1
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Parses one id-keyed JSON table, keeping document order.
fn parse_table<T: DeserializeOwned>(file: &str, json: &str) -> Result<Vec<(String, T)>, DataError> {
    let parse_err = |source| DataError::Parse {
        file: file.to_string(),
        source,
    };
    let table: Map<String, Value> = serde_json::from_str(json).map_err(parse_err)?;
    table
        .into_iter()
        .map(|(key, value)| Ok((key, serde_json::from_value(value).map_err(parse_err)?)))
        .collect()
}

/// Builds a [`GameData`] from the contents of the five data documents.
///
/// # Arguments
///
/// * `items` - `items.json`, item id → item
/// * `recipes` - `recipes.json`, recipe id → recipe
/// * `buildings` - `buildings.json`, building id → building
/// * `resources` - `resources.json`, resource id → resource
/// * `hand_gathered` - `handGatheredItems.json`, item id → item id
///
/// # Example
///
/// ```
/// use factory_planner::data::parse_game_data;
///
/// let data = parse_game_data(
///     r#"{ "Desc_Ore_C": { "name": "Ore", "sinkPoints": 1 },
///          "Desc_Ingot_C": { "name": "Ingot", "sinkPoints": 2 } }"#,
///     r#"{ "Recipe_Ingot_C": { "name": "Ingot",
///          "ingredients": [{ "itemClass": "Desc_Ore_C", "perMinute": 30 }],
///          "products": [{ "itemClass": "Desc_Ingot_C", "perMinute": 30 }],
///          "producedIn": "Desc_Smelter_C" } }"#,
///     r#"{ "Desc_Smelter_C": { "name": "Smelter", "power": 4, "area": 54 } }"#,
///     r#"{ "Desc_Ore_C": { "itemClass": "Desc_Ore_C", "maxExtraction": 600 } }"#,
///     "{}",
/// ).unwrap();
///
/// assert_eq!(data.item("Desc_Ore_C").unwrap().used_in_recipes, vec!["Recipe_Ingot_C"]);
/// ```
pub fn parse_game_data(
    items: &str,
    recipes: &str,
    buildings: &str,
    resources: &str,
    hand_gathered: &str,
) -> Result<GameData, DataError> {
    let items = parse_table::<Item>(ITEMS_FILE, items)?
        .into_iter()
        .map(|(id, item)| Item { id, ..item })
        .collect();
    let recipes = parse_table::<Recipe>(RECIPES_FILE, recipes)?
        .into_iter()
        .map(|(id, recipe)| Recipe { id, ..recipe })
        .collect();
    let buildings = parse_table::<Building>(BUILDINGS_FILE, buildings)?
        .into_iter()
        .map(|(id, building)| Building { id, ..building })
        .collect();
    let resources = parse_table::<Resource>(RESOURCES_FILE, resources)?
        .into_iter()
        .map(|(_, resource)| resource)
        .collect();
    let hand_gathered = parse_table::<Value>(HAND_GATHERED_FILE, hand_gathered)?
        .into_iter()
        .map(|(id, _)| id)
        .collect();

    GameData::new(items, recipes, buildings, resources, hand_gathered)
}

/// Loads all game data from the data directory.
///
/// # Arguments
///
/// * `data_dir` - Path to the directory containing the JSON tables
///
/// # Returns
///
/// The indexed [`GameData`], or an error if any file cannot be read or parsed.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use factory_planner::data::load_all_data;
///
/// let data = load_all_data(Path::new("data")).unwrap();
/// println!("Loaded {} recipes", data.recipes().len());
/// ```
pub fn load_all_data(data_dir: &Path) -> Result<GameData, DataError> {
    let read = |name: &str| {
        let file = data_dir.join(name);
        fs::read_to_string(&file).map_err(|source| DataError::Io { file, source })
    };

    parse_game_data(
        &read(ITEMS_FILE)?,
        &read(RECIPES_FILE)?,
        &read(BUILDINGS_FILE)?,
        &read(RESOURCES_FILE)?,
        &read(HAND_GATHERED_FILE)?,
    )
}
