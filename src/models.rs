//! Data models and structures for the factory planner.
//!
//! This module contains all the core data structures used throughout the crate:
//! the static game records (items, recipes, buildings, resources), the raw
//! planner configuration as it arrives from a user, the normalized request the
//! solver works on, and the production graph and report it hands back.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Tolerance used for every comparison against zero.
pub const EPSILON: f64 = 1e-8;

/// Reserved target key standing for AWESOME Sink points.
pub const POINTS_ITEM_KEY: &str = "POINTS_ITEM_KEY";

/// Item that can always be hand gathered, whatever the configuration says.
pub const GIFT_ITEM_KEY: &str = "Desc_Gift_C";

// ============================================================================
// Static game data
// ============================================================================

/// An item stack inside a recipe, expressed as a rate per minute for one
/// building running at 100%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeItem {
    /// Item id (e.g. `Desc_IronIngot_C`)
    pub item_class: String,
    /// Items per minute for a single building
    pub per_minute: f64,
}

/// An item stack in a building's construction cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildCost {
    /// Item id
    pub item_class: String,
    /// Number of items needed to build one building
    pub quantity: f64,
}

/// A single item known to the game.
///
/// The recipe lists are derived by [`GameData`](crate::data::GameData) when the
/// dataset is indexed, in canonical recipe order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item id, filled in from the dataset key
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    /// Display name
    pub name: String,
    /// Points awarded for sinking one unit
    #[serde(default)]
    pub sink_points: f64,
    /// Holiday event item; never scores points
    #[serde(default)]
    pub is_ficsmas: bool,
    /// Recipes consuming this item, in canonical recipe order
    #[serde(skip)]
    pub used_in_recipes: Vec<String>,
    /// Recipes producing this item, in canonical recipe order
    #[serde(skip)]
    pub produced_from_recipes: Vec<String>,
}

/// A transformation of ingredient items into product items inside one
/// building type.
///
/// # Example
///
/// ```
/// use factory_planner::models::{Recipe, RecipeItem};
///
/// let plate = Recipe {
///     id: "Recipe_IronPlate_C".to_string(),
///     slug: "iron_plate".to_string(),
///     name: "Iron Plate".to_string(),
///     is_alternate: false,
///     ingredients: vec![RecipeItem { item_class: "Desc_IronIngot_C".to_string(), per_minute: 30.0 }],
///     products: vec![RecipeItem { item_class: "Desc_IronPlate_C".to_string(), per_minute: 20.0 }],
///     produced_in: "Desc_ConstructorMk1_C".to_string(),
///     is_ficsmas: false,
/// };
///
/// assert_eq!(plate.product_rate("Desc_IronPlate_C"), Some(20.0));
/// assert_eq!(plate.ingredient_rate("Desc_IronPlate_C"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Recipe id, filled in from the dataset key
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    /// Display name
    pub name: String,
    /// Alternate recipes are unlocked separately and disabled by default
    #[serde(default)]
    pub is_alternate: bool,
    /// Items consumed per minute
    pub ingredients: Vec<RecipeItem>,
    /// Items produced per minute
    pub products: Vec<RecipeItem>,
    /// Building id this recipe runs in
    pub produced_in: String,
    /// Holiday event recipe
    #[serde(default)]
    pub is_ficsmas: bool,
}

impl Recipe {
    /// Per-minute consumption of `item` by one building, if it is an ingredient.
    pub fn ingredient_rate(&self, item: &str) -> Option<f64> {
        self.ingredients
            .iter()
            .find(|i| i.item_class == item)
            .map(|i| i.per_minute)
    }

    /// Per-minute production of `item` by one building, if it is a product.
    pub fn product_rate(&self, item: &str) -> Option<f64> {
        self.products
            .iter()
            .find(|p| p.item_class == item)
            .map(|p| p.per_minute)
    }
}

/// A building that runs recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Building id, filled in from the dataset key
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    /// Display name
    pub name: String,
    /// Power draw in MW (negative = net generation)
    pub power: f64,
    /// Footprint area in square metres
    pub area: f64,
    /// Construction materials for one building
    #[serde(default)]
    pub build_cost: Vec<BuildCost>,
    #[serde(default)]
    pub is_ficsmas: bool,
}

/// A raw resource node type that can be extracted from the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Item id of the extracted resource
    pub item_class: String,
    /// Maximum extraction rate on the map (`None` = unbounded)
    #[serde(default)]
    pub max_extraction: Option<f64>,
    /// Scarcity weight relative to the most abundant resource
    #[serde(default = "default_relative_value")]
    pub relative_value: f64,
}

fn default_relative_value() -> f64 {
    1.0
}

// ============================================================================
// Raw planner configuration
// ============================================================================

/// A number as typed by a user: either a JSON number or free text.
///
/// Text is parsed leniently; an empty string counts as zero and anything that
/// does not parse becomes NaN so that validation can reject it.
///
/// # Example
///
/// ```
/// use factory_planner::models::RawNumber;
///
/// assert_eq!(RawNumber::Text("12.5".into()).value(), 12.5);
/// assert_eq!(RawNumber::Text("".into()).value(), 0.0);
/// assert!(RawNumber::Text("lots".into()).value().is_nan());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Numeric value of this entry (NaN when it cannot be read as a number).
    pub fn value(&self) -> f64 {
        match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }
}

impl Default for RawNumber {
    fn default() -> Self {
        RawNumber::Number(0.0)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

/// Relative importance of the three cost components of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightingOptions {
    pub resources: RawNumber,
    pub power: RawNumber,
    pub complexity: RawNumber,
}

impl Default for WeightingOptions {
    fn default() -> Self {
        WeightingOptions {
            resources: RawNumber::Number(1000.0),
            power: RawNumber::Number(1.0),
            complexity: RawNumber::Number(1.0),
        }
    }
}

/// A map resource the plan may extract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputResourceOption {
    pub item_key: String,
    #[serde(default)]
    pub value: RawNumber,
    #[serde(default)]
    pub weight: RawNumber,
    #[serde(default)]
    pub unlimited: bool,
}

/// An item already available (e.g. from another factory).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputItemOption {
    pub item_key: String,
    #[serde(default)]
    pub value: RawNumber,
    #[serde(default)]
    pub unlimited: bool,
}

/// A requested output.
///
/// `mode` is `"per-minute"`, `"maximize"` or the id of a recipe producing the
/// item. In recipe mode `value` is the number of buildings running that
/// recipe; in maximize mode it is the priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionItemOption {
    pub item_key: String,
    pub mode: String,
    #[serde(default)]
    pub value: RawNumber,
}

/// Complete planner configuration, as produced by the application state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryOptions {
    #[serde(default)]
    pub weighting_options: WeightingOptions,
    #[serde(default)]
    pub input_resources: Vec<InputResourceOption>,
    #[serde(default)]
    pub input_items: Vec<InputItemOption>,
    #[serde(default)]
    pub production_items: Vec<ProductionItemOption>,
    #[serde(default)]
    pub allow_hand_gathered_items: bool,
    /// Enabled recipe ids
    #[serde(default)]
    pub allowed_recipes: HashSet<String>,
}

// ============================================================================
// Normalized request
// ============================================================================

/// Normalized cost weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalWeights {
    pub resources: f64,
    pub power: f64,
    pub complexity: f64,
}

/// Where an input comes from. Mirrored by the type of its graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputKind {
    Resource,
    InputItem,
    HandGathered,
}

/// An item the plan is allowed to consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    /// Items per minute available (may be infinite)
    pub amount: f64,
    /// Scarcity weight
    pub weight: f64,
    pub kind: InputKind,
}

/// Inputs keyed by item id.
pub type Inputs = HashMap<String, Input>;

/// A hard per-minute output requirement on one item.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTarget {
    /// Item the target is about
    pub item: String,
    pub value: f64,
    pub is_points: bool,
}

/// Building counts pinned on one recipe by recipe-mode requests.
///
/// `count` is the floor on the recipe's multiplier. `items` splits it by the
/// product each request was made for, since two products of the same recipe
/// can be targeted separately.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeTarget {
    pub recipe: String,
    pub count: f64,
    pub items: HashMap<String, f64>,
}

impl RecipeTarget {
    /// Adds `count` buildings requested for `item`.
    pub fn pin(&mut self, item: &str, count: f64) {
        self.count += count;
        *self.items.entry(item.to_string()).or_insert(0.0) += count;
    }

    /// Buildings pinned for `item` alone.
    pub fn count_for(&self, item: &str) -> f64 {
        self.items.get(item).copied().unwrap_or(0.0)
    }
}

/// All rate targets of a request, split by what they are keyed on.
#[derive(Debug, Clone, Default)]
pub struct RateTargets {
    pub by_item: HashMap<String, RateTarget>,
    pub by_recipe: HashMap<String, RecipeTarget>,
}

impl RateTargets {
    /// Target for an item, if any.
    pub fn item(&self, key: &str) -> Option<&RateTarget> {
        self.by_item.get(key)
    }

    /// Building counts pinned on a recipe, if any.
    pub fn recipe(&self, key: &str) -> Option<&RecipeTarget> {
        self.by_recipe.get(key)
    }

    /// The points target, if one was requested.
    pub fn points(&self) -> Option<&RateTarget> {
        self.by_item.get(POINTS_ITEM_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty() && self.by_recipe.is_empty()
    }
}

/// An item whose output should be pushed as high as possible.
#[derive(Debug, Clone, PartialEq)]
pub struct MaximizeTarget {
    pub key: String,
    pub priority: f64,
}

/// Recipe id → throughput multiplier (fractional building count).
pub type ProductionSolution = HashMap<String, f64>;

// ============================================================================
// Production graph
// ============================================================================

/// Type tag of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    FinalProduct,
    SideProduct,
    InputItem,
    HandGatheredResource,
    Resource,
    Recipe,
}

impl NodeType {
    /// Nodes that only emit flow.
    pub fn is_source(self) -> bool {
        matches!(
            self,
            NodeType::InputItem | NodeType::HandGatheredResource | NodeType::Resource
        )
    }

    /// Nodes that only absorb flow.
    pub fn is_sink(self) -> bool {
        matches!(self, NodeType::FinalProduct | NodeType::SideProduct)
    }
}

impl From<InputKind> for NodeType {
    fn from(kind: InputKind) -> Self {
        match kind {
            InputKind::Resource => NodeType::Resource,
            InputKind::InputItem => NodeType::InputItem,
            InputKind::HandGathered => NodeType::HandGatheredResource,
        }
    }
}

/// A recipe or item in the production graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Synthetic node id, unique within one graph
    pub id: String,
    /// Recipe id or item id
    pub key: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Building count for recipes, items per minute for items
    pub multiplier: f64,
}

/// A flow of one item between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Item id carried by the edge
    pub key: String,
    /// Source node id
    pub from: String,
    /// Destination node id
    pub to: String,
    /// Items per minute
    pub production_rate: f64,
}

/// Directed flow graph of a production plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionGraph {
    /// Nodes in creation order
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ProductionGraph {
    /// First node with the given key.
    pub fn node(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Node with the given key and type.
    pub fn node_of_type(&self, key: &str, node_type: NodeType) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|n| n.key == key && n.node_type == node_type)
    }

    /// Nodes whose type passes `filter`, in creation order.
    pub fn nodes_where(&self, filter: impl Fn(NodeType) -> bool) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| filter(n.node_type))
    }

    /// Node with the given synthetic id.
    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Report & results
// ============================================================================

/// Buildings of one type used by a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingUsage {
    /// Whole buildings needed (partial buildings round up)
    pub count: f64,
    /// Item id → quantity needed to build them
    pub material_cost: BTreeMap<String, f64>,
}

/// Aggregate metrics of a production plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub points_produced: f64,
    /// MW, negative when the plan generates more than it uses
    pub power_usage_estimate: f64,
    pub resource_efficiency_score: f64,
    pub total_build_area: f64,
    pub estimated_foundations: f64,
    pub buildings_used: BTreeMap<String, BuildingUsage>,
    pub total_material_cost: BTreeMap<String, f64>,
}

/// Outcome of one solve request. `error` is empty on success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverResults {
    pub production_graph: Option<ProductionGraph>,
    pub report: Option<Report>,
    /// Start of the request, milliseconds since the Unix epoch
    pub timestamp: f64,
    /// Milliseconds spent computing
    pub compute_time: f64,
    pub error: String,
}
