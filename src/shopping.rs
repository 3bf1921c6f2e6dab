//! Shopping list generation
//!
//! Aggregates the ingredients of a set of planned recipes into a single list.
//! Ingredient names are normalized, quantities are converted to a base unit
//! per dimension and summed:
//!
//! - "chicken 2 lb" + "chicken 8 oz" = "chicken 1133.98 g"
//! - "milk 1 cup" + "milk 240 ml" = "milk 480 ml"
//! - "onion 1 whole" + "onion 1 cup" = 2 separate lines (incompatible units)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::models::Recipe;

/// One line of a shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Normalized ingredient name (trimmed, lowercase, single spaces)
    pub name: String,

    /// Summed quantity in `unit`, rounded to 2 decimals; absent when no
    /// contributing ingredient gave an amount
    pub quantity: Option<f64>,

    /// Base unit of the quantity (`ml`, `g`, `item`, or an unrecognized unit, lowercased)
    pub unit: String,

    /// IDs of the recipes using this ingredient, in first-seen order
    pub recipes: Vec<String>,
}

/// Builds a shopping list from the given recipes
///
/// Each recipe contributes once per occurrence, so a recipe planned twice
/// doubles its quantities. The result is sorted by name, then unit.
#[instrument(skip(recipes))]
pub fn build_shopping_list<'a, I>(recipes: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let mut groups: BTreeMap<(String, String), (Option<f64>, Vec<String>)> = BTreeMap::new();

    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let name = normalize_name(&ingredient.name);
            if name.is_empty() {
                continue;
            }

            let (unit, quantity) = normalize_unit(ingredient.unit.as_deref(), ingredient.quantity);

            let entry = groups.entry((name, unit)).or_insert((None, Vec::new()));
            if let Some(quantity) = quantity {
                entry.0 = Some(entry.0.unwrap_or(0.0) + quantity);
            }
            if !entry.1.contains(&recipe.id_legacy) {
                entry.1.push(recipe.id_legacy.clone());
            }
        }
    }

    debug!("Aggregated {} shopping list lines", groups.len());

    groups
        .into_iter()
        .map(|((name, unit), (quantity, recipes))| ShoppingListItem {
            name,
            quantity: quantity.map(round_quantity),
            unit,
            recipes,
        })
        .collect()
}

/// Normalize ingredient name (lowercase, trim, collapse inner whitespace)
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a unit and convert the quantity to the unit's base
///
/// Conversion table:
/// - Volume: cup, tbsp, tsp, l -> ml
/// - Weight: kg, oz, lb -> g
/// - Count: whole, piece, clove, no unit -> item
///
/// Unknown units are trimmed and lowercased but not converted, and never merged with other units.
pub fn normalize_unit(unit: Option<&str>, quantity: Option<f64>) -> (String, Option<f64>) {
    let normalized = unit.map(|u| u.trim().to_lowercase()).unwrap_or_default();

    let (base, factor) = match normalized.as_str() {
        // Volume units -> ml
        "cup" | "cups" => ("ml", 240.0),
        "tbsp" | "tablespoon" | "tablespoons" => ("ml", 15.0),
        "tsp" | "teaspoon" | "teaspoons" => ("ml", 5.0),
        "ml" | "milliliter" | "milliliters" => ("ml", 1.0),
        "l" | "liter" | "liters" => ("ml", 1000.0),

        // Weight units -> grams
        "g" | "gram" | "grams" => ("g", 1.0),
        "kg" | "kilogram" | "kilograms" => ("g", 1000.0),
        "oz" | "ounce" | "ounces" => ("g", 28.35),
        "lb" | "lbs" | "pound" | "pounds" => ("g", 453.59),

        // Count units (no conversion)
        "whole" | "item" | "items" | "piece" | "pieces" | "clove" | "cloves" | "" => ("item", 1.0),

        other => return (other.to_string(), quantity),
    };

    (base.to_string(), quantity.map(|q| q * factor))
}

fn round_quantity(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}
