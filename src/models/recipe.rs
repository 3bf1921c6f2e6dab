use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Represents a recipe from the recipe database
///
/// Recipes are read from a JSON file rather than the SQLite database. Only the
/// attributes the application reasons about are typed; every other attribute in
/// the source record is kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identifier of the recipe (e.g. `cal-smart-tex-mex-beef-bowls`)
    pub id_legacy: String,

    /// Display title
    pub title: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cuisine; older exports spell the key `cousine`
    #[serde(default, alias = "cousine", skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    /// Free-form tags such as `low-carb` or `vegetarian`
    #[serde(default)]
    pub tags: Vec<String>,

    /// Number of servings the ingredient quantities are written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,

    /// Ingredients used by the recipe
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    /// Image file names or absolute image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Any other attributes present in the source record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Recipe {
    /// Creates a recipe with only the required fields set
    pub fn new(id_legacy: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id_legacy: id_legacy.into(),
            title: title.into(),
            description: None,
            cuisine: None,
            tags: Vec::new(),
            servings: None,
            ingredients: Vec::new(),
            images: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// The text indexed for semantic search: the title followed by the description
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description.as_deref().unwrap_or(""))
    }

    /// Returns true if the recipe carries every one of the given tags (case-insensitive)
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|wanted| {
            let wanted = wanted.trim();
            self.tags.iter().any(|tag| tag.trim().eq_ignore_ascii_case(wanted))
        })
    }

    /// The lowercase word set used for keyword matching
    ///
    /// Covers the title, description, cuisine and tags.
    pub fn search_tokens(&self) -> HashSet<String> {
        let mut tokens: HashSet<String> = tokenize(&self.title).collect();
        if let Some(ref description) = self.description {
            tokens.extend(tokenize(description));
        }
        if let Some(ref cuisine) = self.cuisine {
            tokens.extend(tokenize(cuisine));
        }
        for tag in &self.tags {
            tokens.extend(tokenize(tag));
        }
        tokens
    }
}

/// Splits text into lowercase alphanumeric words
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// A single ingredient line of a recipe
///
/// Accepts either a full object (`{"name": "onion", "quantity": 1, "unit": "whole"}`)
/// or a bare string holding only the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IngredientRepr")]
pub struct Ingredient {
    /// Ingredient name as written in the recipe
    pub name: String,

    /// Amount, when the recipe gives one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Unit of the amount (`cup`, `g`, `whole`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// Creates an ingredient with a quantity and unit
    pub fn new(name: impl Into<String>, quantity: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.map(str::to_string),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default, deserialize_with = "deserialize_quantity")]
        quantity: Option<f64>,
        #[serde(default)]
        unit: Option<String>,
    },
}

impl From<IngredientRepr> for Ingredient {
    fn from(repr: IngredientRepr) -> Self {
        match repr {
            IngredientRepr::Name(name) => Ingredient { name, quantity: None, unit: None },
            IngredientRepr::Full { name, quantity, unit } => Ingredient { name, quantity, unit },
        }
    }
}

/// Reads a quantity written either as a number or as text such as `"1 1/2"`
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum QuantityRepr {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<QuantityRepr>::deserialize(deserializer)? {
        Some(QuantityRepr::Number(n)) => Some(n),
        Some(QuantityRepr::Text(text)) => parse_quantity(&text),
        None => None,
    })
}

/// Parses a textual quantity: decimals (`0.5`), fractions (`3/4`) and mixed numbers (`1 1/2`)
///
/// Returns None for anything else, including ambiguous amounts like `"to taste"`.
pub fn parse_quantity(text: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut parts = 0;
    for part in text.split_whitespace() {
        let value = match part.split_once('/') {
            Some((numer, denom)) => {
                let numer: f64 = numer.parse().ok()?;
                let denom: f64 = denom.parse().ok()?;
                if denom == 0.0 {
                    return None;
                }
                numer / denom
            }
            None => part.parse::<f64>().ok()?,
        };
        total += value;
        parts += 1;
    }
    (parts > 0 && total.is_finite()).then_some(total)
}

/// A recipe as returned by the API, with resolved image URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeView {
    /// The recipe itself
    #[serde(flatten)]
    pub recipe: Recipe,

    /// Absolute or server-relative URLs of the recipe's images
    pub image_urls: Vec<String>,

    /// AI-recommended similar recipes, only present on single-recipe fetches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_recipes: Option<Vec<RecipeView>>,
}

#[cfg(test)]
mod tests;
