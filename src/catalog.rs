use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::models::{tokenize, Recipe, RecipeView};

/// Loads all recipes from a single JSON file
///
/// The file may hold either a list of recipes or an object with a `recipes` key.
/// A missing file or malformed JSON yields an empty list (logged as a warning)
/// so the server can still start without a recipe database.
///
/// ### Errors
///
/// Returns an error if the file exists but cannot be read (a directory,
/// no permission, not UTF-8), if it is valid JSON of any other shape, or if
/// a recipe record is missing a required field.
#[instrument]
pub fn load_recipes_from_file(path: &Path) -> Result<Vec<Recipe>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Recipe file not found at {:?}", path);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read recipe file {:?}", path)),
    };

    let data: serde_json::Value = match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(e) => {
            warn!("Error decoding JSON in {:?}: {}", path, e);
            return Ok(Vec::new());
        }
    };

    let records = match data {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(mut map) => match map.remove("recipes") {
            Some(serde_json::Value::Array(records)) => records,
            _ => bail!("Invalid JSON format: must be a list or contain a 'recipes' key."),
        },
        _ => bail!("Invalid JSON format: must be a list or contain a 'recipes' key."),
    };

    let recipes = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value::<Recipe>(record).with_context(|| format!("Invalid recipe at index {}", i))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} recipes from {:?}", recipes.len(), path);
    Ok(recipes)
}

/// The in-memory recipe database
///
/// Holds the recipes in file order along with the base URL used to resolve
/// relative image paths.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    image_base_url: String,
}

impl RecipeCatalog {
    /// Creates a catalog from already loaded recipes
    ///
    /// Later duplicates of an `id_legacy` are dropped with a warning.
    pub fn new(recipes: Vec<Recipe>, image_base_url: impl Into<String>) -> Self {
        let mut seen = HashSet::new();
        let recipes = recipes
            .into_iter()
            .filter(|recipe| {
                let fresh = seen.insert(recipe.id_legacy.clone());
                if !fresh {
                    warn!("Skipping duplicate recipe id {}", recipe.id_legacy);
                }
                fresh
            })
            .collect();

        Self {
            recipes,
            image_base_url: image_base_url.into(),
        }
    }

    /// Loads the catalog from a recipe file
    pub fn load(path: &Path, image_base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::new(load_recipes_from_file(path)?, image_base_url))
    }

    /// Number of recipes in the catalog
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if the catalog holds no recipes
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// All recipes in file order
    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Finds a recipe by its `id_legacy`
    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id_legacy == recipe_id)
    }

    /// Lists up to `limit` recipes in file order, keeping only those carrying every tag in `tags`
    pub fn list(&self, limit: usize, tags: &[String]) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.has_all_tags(tags))
            .take(limit)
            .collect()
    }

    /// Resolves the recipe's image URLs
    ///
    /// Absolute `http(s)://` URLs are kept as-is; anything else is joined onto
    /// the catalog's image base URL.
    pub fn attach_images(&self, recipe: &Recipe) -> RecipeView {
        let base = self.image_base_url.trim_end_matches('/');
        let image_urls = recipe
            .images
            .iter()
            .filter(|image| !image.trim().is_empty())
            .map(|image| {
                let image = image.trim();
                if image.starts_with("http://") || image.starts_with("https://") {
                    image.to_string()
                } else {
                    format!("{}/{}", base, image.trim_start_matches('/'))
                }
            })
            .collect();

        RecipeView {
            recipe: recipe.clone(),
            image_urls,
            recommended_recipes: None,
        }
    }

    /// Ranks recipes by how many of the query's words they contain
    ///
    /// Only recipes matching at least one word are returned, best first; ties
    /// keep file order.
    #[instrument(skip(self))]
    pub fn lexical_rank(&self, query: &str) -> Vec<(&Recipe, usize)> {
        let terms: HashSet<String> = tokenize(query).collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&Recipe, usize)> = self
            .recipes
            .iter()
            .map(|recipe| {
                let tokens = recipe.search_tokens();
                (recipe, terms.iter().filter(|term| tokens.contains(*term)).count())
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        // Stable sort keeps file order among equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        debug!("Lexical ranking matched {} recipes", scored.len());
        scored
    }
}
