use clap::ValueEnum;
use culinairy::dto::{AiTestDto, MealPlanSummaryDto, PlanResponseDto, SearchResultsDto, ShoppingListDto};
use culinairy::models::RecipeView;
use culinairy::shopping::ShoppingListItem;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs)
    pub quiet: bool,
}

/// Prints any response as pretty JSON
fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// Formats a quantity without trailing zeros (`2`, `1.5`, `0.25`)
fn format_quantity(quantity: f64) -> String {
    let text = format!("{:.2}", quantity);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Formats one shopping list line, e.g. `480 ml milk`, `2 onion` or `cucumber`
pub fn format_shopping_item(item: &ShoppingListItem) -> String {
    // Plain counts read better without their unit
    let unitless = item.unit.is_empty() || item.unit == "item";
    match (item.quantity, unitless) {
        (Some(quantity), true) => format!("{} {}", format_quantity(quantity), item.name),
        (Some(quantity), false) => format!("{} {} {}", format_quantity(quantity), item.unit, item.name),
        (None, true) => item.name.clone(),
        (None, false) => format!("{} ({})", item.name, item.unit),
    }
}

/// Prints a list of recipes in the specified format
pub fn print_recipes(recipes: &[RecipeView], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if recipes.is_empty() {
                if !config.quiet {
                    println!("No recipes found.");
                }
                return;
            }
            if config.quiet {
                for view in recipes {
                    println!("{}", view.recipe.id_legacy);
                }
                return;
            }
            let max_id = recipes.iter().map(|r| r.recipe.id_legacy.len()).max().unwrap_or(2).max(2);
            println!("{:<width$}  TITLE", "ID", width = max_id);
            for view in recipes {
                println!("{:<width$}  {}", view.recipe.id_legacy, view.recipe.title, width = max_id);
            }
        }
        OutputFormat::Json => print_json(recipes),
    }
}

/// Prints a single recipe in the specified format
pub fn print_recipe(view: &RecipeView, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let recipe = &view.recipe;
            if config.quiet {
                println!("{}", recipe.id_legacy);
                return;
            }
            println!("ID:       {}", recipe.id_legacy);
            println!("Title:    {}", recipe.title);
            if let Some(ref cuisine) = recipe.cuisine {
                println!("Cuisine:  {}", cuisine);
            }
            if !recipe.tags.is_empty() {
                println!("Tags:     {}", recipe.tags.join(", "));
            }
            if let Some(ref description) = recipe.description {
                println!("About:    {}", description);
            }
            if !recipe.ingredients.is_empty() {
                println!("Ingredients:");
                for ingredient in &recipe.ingredients {
                    println!("  - {}", ingredient.name);
                }
            }
            for url in &view.image_urls {
                println!("Image:    {}", url);
            }
            if let Some(ref recommended) = view.recommended_recipes
                && !recommended.is_empty()
            {
                println!("You might also like:");
                for similar in recommended {
                    println!("  - {} ({})", similar.recipe.title, similar.recipe.id_legacy);
                }
            }
        }
        OutputFormat::Json => print_json(view),
    }
}

/// Prints search results in the specified format
pub fn print_search_results(results: &SearchResultsDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("Results for \"{}\" ({:?} search):", results.query, results.mode);
            }
            print_recipes(&results.results, config);
        }
        OutputFormat::Json => print_json(results),
    }
}

/// Prints a meal plan in the specified format
pub fn print_meal_plan(plan: &PlanResponseDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", plan.id);
                return;
            }
            println!("ID:      {}", plan.id);
            println!("Seed:    {}", plan.seed);
            println!("Created: {}", plan.created_at);
            if !plan.preferences.is_empty() {
                println!("Prefs:   {}", plan.preferences.join(", "));
            }
            println!();
            println!("{}", plan.message);
            for day in &plan.plan {
                println!();
                println!("Day {}", day.day);
                for meal in &day.meals {
                    println!("  {}. {} ({})", meal.slot, meal.title, meal.recipe_id);
                }
            }
            if !plan.shopping_list.is_empty() {
                println!();
                println!("Shopping list:");
                for item in &plan.shopping_list {
                    println!("  - {}", format_shopping_item(item));
                }
            }
        }
        OutputFormat::Json => print_json(plan),
    }
}

/// Prints stored meal plan summaries in the specified format
pub fn print_meal_plans(plans: &[MealPlanSummaryDto], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if plans.is_empty() {
                if !config.quiet {
                    println!("No meal plans found.");
                }
                return;
            }
            if config.quiet {
                for plan in plans {
                    println!("{}", plan.id);
                }
                return;
            }
            let max_id = plans.iter().map(|p| p.id.len()).max().unwrap_or(2).max(2);
            println!("{:<width$}  DAYS  MEALS  CREATED", "ID", width = max_id);
            for plan in plans {
                println!(
                    "{:<width$}  {:<4}  {:<5}  {}",
                    plan.id,
                    plan.days,
                    plan.meals_per_day,
                    plan.created_at.format("%Y-%m-%d %H:%M"),
                    width = max_id,
                );
            }
        }
        OutputFormat::Json => print_json(plans),
    }
}

/// Prints a shopping list in the specified format
pub fn print_shopping_list(list: &ShoppingListDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if list.items.is_empty() {
                if !config.quiet {
                    println!("Nothing to buy.");
                }
                return;
            }
            for item in &list.items {
                if config.quiet {
                    println!("{}", item.name);
                } else {
                    println!("- {}", format_shopping_item(item));
                }
            }
        }
        OutputFormat::Json => print_json(list),
    }
}

/// Prints the AI smoke test result in the specified format
pub fn print_ai_test(result: &AiTestDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("Prompt: {}", result.prompt);
            }
            println!("{}", result.ai_response);
        }
        OutputFormat::Json => print_json(result),
    }
}

/// Prints a plain message, or `{"message": ...}` in JSON mode
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
    }
}

/// Prints any JSON value as-is
pub fn print_value(value: &serde_json::Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if let Some(status) = value.get("status").and_then(|s| s.as_str()) {
                println!("{}", status);
            } else {
                println!("{}", value);
            }
        }
        OutputFormat::Json => print_json(value),
    }
}
