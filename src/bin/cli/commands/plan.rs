use clap::Subcommand;
use culinairy::dto::PlanMealsDto;

use crate::client::CulinairyClient;
use crate::output::{self, OutputConfig};

/// Meal plan commands
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Generate and store a new meal plan
    Create {
        /// Number of days to plan
        #[clap(long, default_value_t = 7)]
        days: i32,
        /// Number of meals on each day
        #[clap(long, default_value_t = 3)]
        meals_per_day: i32,
        /// Dietary or taste preference (repeatable), e.g. --preference vegetarian
        #[clap(long = "preference")]
        preferences: Vec<String>,
        /// Shuffle seed, to reproduce an earlier plan
        #[clap(long)]
        seed: Option<u64>,
    },
    /// List stored meal plans, newest first
    List,
    /// Show a stored meal plan
    Get {
        /// The meal plan ID
        id: String,
    },
    /// Show the shopping list of a stored meal plan
    ShoppingList {
        /// The meal plan ID
        id: String,
    },
    /// Delete a stored meal plan
    Delete {
        /// The meal plan ID
        id: String,
    },
}

/// Executes a meal plan command
pub async fn execute(
    client: &CulinairyClient,
    cmd: PlanCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PlanCommands::Create { days, meals_per_day, preferences, seed } => {
            let dto = PlanMealsDto {
                meals_per_day,
                days,
                preferences: (!preferences.is_empty()).then_some(preferences),
                seed,
            };
            let plan = client.plan_meals(&dto).await?;
            output::print_meal_plan(&plan, config);
        }
        PlanCommands::List => {
            let plans = client.list_meal_plans().await?;
            output::print_meal_plans(&plans, config);
        }
        PlanCommands::Get { id } => {
            let plan = client.get_meal_plan(&id).await?;
            output::print_meal_plan(&plan, config);
        }
        PlanCommands::ShoppingList { id } => {
            let list = client.get_shopping_list(&id).await?;
            output::print_shopping_list(&list, config);
        }
        PlanCommands::Delete { id } => {
            client.delete_meal_plan(&id).await?;
            output::print_success(&format!("Deleted meal plan {}", id), config);
        }
    }
    Ok(())
}
