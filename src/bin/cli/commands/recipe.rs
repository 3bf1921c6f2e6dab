use clap::Subcommand;

use crate::client::CulinairyClient;
use crate::output::{self, OutputConfig};

/// Recipe commands
#[derive(Subcommand, Debug)]
pub enum RecipeCommands {
    /// List recipes in catalog order
    List {
        /// Maximum number of recipes to list
        #[clap(long, default_value_t = 10)]
        limit: usize,
        /// Only list recipes carrying this tag (repeatable)
        #[clap(long = "tag")]
        tags: Vec<String>,
    },
    /// Show a recipe with AI-recommended similar recipes
    Get {
        /// The recipe ID
        id: String,
    },
    /// Search recipes by free text
    Search {
        /// What to look for, e.g. "spicy vegetarian"
        query: String,
        /// Number of results (server default: 3)
        #[clap(long)]
        top_k: Option<usize>,
    },
}

/// Executes a recipe command
pub async fn execute(
    client: &CulinairyClient,
    cmd: RecipeCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RecipeCommands::List { limit, tags } => {
            let recipes = client.list_recipes(limit, &tags).await?;
            output::print_recipes(&recipes, config);
        }
        RecipeCommands::Get { id } => {
            let recipe = client.get_recipe(&id).await?;
            output::print_recipe(&recipe, config);
        }
        RecipeCommands::Search { query, top_k } => {
            let results = client.search_recipes(&query, top_k).await?;
            output::print_search_results(&results, config);
        }
    }
    Ok(())
}
