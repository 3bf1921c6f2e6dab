use std::io::Write;

use clap::Subcommand;
use culinairy::dto::ChatDto;
use culinairy::llm::ChatMessage;
use serde_json::json;

use crate::client::CulinairyClient;
use crate::output::{self, OutputConfig, OutputFormat};

/// Commands that talk to the language model through the server
#[derive(Subcommand, Debug)]
pub enum AiCommands {
    /// Check that the language model answers
    Test,
    /// Ask the meal-planning assistant a question
    Chat {
        /// The question
        message: String,
        /// Sampling temperature between 0 and 2
        #[clap(long)]
        temperature: Option<f32>,
        /// Maximum tokens in the reply
        #[clap(long)]
        max_tokens: Option<u32>,
        /// Print the reply as it is generated
        #[clap(long)]
        stream: bool,
    },
}

/// Executes an AI command
pub async fn execute(
    client: &CulinairyClient,
    cmd: AiCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AiCommands::Test => {
            let result = client.ai_test().await?;
            output::print_ai_test(&result, config);
        }
        AiCommands::Chat { message, temperature, max_tokens, stream } => {
            let dto = ChatDto {
                messages: vec![ChatMessage::user(message)],
                temperature,
                max_tokens,
            };

            if !stream {
                let reply = client.chat(&dto).await?;
                match config.format {
                    OutputFormat::Human => println!("{}", reply.reply),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
                }
                return Ok(());
            }

            match config.format {
                OutputFormat::Human => {
                    let mut stdout = std::io::stdout();
                    client
                        .chat_stream(&dto, |delta| {
                            let _ = write!(stdout, "{}", delta);
                            let _ = stdout.flush();
                        })
                        .await?;
                    println!();
                }
                // JSON output has to be a single document, so wait for the whole reply
                OutputFormat::Json => {
                    let reply = client.chat_stream(&dto, |_| {}).await?;
                    println!("{}", serde_json::to_string_pretty(&json!({ "reply": reply }))?);
                }
            }
        }
    }
    Ok(())
}
