use crate::client::CulinairyClient;
use crate::output::{self, OutputConfig};

/// Checks that the server is up
pub async fn execute(client: &CulinairyClient, config: &OutputConfig) -> Result<(), Box<dyn std::error::Error>> {
    let status = client.health().await?;
    output::print_value(&status, config);
    Ok(())
}
