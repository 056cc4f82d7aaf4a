/*
 * Responsibility
 * - tokio runtime
 * - app::run() only; no logic here
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    authgate::app::run().await
}
