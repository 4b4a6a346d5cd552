//! Currency Hub entry point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    currency_hub::run().await?;
    Ok(())
}
