use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    medchat_cli::main_entry().await
}
