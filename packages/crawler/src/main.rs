mod init;

use actors::SupervisorMessage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let (supervisor, handle) = init::init_crawler().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    supervisor.send_message(SupervisorMessage::Shutdown)?;
    handle.await?;

    Ok(())
}
