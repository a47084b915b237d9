#[tokio::main]
async fn main() {
    if let Err(e) = gunpowder_server::frameworks::server::run_with_config().await {
        tracing::error!(error = %e, "sketch server stopped");
        std::process::exit(1);
    }
}
