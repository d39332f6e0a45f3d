use echo_tracker::config::ResponderConfig;
use echo_tracker::responder::service::ResponderService;
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} --bind <addr:port> [--no-respond] [--delay-ms <n>]", args[0]);
        eprintln!("Example: {} --bind 127.0.0.1:8054", args[0]);

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut respond = true;
    let mut processing_delay = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--no-respond" => {
                respond = false;
                i += 1;
            }
            "--delay-ms" => {
                processing_delay = Some(Duration::from_millis(args[i + 1].parse()?));
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.ok_or_else(|| anyhow::anyhow!("--bind is required"))?;

    let mut config = ResponderConfig::new(bind_addr);
    config.respond = respond;
    if let Some(v) = processing_delay {
        config.processing_delay = v;
    }

    let service = ResponderService::new(config).await?;
    let handle = service.start();

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    service.shutdown();
    let _ = handle.await;

    Ok(())
}
