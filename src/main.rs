use echo_tracker::config::TrackerConfig;
use echo_tracker::tracker::service::TrackerService;
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--peer <addr:port>]... [options]",
            args[0]
        );
        eprintln!(
            "Example: {} --bind 127.0.0.1:8053 --peer 127.0.0.1:8054 --peer 127.0.0.1:8055",
            args[0]
        );
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --interval-ms <n>   time between probing cycles (default 30000)");
        eprintln!("  --timeout-ms <n>    per-attempt confirmation timeout (default 3000)");
        eprintln!("  --attempts <n>      retry budget per peer per cycle (default 3)");
        eprintln!("  --report-ms <n>     time between status reports (default 60000)");
        eprintln!("  --json-status       also emit status reports as JSON lines");

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut peers: Vec<SocketAddr> = vec![];
    let mut probe_interval = None;
    let mut probe_timeout = None;
    let mut max_attempts = None;
    let mut report_interval = None;
    let mut json_status = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--peer" => {
                peers.push(args[i + 1].parse()?);
                i += 2;
            }
            "--interval-ms" => {
                probe_interval = Some(Duration::from_millis(args[i + 1].parse()?));
                i += 2;
            }
            "--timeout-ms" => {
                probe_timeout = Some(Duration::from_millis(args[i + 1].parse()?));
                i += 2;
            }
            "--attempts" => {
                max_attempts = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--report-ms" => {
                report_interval = Some(Duration::from_millis(args[i + 1].parse()?));
                i += 2;
            }
            "--json-status" => {
                json_status = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.ok_or_else(|| anyhow::anyhow!("--bind is required"))?;

    let mut config = TrackerConfig::new(bind_addr);
    config.peers = peers;
    config.json_status = json_status;
    if let Some(v) = probe_interval {
        config.probe_interval = v;
    }
    if let Some(v) = probe_timeout {
        config.probe_timeout = v;
    }
    if let Some(v) = max_attempts {
        config.max_attempts = v;
    }
    if let Some(v) = report_interval {
        config.report_interval = v;
    }

    let service = TrackerService::new(config).await?;
    let handles = service.start();

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    service.shutdown();
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
