use social_proof::{extract_social_proof, report, ScrapeOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("social_proof=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let report_mode = std::env::args().any(|a| a == "--report");
    let items = extract_social_proof(ScrapeOptions::from_env()).await;

    if report_mode {
        print!("{}", report::summarize(&items, true));
        return;
    }
    match serde_json::to_string_pretty(&items) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize items: {e}");
            std::process::exit(1);
        }
    }
}
