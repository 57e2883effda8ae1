use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the RAG gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway process is up
    Status,
    /// Show backend health as seen by the gateway
    Health,
    /// Show index statistics
    Stats,
    /// Ask a question about the indexed documents
    Query { question: String },
    /// Extract information about a class
    Extract { class_name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/healthz")).send().await?,
        Commands::Health => client.get(format!("{base}/api/rag/health")).send().await?,
        Commands::Stats => client.get(format!("{base}/api/rag/stats")).send().await?,
        Commands::Query { question } => {
            client
                .post(format!("{base}/api/rag/query"))
                .json(&json!({ "question": question }))
                .send()
                .await?
        }
        Commands::Extract { class_name } => {
            client
                .post(format!("{base}/api/rag/extract"))
                .json(&json!({ "className": class_name }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(id) = res.headers().get("x-request-id").and_then(|v| v.to_str().ok()) {
        eprintln!("request-id: {}", id);
    }

    let body = res.text().await?;
    let pretty = match serde_json::from_str::<Value>(&body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => body,
    };

    if status.is_success() {
        println!("{}", pretty);
        Ok(())
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", pretty);
        Err(format!("request failed with status {}", status).into())
    }
}
