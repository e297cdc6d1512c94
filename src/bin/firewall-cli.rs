use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use inference_firewall::observability::report::{AuditLogParser, DateRange, Report};

#[derive(Parser)]
#[command(name = "firewall-cli")]
#[command(about = "Management CLI for the Model Inference Firewall", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://127.0.0.1:8001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check firewall status
    Status,
    /// Show request outcome counters and rate-limit state
    Stats,
    /// Summarize audit log files
    Report {
        /// Log files to read, in any order.
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// First day to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Last day to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Show only the N busiest clients.
        #[arg(long)]
        top: Option<usize>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => fetch(&cli.url, "/admin/status").await?,
        Commands::Stats => fetch(&cli.url, "/admin/stats").await?,
        Commands::Report {
            logs,
            from,
            to,
            top,
            json,
        } => {
            let parser = AuditLogParser::new()?;
            let mut report = parser.summarize_files(logs.as_slice(), &DateRange { from, to })?;
            if let Some(n) = top {
                report.clients.truncate(n);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

async fn fetch(base: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let res = reqwest::get(format!("{}{}", base.trim_end_matches('/'), path)).await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_report(report: &Report) {
    println!("Total requests:  {}", report.total_requests);
    println!("Allowed:         {}", report.allowed);
    println!("Threats blocked: {}", report.threats_blocked);
    println!("Rate limited:    {}", report.rate_limited);
    println!("Malformed:       {}", report.malformed);

    if report.clients.is_empty() {
        return;
    }
    println!();
    println!("{:<40} {:>10} {:>10} {:>12}", "CLIENT", "REQUESTS", "BLOCKED", "RATE LIMITED");
    for c in &report.clients {
        println!(
            "{:<40} {:>10} {:>10} {:>12}",
            c.client, c.total_requests, c.threats_blocked, c.rate_limited
        );
    }
}
