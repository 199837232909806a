//! Inspect a processing ledger from the command line.
//!
//! Usage: ledger_viewer [PATH]
//!
//! PATH defaults to $LEDGER_PATH, then to data/processed_videos.jsonl.

use chrono::Local;

use timestitch_ledger::ProcessingLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Surface replay warnings (torn or unreadable lines) on stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LEDGER_PATH").ok())
        .unwrap_or_else(|| "data/processed_videos.jsonl".to_string());

    let ledger = ProcessingLedger::open(&path).await?;

    println!("Ledger: {}", ledger.path().display());
    println!("Processed videos: {}", ledger.len());
    if ledger.is_empty() {
        return Ok(());
    }

    println!();
    println!("{:<16} {:<20} OUTPUT", "SOURCE", "PROCESSED");
    for record in ledger.records() {
        let processed = record
            .processed_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S");
        println!(
            "{:<16} {:<20} {}",
            record.source_video_id.as_str(),
            processed,
            record.output_video_id.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
