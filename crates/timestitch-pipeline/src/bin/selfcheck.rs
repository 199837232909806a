//! Preflight check for a pipeline deployment.
//!
//! Verifies the encoder toolchain, configuration, working directory, and
//! ledger without touching the platform API.

use timestitch_ledger::ProcessingLedger;
use timestitch_pipeline::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    timestitch_pipeline::logging::init_tracing();

    let ffmpeg = timestitch_media::check_ffmpeg()
        .map_err(|e| anyhow::anyhow!("ffmpeg check failed: {e}"))?;
    println!("selfcheck: ffmpeg at {}", ffmpeg.display());

    let ffprobe = timestitch_media::check_ffprobe()
        .map_err(|e| anyhow::anyhow!("ffprobe check failed: {e}"))?;
    println!("selfcheck: ffprobe at {}", ffprobe.display());

    let config = AppConfig::from_env()?;
    println!(
        "selfcheck: config ok (channel {}, {} trusted commenters, upload slots {})",
        config.channel_id,
        config.commenters.len(),
        config.upload_times
    );

    tokio::fs::create_dir_all(&config.work_dir).await?;
    println!("selfcheck: work dir {}", config.work_dir.display());

    let ledger = ProcessingLedger::open(&config.ledger_path).await?;
    println!(
        "selfcheck: ledger {} ({} records)",
        ledger.path().display(),
        ledger.len()
    );

    println!("selfcheck: ok");
    Ok(())
}
