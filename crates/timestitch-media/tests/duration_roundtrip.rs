//! Duration round-trip tests against a real ffmpeg install.
//!
//! These generate synthetic sources with lavfi and verify that extraction
//! and assembly land within the re-encode tolerance. They are ignored by
//! default; run them where ffmpeg/ffprobe are installed:
//!
//!   cargo test -p timestitch-media -- --ignored

use std::path::Path;
use std::process::Stdio;

use timestitch_models::{EncodingConfig, Segment, TimeRange, VideoId};

/// Re-encode tolerance per cut, in seconds.
const TOLERANCE_SECS: f64 = 0.5;

async fn make_source(path: &Path, duration_secs: u32) {
    let status = tokio::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-v",
            "error",
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=duration={duration_secs}:size=320x240:rate=24"),
            "-f",
            "lavfi",
            "-i",
            &format!("sine=frequency=440:duration={duration_secs}"),
            "-c:v",
            "libx264",
            "-preset",
            "veryfast",
            "-crf",
            "28",
            "-c:a",
            "aac",
            "-shortest",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .status()
        .await
        .expect("ffmpeg not runnable");
    assert!(status.success(), "failed to generate test source");
}

fn segment(start: f64, end: f64) -> Segment {
    Segment::new(
        VideoId::from("test"),
        TimeRange::new(start, end, "synthetic").unwrap(),
    )
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe on PATH"]
async fn extracted_clip_duration_matches_requested_span() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    make_source(&source, 10).await;

    let clip_path = dir.path().join("clip.mp4");
    let clip = timestitch_media::extract_clip(
        &source,
        &segment(2.0, 5.0),
        &clip_path,
        &EncodingConfig::default(),
    )
    .await
    .unwrap();

    let measured = timestitch_media::duration_secs(&clip.path).await.unwrap();
    assert!(
        (measured - 3.0).abs() <= TOLERANCE_SECS,
        "expected ~3s clip, got {measured}s"
    );
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe on PATH"]
async fn extraction_clamps_against_the_real_container() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    make_source(&source, 10).await;

    // End past the container: clamped, not failed.
    let clip = timestitch_media::extract_clip(
        &source,
        &segment(8.0, 20.0),
        &dir.path().join("tail.mp4"),
        &EncodingConfig::default(),
    )
    .await
    .unwrap();
    let measured = timestitch_media::duration_secs(&clip.path).await.unwrap();
    assert!((measured - 2.0).abs() <= TOLERANCE_SECS);

    // Start past the container: refused, nothing written.
    let missing = dir.path().join("never.mp4");
    let err = timestitch_media::extract_clip(
        &source,
        &segment(15.0, 20.0),
        &missing,
        &EncodingConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        timestitch_media::ClipError::OutOfRange { .. }
    ));
    assert!(!missing.exists());
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe on PATH"]
async fn assembled_duration_is_the_sum_of_clips() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    make_source(&source, 10).await;

    let spans = [(0.0, 2.0), (3.0, 6.0), (7.0, 9.0)];
    let mut clips = Vec::new();
    for (i, (start, end)) in spans.iter().enumerate() {
        let path = dir.path().join(format!("clip{i}.mp4"));
        clips.push(
            timestitch_media::extract_clip(
                &source,
                &segment(*start, *end),
                &path,
                &EncodingConfig::default(),
            )
            .await
            .unwrap(),
        );
    }

    let output = dir.path().join("compilation.mp4");
    let compilation =
        timestitch_media::assemble(&clips, &output, &EncodingConfig::default())
            .await
            .unwrap();
    assert_eq!(compilation.clip_count, 3);

    let expected: f64 = spans.iter().map(|(s, e)| e - s).sum();
    let measured = timestitch_media::duration_secs(&output).await.unwrap();
    assert!(
        (measured - expected).abs() <= TOLERANCE_SECS * spans.len() as f64,
        "expected ~{expected}s compilation, got {measured}s"
    );
}
