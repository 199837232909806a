//! FFprobe container inspection.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Facts about a media file relevant to clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds.
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    /// Video codec name as reported by ffprobe.
    pub codec: String,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a media file.
pub async fn probe(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("probe of {} failed", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Probe just the duration of a media file.
pub async fn duration_secs(path: impl AsRef<Path>) -> MediaResult<f64> {
    Ok(probe(path).await?.duration_secs)
}

fn parse_probe_output(raw: &[u8]) -> MediaResult<MediaInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(raw)?;

    let duration_secs = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::InvalidVideo("container reports no duration".to_string()))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    Ok(MediaInfo {
        duration_secs,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        codec: video.codec_name.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "format": {"duration": "600.480000", "size": "1048576"},
        "streams": [
            {"codec_type": "audio", "codec_name": "aac"},
            {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080}
        ]
    }"#;

    #[test]
    fn parses_ffprobe_json() {
        let info = parse_probe_output(SAMPLE.as_bytes()).unwrap();
        assert!((info.duration_secs - 600.48).abs() < 0.001);
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!(info.codec, "h264");
    }

    #[test]
    fn rejects_audio_only_containers() {
        let raw = r#"{"format": {"duration": "10.0"}, "streams": [{"codec_type": "audio"}]}"#;
        assert!(matches!(
            parse_probe_output(raw.as_bytes()),
            Err(MediaError::InvalidVideo(_))
        ));
    }

    #[test]
    fn rejects_missing_duration() {
        let raw = r#"{"format": {}, "streams": [{"codec_type": "video"}]}"#;
        assert!(matches!(
            parse_probe_output(raw.as_bytes()),
            Err(MediaError::InvalidVideo(_))
        ));
    }
}
