//! Application configuration.
//!
//! All knobs come from the environment once at startup, are validated
//! together, and travel as one immutable value. No component reads the
//! environment after this point.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::schedule::Schedule;

/// Upload visibility on the destination channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    #[default]
    Private,
    Unlisted,
    Public,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Private => "private",
            Privacy::Unlisted => "unlisted",
            Privacy::Public => "public",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Privacy::Private),
            "unlisted" => Ok(Privacy::Unlisted),
            "public" => Ok(Privacy::Public),
            other => Err(format!(
                "'{other}' is not one of private, unlisted, public"
            )),
        }
    }
}

/// Immutable pipeline configuration, validated once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Source channel or playlist id to watch.
    pub channel_id: String,
    /// Comment authors whose timestamps are trusted.
    pub commenters: Vec<String>,
    /// Keywords a segment description must contain (empty = keep all).
    pub keywords: Vec<String>,
    /// Keywords that disqualify a segment description.
    pub exclude_keywords: Vec<String>,
    /// Visibility of published compilations.
    pub privacy: Privacy,
    /// Prefix prepended to compilation titles.
    pub title_prefix: String,
    /// Tags attached to published compilations.
    pub tags: Vec<String>,
    /// Daily upload slots, consumed by the external scheduler.
    pub upload_times: Schedule,
    /// Root of the per-video working directories.
    pub work_dir: PathBuf,
    /// Path of the processing ledger file.
    pub ledger_path: PathBuf,
    /// Upper bound on videos handled in one pass.
    pub max_videos_per_pass: usize,
    /// How long a vanished video stays on the soft skip-list.
    pub skiplist_ttl: Duration,
    /// Whether to ask the destination channel for existing derivative
    /// uploads before processing.
    pub duplicate_detection: bool,
}

/// All configuration problems found in one validation pass.
#[derive(Debug)]
pub struct ConfigError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<(&'static str, String)>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error")?;
        if !self.missing.is_empty() {
            write!(f, "; missing: {}", self.missing.join(", "))?;
        }
        for (name, reason) in &self.invalid {
            write!(f, "; invalid {name}: {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Load and validate configuration from process environment
    /// variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load and validate configuration through an arbitrary variable
    /// lookup. Every problem is collected before returning, so the
    /// operator sees the full list at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let mut required = |name: &'static str| -> String {
            match lookup(name).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let channel_id = required("CHANNEL_ID");
        let commenters = split_csv(&required("TIMESTAMP_COMMENTERS"));

        let keywords = split_csv(&lookup("KEYWORDS").unwrap_or_default());
        let exclude_keywords = split_csv(&lookup("EXCLUDE_KEYWORDS").unwrap_or_default());

        let privacy = match lookup("UPLOAD_PRIVACY") {
            Some(raw) => raw.parse().unwrap_or_else(|reason| {
                invalid.push(("UPLOAD_PRIVACY", reason));
                Privacy::default()
            }),
            None => Privacy::default(),
        };

        let upload_times = match lookup("UPLOAD_TIMES") {
            Some(raw) => raw.parse().unwrap_or_else(|e: crate::schedule::ScheduleError| {
                invalid.push(("UPLOAD_TIMES", e.to_string()));
                Schedule::default()
            }),
            None => Schedule::default(),
        };

        let max_videos_per_pass = match lookup("MAX_VIDEOS_PER_PASS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                invalid.push(("MAX_VIDEOS_PER_PASS", format!("'{raw}' is not a number")));
                DEFAULT_MAX_VIDEOS
            }),
            None => DEFAULT_MAX_VIDEOS,
        };

        let skiplist_ttl = match lookup("SKIPLIST_TTL_MINS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(mins) => Duration::from_secs(mins * 60),
                Err(_) => {
                    invalid.push(("SKIPLIST_TTL_MINS", format!("'{raw}' is not a number")));
                    DEFAULT_SKIPLIST_TTL
                }
            },
            None => DEFAULT_SKIPLIST_TTL,
        };

        let duplicate_detection = match lookup("DUPLICATE_DETECTION").as_deref() {
            None => true,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    invalid.push(("DUPLICATE_DETECTION", format!("'{other}' is not a boolean")));
                    true
                }
            },
        };

        let config = Self {
            channel_id,
            commenters,
            keywords,
            exclude_keywords,
            privacy,
            title_prefix: lookup("TITLE_PREFIX")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE_PREFIX.to_string()),
            tags: split_csv(&lookup("UPLOAD_TAGS").unwrap_or_default()),
            upload_times,
            work_dir: lookup("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("downloads")),
            ledger_path: lookup("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/processed_videos.jsonl")),
            max_videos_per_pass,
            skiplist_ttl,
            duplicate_detection,
        };

        if config.commenters.is_empty() && !missing.contains(&"TIMESTAMP_COMMENTERS") {
            invalid.push(("TIMESTAMP_COMMENTERS", "no commenters listed".to_string()));
        }

        if missing.is_empty() && invalid.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError { missing, invalid })
        }
    }

    /// Whether this comment author's timestamps are trusted.
    pub fn is_trusted_commenter(&self, author: &str) -> bool {
        let author = author.trim();
        self.commenters.iter().any(|c| c == author)
    }
}

const DEFAULT_MAX_VIDEOS: usize = 5;
const DEFAULT_SKIPLIST_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const DEFAULT_TITLE_PREFIX: &str = "[Compilation]";

/// Split a comma-separated variable, trimming entries and dropping
/// empties.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
