//! Keyword filtering and duration clamping of candidate ranges.

use timestitch_models::{Segment, TimeRange, VideoId};
use tracing::debug;

/// Keyword include/exclude rules, normalized once at construction.
///
/// Matching is case-insensitive substring containment. An empty include
/// list passes every description; the exclude list always applies.
#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    keywords: Vec<String>,
    exclude: Vec<String>,
}

impl FilterRules {
    pub fn new<I, S>(keywords: I, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: normalize(keywords),
            exclude: normalize(exclude),
        }
    }

    /// Whether a description passes the include/exclude rules.
    pub fn matches(&self, description: &str) -> bool {
        let haystack = description.to_lowercase();
        let included =
            self.keywords.is_empty() || self.keywords.iter().any(|k| haystack.contains(k));
        included && !self.exclude.iter().any(|k| haystack.contains(k))
    }
}

fn normalize<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Narrow candidate ranges to the segments worth extracting.
///
/// Ranges are kept when their description passes `rules`, then clamped to
/// the known video duration (dropping spans left shorter than one second),
/// and finally ordered by ascending start. The sort is stable, so ranges
/// starting at the same offset keep the order their comments arrived in,
/// making compilation order deterministic.
///
/// Overlapping ranges from different comments are deliberately kept as
/// distinct segments; two commenters may label the same moment
/// differently.
pub fn filter_segments<I>(
    video_id: &VideoId,
    duration_secs: f64,
    ranges: I,
    rules: &FilterRules,
) -> Vec<Segment>
where
    I: IntoIterator<Item = TimeRange>,
{
    let mut segments: Vec<Segment> = ranges
        .into_iter()
        .filter(|range| rules.matches(&range.description))
        .filter_map(|range| match range.clamped_to(duration_secs) {
            Some(clamped) => Some(Segment::new(video_id.clone(), clamped)),
            None => {
                debug!(
                    video_id = %video_id,
                    start_secs = range.start_secs,
                    end_secs = range.end_secs,
                    "dropping range shorter than one second after clamping"
                );
                None
            }
        })
        .collect();

    segments.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));
    segments
}
