//! Timestamp extraction from comment text.
//!
//! Viewers mark moments one per line (`2:45 tingles`), occasionally as an
//! explicit span on a single line (`2:00 - 3:10 brushing`). A run of
//! timestamp lines describes a chain of moments: each line opens a span
//! that the next line's timestamp closes, and the closing line's text
//! labels the span that just ended. A trailing timestamp with nothing
//! after it closes the chain without opening a usable span.
//!
//! Malformed lines (non-numeric tokens, minutes or seconds of 60 and up,
//! non-increasing chains) are skipped and counted; a single bad line never
//! discards the rest of the comment.

use timestitch_models::{parse_token, TimeRange};

/// Characters tolerated before a timestamp token: bullets, quoting, and
/// stray list punctuation.
const LEADING_TRIM: &[char] = &[' ', '\t', '-', '*', '+', '>', '~', '[', '(', '#', '\u{2022}'];

/// Separators stripped between a token and its description.
const DESC_TRIM: &[char] = &[' ', '\t', '-', ':', '.', ',', ')', ']', '\u{2013}', '\u{2014}'];

/// Lazily scan one comment's text for time ranges.
///
/// The returned iterator is finite and holds no state shared with any
/// other scan; re-invoking `scan` on the same text restarts from the top.
pub fn scan(text: &str) -> Scan<'_> {
    Scan {
        lines: text.lines(),
        open: None,
        skipped: 0,
    }
}

/// Iterator over the [`TimeRange`]s found in one comment.
pub struct Scan<'a> {
    lines: std::str::Lines<'a>,
    /// Start of the chain span awaiting a closing timestamp.
    open: Option<u32>,
    skipped: usize,
}

impl Scan<'_> {
    /// Number of lines skipped as malformed so far. Stable once the
    /// iterator is exhausted.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Scan<'_> {
    type Item = TimeRange;

    fn next(&mut self) -> Option<TimeRange> {
        loop {
            let line = self.lines.next()?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match classify(trimmed) {
                Line::Prose => {
                    // Plain text interrupts a chain of timestamp lines.
                    self.open = None;
                }
                Line::Malformed => {
                    self.skipped += 1;
                    self.open = None;
                }
                Line::Pair { start, end, text } => {
                    self.open = None;
                    if start < end {
                        return TimeRange::new(f64::from(start), f64::from(end), text);
                    }
                    self.skipped += 1;
                }
                Line::Stamp { secs, text } => {
                    let opened = self.open.replace(secs);
                    if let Some(start) = opened {
                        if start < secs {
                            return TimeRange::new(f64::from(start), f64::from(secs), text);
                        }
                        // A chain that fails to advance is a typo, not an end marker.
                        self.skipped += 1;
                    }
                }
            }
        }
    }
}

enum Line {
    /// No leading timestamp token.
    Prose,
    /// Leading token present but unparseable or out of range.
    Malformed,
    /// Single timestamp plus description.
    Stamp { secs: u32, text: String },
    /// Explicit `start - end` span on one line.
    Pair { start: u32, end: u32, text: String },
}

fn classify(line: &str) -> Line {
    let body = line.trim_start_matches(LEADING_TRIM);
    let (token, rest) = split_token(body);
    if token.is_empty() {
        return Line::Prose;
    }

    let start = match parse_token(token) {
        Ok(secs) => secs,
        Err(_) => return Line::Malformed,
    };

    // Look for an explicit closing token after a dash.
    let after = rest.trim_start();
    if let Some(tail) = after
        .strip_prefix('-')
        .or_else(|| after.strip_prefix('\u{2013}'))
    {
        let (end_token, desc) = split_token(tail.trim_start());
        if !end_token.is_empty() {
            return match parse_token(end_token) {
                Ok(end) => Line::Pair {
                    start,
                    end,
                    text: clean_description(desc),
                },
                Err(_) => Line::Malformed,
            };
        }
    }

    Line::Stamp {
        secs: start,
        text: clean_description(rest),
    }
}

/// Split a leading run of digits and colons off the front of `body`.
/// Returns an empty token when the run contains no colon, so bare numbers
/// are left to prose handling.
fn split_token(body: &str) -> (&str, &str) {
    let end = body
        .find(|c: char| !c.is_ascii_digit() && c != ':')
        .unwrap_or(body.len());
    let token = &body[..end];
    if token.contains(':') {
        (token, &body[end..])
    } else {
        ("", body)
    }
}

fn clean_description(rest: &str) -> String {
    rest.trim_matches(DESC_TRIM).to_string()
}
