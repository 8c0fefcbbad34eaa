//! Calendar-event tokenizer and date/time normalizer.
//!
//! Turns free-form event text like
//!
//! ```text
//! Coffee with Sam "for real" at Blue Bottle tomorrow 9-9:30 a.m.
//! ```
//!
//! into structured [`EventDetails`].  The pass works in three stages:
//!
//! 1. **Tokenize**: split on ASCII spaces and classify each token into the
//!    active *facet* (name / start / location / duration).  The keywords
//!    `on`, `today`, `tomorrow`, `tmw` switch to the start facet (the
//!    relative words are also kept as start tokens); `at` switches to
//!    location and `for` to duration, both consumed.  A double quote
//!    protects keywords: a leading quote opens a phrase before the token is
//!    classified, a trailing quote closes it after the token is appended.
//! 2. **Infer duration**: an explicit `for` value wins; otherwise a time
//!    range in the start phrase (`9 to 9:30`, `9 - 9:30`, `9-9:30`) yields
//!    the difference of its endpoints in fractional hours and is collapsed
//!    to just its start time; otherwise the duration defaults to one hour.
//! 3. **Normalize dates and times**: relative day words become `M/D/YY`
//!    literals, a bare integer becomes `H:00`, and a month/day pair missing
//!    its year gets the current two-digit year appended.  Re-normalizing an
//!    already-normalized phrase is a no-op.
//!
//! Every malformed case (unterminated quote, non-numeric duration) is a
//! typed error; nothing here panics on user input.

use chrono::{Datelike, Days, NaiveDate};

use herald_kernel::text;
use herald_kernel::{KernelError, Result};

/// Structured fields extracted from an event description.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    /// Event summary; empty if the text held nothing but keywords.
    pub event_name: String,
    /// Normalized start phrase, backend-consumable (e.g. `4/20/26 3:00 PM`).
    pub start_date: String,
    /// Event location; empty when no `at` clause was given.
    pub location: String,
    /// Event length in fractional hours.
    pub duration_hours: f64,
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// The slot tokens are currently being collected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Name,
    Start,
    Location,
    Duration,
}

#[derive(Debug, Default)]
struct Facets {
    name: Vec<String>,
    start: Vec<String>,
    location: Vec<String>,
    duration: Vec<String>,
}

impl Facets {
    fn push(&mut self, facet: Facet, token: &str) {
        let list = match facet {
            Facet::Name => &mut self.name,
            Facet::Start => &mut self.start,
            Facet::Location => &mut self.location,
            Facet::Duration => &mut self.duration,
        };
        list.push(token.to_string());
    }
}

/// Split the description into facet token lists.
///
/// Facet switching: `on` selects the start facet and is consumed;
/// `today`/`tomorrow`/`tmw` select it and are kept; `at` and `for` select
/// location and duration and are consumed.  Tokens inside a quoted phrase
/// bypass keyword detection entirely.
fn tokenize(input: &str) -> Result<Facets> {
    let mut facets = Facets::default();
    let mut current = Facet::Name;
    let mut quoted = false;

    for raw in input.split(' ') {
        if raw.is_empty() {
            continue;
        }

        let mut token = raw;
        let mut closes_quote = false;

        // A leading quote toggles *before* classification, a trailing quote
        // *after* the token lands, so a quoted keyword -- even a lone
        // `"on"` -- stays in the active facet.  One quote character is
        // stripped from each edge; escaped quotes are not supported.
        if let Some(stripped) = token.strip_prefix('"') {
            token = stripped;
            quoted = !quoted;
        }
        if let Some(stripped) = token.strip_suffix('"') {
            token = stripped;
            closes_quote = true;
        }

        if quoted {
            if !token.is_empty() {
                facets.push(current, token);
            }
        } else {
            match token {
                "on" => current = Facet::Start,
                "today" | "tomorrow" | "tmw" => {
                    current = Facet::Start;
                    facets.push(Facet::Start, token);
                }
                "at" => current = Facet::Location,
                "for" => current = Facet::Duration,
                _ => {
                    if !token.is_empty() {
                        facets.push(current, token);
                    }
                }
            }
        }

        if closes_quote {
            quoted = !quoted;
        }
    }

    if quoted {
        return Err(KernelError::MalformedInput {
            reason: "unterminated quoted phrase in event description".to_string(),
        });
    }
    Ok(facets)
}

// ---------------------------------------------------------------------------
// Time-range inference
// ---------------------------------------------------------------------------

/// A recognized time range inside the start phrase.
#[derive(Debug, Clone, PartialEq)]
struct TimeRange {
    /// Index of the first token belonging to the range.
    first: usize,
    /// Index of the last token belonging to the range (inclusive).
    last: usize,
    /// End minus start, in fractional hours.
    duration: f64,
    /// Canonical `H:MM` rendering of the range's start time.
    start_label: String,
}

/// Parse a clock token: a bare hour (`9`) or an `H:MM` pair (`9:30`).
///
/// Returns the time as fractional hours together with its canonical `H:MM`
/// label.
fn parse_clock(token: &str) -> Option<(f64, String)> {
    if let Ok(hour) = token.parse::<u32>() {
        return (hour <= 24).then(|| (f64::from(hour), format!("{hour}:00")));
    }

    if text::count_char(token, ':') == 1
        && let Some((h, m)) = token.split_once(':')
        && let (Ok(hour), Ok(minute)) = (h.parse::<u32>(), m.parse::<u32>())
        && hour <= 24
        && minute < 60
    {
        return Some((f64::from(hour) + f64::from(minute) / 60.0, token.to_string()));
    }
    None
}

/// End minus start; a range crossing noon (`11-1`) wraps forward.
fn clock_span(start: f64, end: f64) -> f64 {
    if end >= start { end - start } else { end + 12.0 - start }
}

/// Find the first time range in the start-phrase tokens.
///
/// Three spellings are recognized: a `to` token between two clock tokens, a
/// standalone `-` between two clock tokens, and a `-` glued to one or both
/// of its clock tokens (`9-9:30`, `9- 9:30`, `9 -9:30`).
fn find_range(tokens: &[String]) -> Option<TimeRange> {
    for (i, token) in tokens.iter().enumerate() {
        // Fully glued: both endpoints in one token.
        if token != "-"
            && text::count_char(token, '-') == 1
            && !token.starts_with('-')
            && !token.ends_with('-')
            && let Some((a, b)) = token.split_once('-')
            && let (Some((start, label)), Some((end, _))) = (parse_clock(a), parse_clock(b))
        {
            return Some(TimeRange {
                first: i,
                last: i,
                duration: clock_span(start, end),
                start_label: label,
            });
        }

        // Separator between two clock tokens.
        if (token == "to" || token == "-")
            && i > 0
            && i + 1 < tokens.len()
            && let (Some((start, label)), Some((end, _))) =
                (parse_clock(&tokens[i - 1]), parse_clock(&tokens[i + 1]))
        {
            return Some(TimeRange {
                first: i - 1,
                last: i + 1,
                duration: clock_span(start, end),
                start_label: label,
            });
        }

        // Glued on one side only.
        if let Some(rest) = token.strip_prefix('-')
            && i > 0
            && let (Some((start, label)), Some((end, _))) =
                (parse_clock(&tokens[i - 1]), parse_clock(rest))
        {
            return Some(TimeRange {
                first: i - 1,
                last: i,
                duration: clock_span(start, end),
                start_label: label,
            });
        }
        if let Some(rest) = token.strip_suffix('-')
            && i + 1 < tokens.len()
            && let (Some((start, label)), Some((end, _))) =
                (parse_clock(rest), parse_clock(&tokens[i + 1]))
        {
            return Some(TimeRange {
                first: i,
                last: i + 1,
                duration: clock_span(start, end),
                start_label: label,
            });
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Date/time normalization
// ---------------------------------------------------------------------------

/// `M/D/YY`, unpadded month and day, two-digit year.
fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year() % 100)
}

/// Rewrite one start-phrase token into its backend-consumable form.
///
/// Applied once per token; applying it again to its own output changes
/// nothing (a `M/D/YY` literal has two slashes, an `H:00` time is not a
/// bare integer).
fn normalize_token(token: String, today: NaiveDate) -> String {
    match token.as_str() {
        "today" => format_short_date(today),
        "tomorrow" | "tmw" => {
            format_short_date(today.checked_add_days(Days::new(1)).unwrap_or(today))
        }
        _ => {
            if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                format!("{token}:00")
            } else if text::count_char(&token, '/') == 1 {
                format!("{}/{:02}", token, today.year() % 100)
            } else {
                token
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse an event description into [`EventDetails`].
///
/// `today` anchors the relative words; production callers pass the current
/// local date.
pub fn parse_event(input: &str, today: NaiveDate) -> Result<EventDetails> {
    let facets = tokenize(input)?;
    let mut start_tokens = facets.start;

    // The range is collapsed in the start phrase whenever one is present;
    // its inferred length applies unless an explicit `for` value wins.
    let range = find_range(&start_tokens);
    if let Some(ref range) = range {
        start_tokens.splice(range.first..=range.last, [range.start_label.clone()]);
    }

    let duration_hours = if let Some(token) = facets.duration.first() {
        token
            .parse::<f64>()
            .map_err(|_| KernelError::MalformedInput {
                reason: format!("cannot parse duration `{token}` as a number of hours"),
            })?
    } else if let Some(ref range) = range {
        range.duration
    } else {
        1.0
    };

    let start_tokens: Vec<String> = start_tokens
        .into_iter()
        .map(|token| normalize_token(token, today))
        .collect();

    Ok(EventDetails {
        event_name: facets.name.join(" "),
        start_date: start_tokens.join(" "),
        location: facets.location.join(" "),
        duration_hours,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
