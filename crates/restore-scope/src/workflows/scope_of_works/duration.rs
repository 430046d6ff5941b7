use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::input::ScopeInput;
use super::signals::DRYING_PREFERENCES;

pub const CLASS4_DEFAULT_DAYS: u32 = 14;
pub const LARGE_AREA_DEFAULT_DAYS: u32 = 10;
pub const STANDARD_DEFAULT_DAYS: u32 = 7;
pub const LARGE_AREA_THRESHOLD_SQM: f64 = 50.0;
/// Longest drying run any source may claim; anything beyond counts as missing.
pub const MAX_DRYING_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    Report,
    Analysis,
    DryingPreferences,
    Class4Heuristic,
    LargeAreaHeuristic,
    StandardHeuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DryingDuration {
    pub days: u32,
    pub source: DurationSource,
}

/// What the heuristic tail of the chain is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct DurationContext<'a> {
    pub input: &'a ScopeInput,
    pub needs_class4: bool,
    pub affected_area_sqm: f64,
}

type DurationResolver = fn(&DurationContext<'_>) -> Option<DryingDuration>;

/// Order matters: every downstream cost scales with the winner.
const DURATION_CHAIN: &[DurationResolver] = &[
    from_report,
    from_analysis,
    from_drying_preferences,
];

fn day_count() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+)\s*days?\b").expect("valid day-count regex"))
}

/// Day count from text such as `"dry for 5 days"`.
pub fn parse_day_count(text: &str) -> Option<u32> {
    day_count()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|days| days.as_str().parse::<u32>().ok())
        .filter(|days| (1..=MAX_DRYING_DAYS).contains(days))
}

/// Stored durations may be fractional; a partial day still needs the equipment on hire.
fn whole_days(value: Option<f64>) -> Option<u32> {
    value
        .filter(|days| *days > 0.0 && *days <= f64::from(MAX_DRYING_DAYS))
        .map(|days| days.ceil() as u32)
}

fn from_report(ctx: &DurationContext<'_>) -> Option<DryingDuration> {
    whole_days(ctx.input.report.drying_duration).map(|days| DryingDuration {
        days,
        source: DurationSource::Report,
    })
}

fn from_analysis(ctx: &DurationContext<'_>) -> Option<DryingDuration> {
    let stored = ctx
        .input
        .analysis
        .as_ref()
        .and_then(|analysis| analysis.drying_duration);
    whole_days(stored).map(|days| DryingDuration {
        days,
        source: DurationSource::Analysis,
    })
}

fn from_drying_preferences(ctx: &DurationContext<'_>) -> Option<DryingDuration> {
    ctx.input
        .tier3()
        .text(DRYING_PREFERENCES)
        .and_then(|text| parse_day_count(&text))
        .map(|days| DryingDuration {
            days,
            source: DurationSource::DryingPreferences,
        })
}

fn heuristic(ctx: &DurationContext<'_>) -> DryingDuration {
    if ctx.needs_class4 {
        DryingDuration {
            days: CLASS4_DEFAULT_DAYS,
            source: DurationSource::Class4Heuristic,
        }
    } else if ctx.affected_area_sqm > LARGE_AREA_THRESHOLD_SQM {
        DryingDuration {
            days: LARGE_AREA_DEFAULT_DAYS,
            source: DurationSource::LargeAreaHeuristic,
        }
    } else {
        DryingDuration {
            days: STANDARD_DEFAULT_DAYS,
            source: DurationSource::StandardHeuristic,
        }
    }
}

pub fn estimate_duration(ctx: &DurationContext<'_>) -> DryingDuration {
    DURATION_CHAIN
        .iter()
        .find_map(|resolve| resolve(ctx))
        .unwrap_or_else(|| heuristic(ctx))
}
