use once_cell::sync::Lazy;
use regex::Regex;

/// Result of scanning a final-summary reply for an overall score. The
/// summary text is always the unmodified input, matched or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    pub score: Option<u8>,
    pub summary_text: String,
}

// Tier 1: explicit labeled overall score, "/10" or "out of 10" suffix.
static LABELED_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:Overall\s+(?:Numerical\s+)?Score|Final\s+Score|Numerical\s+Score|Interview\s+Score):\s*(\d{1,2})\s*(?:/\s*10|\s+out\s+of\s+10)",
    )
    .expect("labeled score regex")
});

// Tier 2: narrower "Overall Score: X/10" / "Final Score: X/10" form.
static FALLBACK_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Overall|Final)\s+Score:\s*(\d{1,2})/10").expect("fallback score regex")
});

// Tier 3: bare "Score: X/10", subject to the per-question exclusion below.
static GENERIC_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bScore:\s*(\d{1,2})/10").expect("generic score regex"));

static PER_QUESTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Score for this question:").expect("per-question label regex"));

const PER_QUESTION_LOOKBEHIND_BYTES: usize = 50;

/// Extracts an overall 0-10 score from a free-form summary reply.
///
/// Model output format is not guaranteed, so matching cascades from the
/// precise labels down to a bare "Score: X/10", first match wins. The bare
/// form is rejected when "Score for this question:" occurs within the ~50
/// characters preceding it, so per-question scores don't leak into the
/// overall score. That proximity window is a known-fragile heuristic kept
/// as-is; captured digits are not clamped.
pub fn parse_summary(text: &str) -> ParsedSummary {
    let score = LABELED_SCORE
        .captures(text)
        .or_else(|| FALLBACK_SCORE.captures(text))
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .or_else(|| generic_score(text));

    ParsedSummary {
        score,
        summary_text: text.to_string(),
    }
}

fn generic_score(text: &str) -> Option<u8> {
    let m = GENERIC_SCORE.captures(text)?;
    let start = m.get(0).map(|whole| whole.start()).unwrap_or(0);
    let mut window_start = start.saturating_sub(PER_QUESTION_LOOKBEHIND_BYTES);
    while !text.is_char_boundary(window_start) {
        window_start += 1;
    }
    if PER_QUESTION_LABEL.is_match(&text[window_start..start]) {
        log::debug!("Bare score at byte {} preceded by a per-question label, ignoring", start);
        return None;
    }
    m[1].parse::<u8>().ok()
}
