//! Heuristic LLM token estimation.
//!
//! A rough ~4-characters-per-token estimate with a surcharge for
//! structural punctuation. Good enough to report the savings of TOON over
//! JSON for the same data; use a real tokenizer when exact counts matter.

use serde::Serialize;

/// Estimate the LLM token count of a text.
pub fn estimate_tokens(text: &str) -> usize {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars = collapsed.chars().count();
    let mut estimate = chars.div_ceil(4);

    let specials = text
        .chars()
        .filter(|c| matches!(c, ',' | ':' | '.' | ';' | '!' | '?' | '{' | '}' | '[' | ']' | '(' | ')'))
        .count();
    estimate += specials.div_ceil(2);

    estimate
}

/// Token comparison of a TOON rendering against its JSON equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenSavings {
    pub toon: usize,
    pub json: usize,
    /// Negative when TOON came out larger.
    pub savings: i64,
    /// Percentage of the JSON count saved, rounded to two decimals.
    pub savings_percentage: f64,
}

/// Compare the estimated token counts of TOON and JSON texts.
pub fn compare_tokens(toon_text: &str, json_text: &str) -> TokenSavings {
    let toon = estimate_tokens(toon_text);
    let json = estimate_tokens(json_text);
    let savings = json as i64 - toon as i64;
    let savings_percentage = if json > 0 {
        (savings as f64 / json as f64 * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };
    TokenSavings {
        toon,
        json,
        savings,
        savings_percentage,
    }
}
