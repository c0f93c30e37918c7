//! Heuristic mode inference from free-text user input.
//!
//! Weighted keyword scoring, not ML. The correctness bar: a reasonable
//! default, never a crash, never an invalid mode. Confidence is advisory
//! telemetry; callers may override the inferred mode at will.

use serde::Serialize;

use crate::mode::QuoteMode;

/// Result of inference: the chosen mode plus an advisory confidence score.
/// Confidence never gates execution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ModeInference {
    pub mode: QuoteMode,
    pub confidence: f64,
}

/// Winning score at or above which confidence saturates at 1.0.
const CONFIDENCE_SATURATION: f64 = 5.0;

const CALC_KEYWORDS: &[(&str, u32)] = &[
    ("nest", 3),
    ("nesting", 3),
    ("kerf", 3),
    ("area", 2),
    ("yield", 2),
    ("dimensions", 2),
    ("calculate", 2),
    ("sheets", 1),
    ("qty", 1),
    ("cut", 1),
    ("mm", 1),
];

const PRICE_KEYWORDS: &[(&str, u32)] = &[
    ("price", 3),
    ("pricing", 3),
    ("supplier", 3),
    ("cost", 2),
    ("sku", 2),
    ("lead-time", 2),
    ("quote", 1),
    ("stock", 1),
    ("each", 1),
];

const TABLE_KEYWORDS: &[(&str, u32)] = &[
    ("markdown", 3),
    ("invoice", 3),
    ("breakdown", 3),
    ("table", 2),
    ("summary", 2),
    ("final", 2),
    ("finalise", 2),
    ("finalize", 2),
    ("total", 1),
];

/// Infer the operating mode for `user_text`.
///
/// Scores each mode by summing keyword weights over the tokenized input and
/// picks the argmax. Ties at a nonzero score resolve in the fixed order CALC,
/// PRICE, TABLE. A zero total score falls back to `previous_mode` when one is
/// supplied (sticky mode across a conversation), otherwise CALC, with
/// confidence 0.0.
pub fn infer_mode(user_text: &str, previous_mode: Option<QuoteMode>) -> ModeInference {
    let tokens = tokenize(user_text);

    let scored = [
        (QuoteMode::Calc, score(&tokens, CALC_KEYWORDS)),
        (QuoteMode::Price, score(&tokens, PRICE_KEYWORDS)),
        (QuoteMode::Table, score(&tokens, TABLE_KEYWORDS)),
    ];

    let (mode, winning_score) =
        scored.iter().copied().fold(scored[0], |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    if winning_score == 0 {
        return ModeInference { mode: previous_mode.unwrap_or(QuoteMode::Calc), confidence: 0.0 };
    }

    let confidence = (f64::from(winning_score) / CONFIDENCE_SATURATION).min(1.0);
    ModeInference { mode, confidence }
}

fn score(tokens: &[String], keywords: &[(&str, u32)]) -> u32 {
    tokens
        .iter()
        .map(|token| {
            keywords
                .iter()
                .find(|(keyword, _)| keyword == token)
                .map(|(_, weight)| *weight)
                .unwrap_or(0)
        })
        .sum()
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_ascii_alphanumeric() || character == '-' {
            sanitized.push(character.to_ascii_lowercase());
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::infer_mode;
    use crate::mode::QuoteMode;

    #[test]
    fn calculation_request_infers_calc() {
        let inference = infer_mode("Calculate the area for 100x50mm parts", None);
        assert_eq!(inference.mode, QuoteMode::Calc);
        assert!(inference.confidence > 0.0);
    }

    #[test]
    fn pricing_request_infers_price() {
        let inference = infer_mode("What's the price for 304 stainless?", None);
        assert_eq!(inference.mode, QuoteMode::Price);
        assert!(inference.confidence > 0.0);
    }

    #[test]
    fn final_table_request_infers_table() {
        let inference = infer_mode("Generate the final quote table", None);
        assert_eq!(inference.mode, QuoteMode::Table);
        assert!(inference.confidence > 0.0);
    }

    #[test]
    fn zero_score_defaults_to_calc_with_zero_confidence() {
        let inference = infer_mode("hello", None);
        assert_eq!(inference.mode, QuoteMode::Calc);
        assert_eq!(inference.confidence, 0.0);
    }

    #[test]
    fn zero_score_is_sticky_to_previous_mode() {
        let inference = infer_mode("and again please", Some(QuoteMode::Price));
        assert_eq!(inference.mode, QuoteMode::Price);
        assert_eq!(inference.confidence, 0.0);
    }

    #[test]
    fn nonzero_score_overrides_previous_mode() {
        let inference = infer_mode("compare supplier pricing", Some(QuoteMode::Table));
        assert_eq!(inference.mode, QuoteMode::Price);
    }

    #[test]
    fn confidence_is_capped_at_one() {
        let inference =
            infer_mode("nest and calculate kerf yield area dimensions for these sheets", None);
        assert_eq!(inference.mode, QuoteMode::Calc);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn tokenizer_keeps_hyphenated_keywords() {
        let inference = infer_mode("what is the lead-time and cost?", None);
        assert_eq!(inference.mode, QuoteMode::Price);
    }
}
