//! Token-budget estimation and long-input shaping.
//!
//! The analysis backend accepts a bounded input. Token counts are
//! approximated without a tokenizer: CJK text runs ~1 token per 1.5
//! characters, everything else ~1 token per 4 characters. The estimate
//! and both shaping strategies are deterministic for a given input and
//! budget. Over-budget input is handled here and never surfaced to the
//! user as an error.

use serde::{Deserialize, Serialize};

use crate::transcript::segment::is_cjk;

/// What to do with transcripts that exceed the token budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongInputStrategy {
    /// Cut at the last sentence/paragraph boundary inside the budget.
    #[default]
    Truncate,
    /// Analyze sequential parts independently and concatenate the
    /// answers under part headers.
    Split,
}

const SENTENCE_BOUNDARIES: &[char] = &['.', '!', '?', '。', '！', '？', '\n'];

fn tokens_for(cjk_chars: usize, other_chars: usize) -> usize {
    // ceil(cjk / 1.5) + ceil(other / 4), in integer arithmetic
    (cjk_chars * 2).div_ceil(3) + other_chars.div_ceil(4)
}

/// Approximate token count for a piece of text.
pub fn estimate_tokens(text: &str) -> usize {
    let cjk = text.chars().filter(|c| is_cjk(*c)).count();
    let other = text.chars().count() - cjk;
    tokens_for(cjk, other)
}

/// Byte length of the longest prefix whose estimate fits `budget`, plus
/// the byte end of the last sentence boundary inside that prefix.
fn fit_prefix(text: &str, budget: usize) -> (usize, usize) {
    let mut cjk = 0usize;
    let mut other = 0usize;
    let mut fit_end = 0usize;
    let mut last_boundary = 0usize;

    for (offset, c) in text.char_indices() {
        if is_cjk(c) {
            cjk += 1;
        } else {
            other += 1;
        }

        if tokens_for(cjk, other) > budget {
            break;
        }

        fit_end = offset + c.len_utf8();
        if SENTENCE_BOUNDARIES.contains(&c) {
            last_boundary = fit_end;
        }
    }

    (fit_end, last_boundary)
}

/// Truncate `text` so its estimate fits `budget`, preferring the last
/// sentence/paragraph boundary inside the fitting prefix. The return
/// value is always a prefix of the input; it equals the input exactly
/// when the input already fits.
pub fn truncate_to_budget(text: &str, budget: usize) -> &str {
    if estimate_tokens(text) <= budget {
        return text;
    }

    let (fit_end, last_boundary) = fit_prefix(text, budget);
    let cut = if last_boundary > 0 { last_boundary } else { fit_end };
    &text[..cut]
}

/// Split `text` into sequential pieces, each within `budget`. Sentences
/// are kept whole where possible; a single sentence larger than the
/// budget is hard-chunked.
pub fn split_to_budget(text: &str, budget: usize) -> Vec<String> {
    if estimate_tokens(text) <= budget {
        return vec![text.to_string()];
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, parts: &mut Vec<String>| {
        let piece = current.trim();
        if !piece.is_empty() {
            parts.push(piece.to_string());
        }
        current.clear();
    };

    for sentence in crate::transcript::segment::sentence_spans(text) {
        if estimate_tokens(sentence) > budget {
            // A single run-on sentence past the whole budget: chunk it.
            flush(&mut current, &mut parts);
            let mut rest = sentence;
            while !rest.is_empty() {
                let (fit_end, _) = fit_prefix(rest, budget);
                if fit_end == 0 {
                    break;
                }
                parts.push(rest[..fit_end].trim().to_string());
                rest = &rest[fit_end..];
            }
            continue;
        }

        let candidate_tokens = estimate_tokens(&current) + estimate_tokens(sentence);
        if !current.is_empty() && candidate_tokens > budget {
            flush(&mut current, &mut parts);
        }
        current.push_str(sentence);
    }
    flush(&mut current, &mut parts);

    parts
}
