use std::collections::HashSet;

use regex::Regex;

use crate::model::{PassageSource, SourceOffsets};

use super::PassageDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentinelKind {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct SentinelToken {
    kind: SentinelKind,
    id: u32,
    start: usize,
    end: usize,
}

fn tokenize_sentinels(text: &str, sentinel_token: &Regex) -> Vec<SentinelToken> {
    sentinel_token
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let id = captures.name("id")?.as_str().parse::<u32>().ok()?;
            let kind = if captures.name("close").is_some() {
                SentinelKind::Close
            } else {
                SentinelKind::Open
            };
            Some(SentinelToken {
                kind,
                id,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Captures text between `<!-- passage:N -->` and the next
/// `<!-- /passage:N -->` with the same N. An open token with no matching
/// close is passed over; an id captured once is never captured again, but its
/// span is still consumed.
pub(super) fn extract_sentinel_passages(text: &str, sentinel_token: &Regex) -> Vec<PassageDraft> {
    let tokens = tokenize_sentinels(text, sentinel_token);
    let mut captured_ids = HashSet::<u32>::new();
    let mut drafts = Vec::<PassageDraft>::new();
    let mut index = 0usize;

    while index < tokens.len() {
        let open = tokens[index];
        if open.kind != SentinelKind::Open {
            index += 1;
            continue;
        }

        let Some(close_offset) = tokens[index + 1..]
            .iter()
            .position(|token| token.kind == SentinelKind::Close && token.id == open.id)
        else {
            index += 1;
            continue;
        };
        let close = tokens[index + 1 + close_offset];
        index += close_offset + 2;

        if !captured_ids.insert(open.id) {
            continue;
        }

        let inner = sentinel_token.replace_all(&text[open.end..close.start], "");
        let content = inner.trim().to_string();
        if content.is_empty() {
            continue;
        }

        drafts.push(PassageDraft {
            content,
            range: SourceOffsets {
                start: open.start,
                end: close.end,
            },
            source: PassageSource::Sentinel,
        });
    }

    drafts
}
