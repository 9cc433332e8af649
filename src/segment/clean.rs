use anyhow::{Context, Result};
use regex::Regex;

const FOOTER_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum BodyLine {
    Prose(String),
    SubItem(String),
    Grid(String),
}

#[derive(Debug)]
pub(super) struct NoisePatterns {
    year_stamp: Regex,
    page_counter: Regex,
    passage_sentinel: Regex,
    sub_item: Regex,
}

impl NoisePatterns {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            year_stamp: Regex::new(
                r"^\s*(?:19|20)\d{2}\s*(?:학년도|년도|년)\s.*(?:모의고사|모의평가|학력평가|수능|시험|문제지)",
            )
            .context("failed to compile year-stamp footer regex")?,
            page_counter: Regex::new(r"^\s*(?:-\s*\d{1,3}\s*-|\d{1,3}\s*/\s*\d{1,3}|\d{1,3}\s*쪽)\s*$")
                .context("failed to compile page counter regex")?,
            passage_sentinel: Regex::new(r"^\s*<!--\s*/?passage:\d+\s*-->\s*$")
                .context("failed to compile passage sentinel line regex")?,
            sub_item: Regex::new(r"^\s*(?:\([ㄱ-ㅎ]\)|[ㄱ-ㅎ]\s*[:：.)])")
                .context("failed to compile sub-item label regex")?,
        })
    }

    pub(super) fn line_is_noise(&self, line: &str) -> bool {
        if self.page_counter.is_match(line) || self.passage_sentinel.is_match(line) {
            return true;
        }

        line.chars().count() <= FOOTER_MAX_CHARS && self.year_stamp.is_match(line)
    }

    pub(super) fn is_passage_sentinel(&self, line: &str) -> bool {
        self.passage_sentinel.is_match(line)
    }

    pub(super) fn is_sub_item(&self, line: &str) -> bool {
        self.sub_item.is_match(line)
    }
}

pub(super) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub(super) fn classify_prose_line(line: &str, noise: &NoisePatterns) -> BodyLine {
    let collapsed = collapse_whitespace(line);
    if noise.is_sub_item(&collapsed) {
        BodyLine::SubItem(collapsed)
    } else {
        BodyLine::Prose(collapsed)
    }
}

/// Joins consecutive prose lines with single spaces; sub-items and grid rows
/// keep a line of their own.
pub(super) fn render_body_lines(lines: &[BodyLine]) -> String {
    let mut rendered = Vec::<String>::new();
    let mut paragraph = String::new();

    for line in lines {
        match line {
            BodyLine::Prose(text) => {
                if text.is_empty() {
                    continue;
                }
                if !paragraph.is_empty() {
                    paragraph.push(' ');
                }
                paragraph.push_str(text);
            }
            BodyLine::SubItem(text) | BodyLine::Grid(text) => {
                if !paragraph.is_empty() {
                    rendered.push(std::mem::take(&mut paragraph));
                }
                rendered.push(text.clone());
            }
        }
    }

    if !paragraph.is_empty() {
        rendered.push(paragraph);
    }

    rendered.join("\n").trim().to_string()
}
