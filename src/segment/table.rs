use regex::Regex;

use super::clean::{BodyLine, NoisePatterns, classify_prose_line, collapse_whitespace};

const STRONG_TABLE_INDICATORS: [&str; 4] = ["[표]", "<표>", "[가]", "[나]"];

const WEAK_TABLE_INDICATORS: [&str; 12] = [
    "구분", "항목", "내용", "특징", "종류", "장점", "단점", "비고", "합계", "(가)", "(나)", "(다)",
];

pub(super) fn is_table_like(body: &str) -> bool {
    if STRONG_TABLE_INDICATORS
        .iter()
        .any(|indicator| body.contains(indicator))
    {
        return true;
    }

    WEAK_TABLE_INDICATORS
        .iter()
        .filter(|indicator| body.contains(*indicator))
        .count()
        >= 2
}

pub(super) fn split_table_cells(line: &str, cell_split: &Regex) -> Vec<String> {
    cell_split
        .split(line.trim())
        .map(collapse_whitespace)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Walks body lines, entering table mode on any line with two or more
/// space-separated cells and leaving it on the first line without. A run of
/// at least two rows becomes a markdown grid; a lone row falls back to prose.
pub(super) fn reconstruct_table_lines(
    lines: &[&str],
    cell_split: &Regex,
    noise: &NoisePatterns,
) -> (Vec<BodyLine>, bool) {
    let mut output = Vec::<BodyLine>::new();
    let mut rows = Vec::<Vec<String>>::new();
    let mut grid_emitted = false;

    for line in lines {
        let cells = split_table_cells(line, cell_split);
        if cells.len() >= 2 {
            rows.push(cells);
            continue;
        }

        grid_emitted |= flush_table_rows(&mut rows, &mut output, noise);
        output.push(classify_prose_line(line, noise));
    }

    grid_emitted |= flush_table_rows(&mut rows, &mut output, noise);
    (output, grid_emitted)
}

/// Emits the pending rows: a lone row goes back to prose, a run becomes grid
/// lines padded to the widest row with a separator after the header.
fn flush_table_rows(
    rows: &mut Vec<Vec<String>>,
    output: &mut Vec<BodyLine>,
    noise: &NoisePatterns,
) -> bool {
    if rows.len() < 2 {
        if let Some(row) = rows.pop() {
            output.push(classify_prose_line(&row.join(" "), noise));
        }
        return false;
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(1);
    for (index, row) in rows.drain(..).enumerate() {
        output.push(BodyLine::Grid(grid_row(&row, width)));
        if index == 0 {
            output.push(BodyLine::Grid(grid_row(&vec!["---".to_string(); width], width)));
        }
    }
    true
}

fn grid_row(cells: &[String], width: usize) -> String {
    let rendered = (0..width)
        .map(|column| {
            cells
                .get(column)
                .map(|cell| cell.replace('|', "\\|"))
                .unwrap_or_default()
        })
        .collect::<Vec<String>>();
    format!("| {} |", rendered.join(" | "))
}
