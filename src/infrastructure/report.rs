//! Category distribution report
//!
//! Counts products per main category and renders the counts as a standalone
//! SVG bar chart, tallest bar first.

#![allow(clippy::uninlined_format_args)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use super::csv_export::{self, ExportError};
use crate::application::dto::{MAIN_CATEG_COL, ProductTable};

const BAR_WIDTH: usize = 40;
const BAR_GAP: usize = 20;
const PLOT_HEIGHT: usize = 300;
const MARGIN_TOP: usize = 60;
const MARGIN_SIDE: usize = 60;
const LABEL_SPACE: usize = 140;
const BAR_COLOR: &str = "blue";

/// Rows per distinct value of `column`, most frequent first; equal counts keep
/// the order in which the values first appear
pub fn category_distribution(
    table: &ProductTable,
    column: &str,
) -> Result<Vec<(String, usize)>, ExportError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| ExportError::MissingColumn {
            column: column.to_string(),
        })?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(category, _)| category == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }

    // Stable sort keeps first-appearance order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Standalone SVG document with one bar per category
pub fn render_bar_chart_svg(counts: &[(String, usize)], title: &str) -> String {
    let slots = counts.len().max(1);
    let width = MARGIN_SIDE * 2 + slots * (BAR_WIDTH + BAR_GAP);
    let height = MARGIN_TOP + PLOT_HEIGHT + LABEL_SPACE;
    let baseline = MARGIN_TOP + PLOT_HEIGHT;
    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="18">{}</text>"#,
        width / 2,
        MARGIN_TOP / 2,
        escape_xml(title)
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y}" stroke="black"/>"#,
        x = MARGIN_SIDE,
        x2 = width - MARGIN_SIDE,
        y = baseline
    );

    if counts.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="14">No data</text>"#,
            width / 2,
            MARGIN_TOP + PLOT_HEIGHT / 2
        );
    }

    for (i, (category, count)) in counts.iter().enumerate() {
        let bar_height = if max_count == 0 {
            0
        } else {
            count * PLOT_HEIGHT / max_count
        };
        let x = MARGIN_SIDE + i * (BAR_WIDTH + BAR_GAP) + BAR_GAP / 2;
        let y = baseline - bar_height;
        let center = x + BAR_WIDTH / 2;
        let label = escape_xml(category);

        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"><title>{}: {}</title></rect>"#,
            x, y, BAR_WIDTH, bar_height, BAR_COLOR, label, count
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
            center,
            y.saturating_sub(5),
            count
        );
        let _ = writeln!(
            svg,
            r#"<text x="{cx}" y="{ly}" text-anchor="end" font-family="sans-serif" font-size="12" transform="rotate(-45 {cx} {ly})">{label}</text>"#,
            cx = center,
            ly = baseline + 15,
            label = label
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Chart of the main-category distribution in `result_csv`, written to
/// `out_svg`; returns the counts that were drawn
pub fn create_product_distribution_report(
    result_csv: &Path,
    out_svg: &Path,
) -> Result<Vec<(String, usize)>, ExportError> {
    let table = csv_export::read_table(result_csv)?;
    let counts = category_distribution(&table, MAIN_CATEG_COL)?;
    let svg = render_bar_chart_svg(&counts, "Products per main category");

    if let Some(parent) = out_svg.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
    }
    fs::write(out_svg, svg).map_err(ExportError::io(out_svg))?;

    info!(
        "Wrote distribution report for {} categories to {}",
        counts.len(),
        out_svg.display()
    );
    Ok(counts)
}
