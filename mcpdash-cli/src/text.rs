//! Plain-text rendering of the view tree for the terminal.

use mcpdash_core::view::{format_timestamp, preview, AlertLevel, Card, Inline, ViewNode};
use mcpdash_core::PageWindow;

/// Table cells are clipped to this many characters.
const CELL_WIDTH: usize = 40;

fn inline_text(inline: &Inline) -> String {
    match inline {
        Inline::Text(t) | Inline::Markdown(t) | Inline::Preformatted(t) => t.clone(),
        Inline::Code(t) => t.clone(),
        Inline::Badge(b) => format!("[{}]", b.text),
        Inline::Collapsible { content, .. } => inline_text(content),
        Inline::Timestamp(t) => format_timestamp(t),
        Inline::Labeled { label, value } => format!("{}: {}", label, inline_text(value)),
        Inline::Link(l) => format!("{} <{}>", l.text, l.href),
    }
}

/// One line per cell: newlines folded, long text clipped.
fn cell_text(inline: &Inline) -> String {
    let flat = inline_text(inline).replace(['\r', '\n'], " ");
    preview(flat.trim(), CELL_WIDTH)
}

fn level_tag(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => "info",
        AlertLevel::Success => "ok",
        AlertLevel::Warning => "warning",
        AlertLevel::Danger => "error",
    }
}

fn push_indented(out: &mut String, text: &str, indent: &str) {
    for line in text.lines() {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}

fn render_card(out: &mut String, card: &Card) {
    out.push_str("* ");
    out.push_str(&card.title);
    if let Some(subtitle) = &card.subtitle {
        out.push_str(" (");
        out.push_str(subtitle);
        out.push(')');
    }
    if let Some(badge) = &card.badge {
        out.push_str(" [");
        out.push_str(&badge.text);
        out.push(']');
    }
    out.push('\n');
    for inline in &card.body {
        push_indented(out, &inline_text(inline), "  ");
    }
    if let Some(footer) = &card.footer {
        push_indented(out, &inline_text(footer), "  ");
    }
}

fn render_table(out: &mut String, columns: &[String], rows: &[Vec<Inline>]) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    out.push_str(&line(columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
        out.push('\n');
    }
}

pub fn pagination_line(window: &PageWindow) -> String {
    let mut parts = Vec::new();
    if let Some(prev) = window.prev_page() {
        parts.push(format!("< {}", prev));
    }
    for &n in &window.pages {
        if n == window.current {
            parts.push(format!("[{}]", n));
        } else {
            parts.push(n.to_string());
        }
    }
    if let Some(next) = window.next_page() {
        parts.push(format!("{} >", next));
    }
    format!("Pages: {}", parts.join(" "))
}

pub fn render_node(out: &mut String, node: &ViewNode) {
    match node {
        ViewNode::Alert { level, text } => {
            out.push_str(&format!("[{}] {}\n", level_tag(*level), text));
        }
        ViewNode::CorrelationHeader { correlation_id } => {
            out.push_str(&format!("Request ID: {}\n", correlation_id));
        }
        ViewNode::CardGrid { cards } => cards.iter().for_each(|c| render_card(out, c)),
        ViewNode::Card(card) => render_card(out, card),
        ViewNode::Fields { fields } => {
            let width = fields.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
            for (label, value) in fields {
                out.push_str(&format!("{:<width$}  {}\n", label, inline_text(value), width = width));
            }
        }
        ViewNode::Table { columns, rows } => render_table(out, columns, rows),
        ViewNode::Accordion { items, .. } => {
            for item in items {
                out.push_str(if item.open { "v " } else { "> " });
                out.push_str(&item.title);
                out.push('\n');
                for inline in &item.body {
                    push_indented(out, &inline_text(inline), "    ");
                }
            }
        }
        ViewNode::Pagination { window, .. } => {
            out.push_str(&pagination_line(window));
            out.push('\n');
        }
    }
}

pub fn render_nodes(nodes: &[ViewNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node);
    }
    out
}

/// A titled block, as printed for each page section.
pub fn render_section(title: &str, nodes: &[ViewNode]) -> String {
    format!("== {} ==\n{}", title, render_nodes(nodes))
}
