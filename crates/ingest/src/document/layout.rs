//! Block segmentation for extracted text.
//!
//! Text engines hand back flat lines. This module groups them into blocks at
//! blank lines and classifies each block as a heading, list, table or
//! paragraph, then appends the result to a [`DocumentTree`].

use std::sync::LazyLock;

use regex::Regex;

use pagechunk_core::{CoreError, DocumentTree, NodeId, NodeKind};

static MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").expect("valid regex"));

static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}(?:\.\d{1,3}){0,5})\.?\s+(\S.*)$").expect("valid regex"));

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+•◦▪‣]|\d{1,3}[.)]|[a-zA-Z]\))\s+(\S.*)$").expect("valid regex")
});

static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+|\s{2,}").expect("valid regex"));

static PIPE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-{3,}:?$").expect("valid regex"));

static THEMATIC_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*{3,}|-{3,}|_{3,})$").expect("valid regex"));

const MAX_NUMBERED_HEADING_CHARS: usize = 120;
const MAX_CAPS_HEADING_CHARS: usize = 80;
const MAX_HEADING_WORDS: usize = 12;

/// Which structural cues a format is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayoutRules {
    /// `#` headings, pipe tables, thematic breaks.
    pub markdown_syntax: bool,
    /// Numbered (`1.2 Title`) and ALL-CAPS headings.
    pub heuristic_headings: bool,
    /// Column-aligned tables separated by tabs or runs of spaces.
    pub whitespace_tables: bool,
}

impl LayoutRules {
    pub const PDF: LayoutRules = LayoutRules {
        markdown_syntax: true,
        heuristic_headings: true,
        whitespace_tables: true,
    };
    pub const MARKDOWN: LayoutRules = LayoutRules {
        markdown_syntax: true,
        heuristic_headings: false,
        whitespace_tables: false,
    };
    pub const TEXT: LayoutRules = LayoutRules {
        markdown_syntax: false,
        heuristic_headings: false,
        whitespace_tables: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    List(Vec<String>),
    Table(Vec<Vec<String>>),
}

/// Split `text` into classified blocks in reading order.
pub(crate) fn parse_blocks(text: &str, rules: LayoutRules) -> Vec<Block> {
    let mut blocks = Vec::new();
    for lines in split_raw_blocks(text, rules) {
        classify(&lines, rules, &mut blocks);
    }
    blocks
}

/// Append parsed blocks under `parent`, all stamped with `page`.
pub(crate) fn append_blocks(
    tree: &mut DocumentTree,
    parent: NodeId,
    blocks: Vec<Block>,
    page: Option<u32>,
) -> Result<(), CoreError> {
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                tree.add_heading(parent, level, text, page)?;
            }
            Block::Paragraph(text) => {
                tree.add_paragraph(parent, text, page)?;
            }
            Block::List(items) => {
                let list = tree.add_container(parent, NodeKind::List, page)?;
                for item in items {
                    tree.add_list_item(list, item, page)?;
                }
            }
            Block::Table(rows) => {
                tree.add_table(parent, rows, page)?;
            }
        }
    }
    Ok(())
}

fn split_raw_blocks(text: &str, rules: LayoutRules) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim();
        let is_break = trimmed.is_empty()
            || (rules.markdown_syntax && THEMATIC_BREAK.is_match(trimmed));

        if is_break {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }

        // Markdown headings never share a block with their neighbours.
        if rules.markdown_syntax && MD_HEADING.is_match(trimmed) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            blocks.push(vec![line]);
            continue;
        }

        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn classify(lines: &[&str], rules: LayoutRules, out: &mut Vec<Block>) {
    let Some(first) = lines.first() else {
        return;
    };

    if lines.len() == 1 {
        if let Some((level, text)) = heading(first.trim(), rules) {
            out.push(Block::Heading { level, text });
            return;
        }
    }

    if let Some(rows) = table(lines, rules) {
        out.push(Block::Table(rows));
        return;
    }

    if lines.len() > 1 {
        // A heading printed directly above its first paragraph.
        if let Some((level, text)) = heading(first.trim(), rules) {
            out.push(Block::Heading { level, text });
            classify(&lines[1..], rules, out);
            return;
        }
    }

    if let Some(items) = list(lines) {
        out.push(Block::List(items));
        return;
    }

    out.push(Block::Paragraph(join_lines(lines)));
}

fn heading(line: &str, rules: LayoutRules) -> Option<(u8, String)> {
    if rules.markdown_syntax {
        if let Some(caps) = MD_HEADING.captures(line) {
            let level = caps[1].len() as u8;
            return Some((level, caps[2].trim().to_string()));
        }
    }
    if !rules.heuristic_headings {
        return None;
    }
    if line.split_whitespace().count() > MAX_HEADING_WORDS
        || line.ends_with(['.', ',', ';', ':'])
    {
        return None;
    }

    if let Some(caps) = NUMBERED_HEADING.captures(line) {
        let title = caps[2].trim();
        let starts_upper = title.chars().next().is_some_and(char::is_uppercase);
        if starts_upper && line.chars().count() <= MAX_NUMBERED_HEADING_CHARS {
            let level = caps[1].split('.').count().min(6) as u8;
            return Some((level, line.to_string()));
        }
        return None;
    }

    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    let all_caps = letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase());
    if all_caps && line.chars().count() <= MAX_CAPS_HEADING_CHARS {
        return Some((1, line.to_string()));
    }
    None
}

fn table(lines: &[&str], rules: LayoutRules) -> Option<Vec<Vec<String>>> {
    if rules.markdown_syntax && lines.iter().all(|l| l.trim_start().starts_with('|')) {
        let rows: Vec<Vec<String>> = lines
            .iter()
            .map(|l| pipe_cells(l))
            .filter(|cells| !cells.iter().all(|c| PIPE_SEPARATOR.is_match(c)))
            .collect();
        return (!rows.is_empty()).then_some(rows);
    }

    if !rules.whitespace_tables || lines.len() < 2 {
        return None;
    }
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|l| {
            COLUMN_GAP
                .split(l.trim())
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .collect();
    let width = rows[0].len();
    (width >= 2 && rows.iter().all(|r| r.len() == width)).then_some(rows)
}

fn pipe_cells(line: &str) -> Vec<String> {
    let inner = line.trim().trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn list(lines: &[&str]) -> Option<Vec<String>> {
    let first = LIST_MARKER.captures(lines[0].trim())?;
    let mut items = vec![first[1].to_string()];
    for line in &lines[1..] {
        let line = line.trim();
        match LIST_MARKER.captures(line) {
            Some(caps) => items.push(caps[1].to_string()),
            None => {
                if let Some(last) = items.last_mut() {
                    append_line(last, line);
                }
            }
        }
    }
    Some(items)
}

/// Join wrapped lines with a space, re-joining words hyphenated at a line end.
fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        append_line(&mut out, line.trim());
    }
    out
}

fn append_line(buf: &mut String, line: &str) {
    if buf.is_empty() {
        buf.push_str(line);
        return;
    }
    let hyphenated = buf.ends_with('-')
        && buf[..buf.len() - 1].chars().last().is_some_and(char::is_alphabetic)
        && line.chars().next().is_some_and(char::is_lowercase);
    if hyphenated {
        buf.pop();
    } else {
        buf.push(' ');
    }
    buf.push_str(line);
}
