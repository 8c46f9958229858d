//! Contextualized rendering of chunks.
//!
//! Output format, by [`ContextStyle`]:
//!
//! - `Plain`: heading texts root-first, one per line, then the chunk text,
//!   all joined with `\n` (`"Introduction\nHello world."`).
//! - `Markdown`: headings as `#`×level lines, a blank line, then the chunk
//!   text (`"# Introduction\n\nHello world."`).
//!
//! With an empty heading trail both styles return the chunk text unchanged.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStyle {
    #[default]
    Plain,
    Markdown,
}

impl FromStr for ContextStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown context style '{other}' (expected plain|markdown)")),
        }
    }
}

impl fmt::Display for ContextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Markdown => f.write_str("markdown"),
        }
    }
}

/// A chunk together with its contextualized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualizedChunk {
    pub chunk: Chunk,
    pub contextualized_text: String,
}

/// Renders chunks with their heading trail. Stateless apart from the style.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contextualizer {
    style: ContextStyle,
}

impl Contextualizer {
    pub fn new(style: ContextStyle) -> Self {
        Self { style }
    }

    /// Heading trail followed by the chunk text. Depends only on `chunk`.
    pub fn contextualize(&self, chunk: &Chunk) -> String {
        if chunk.headings.is_empty() {
            return chunk.text.clone();
        }

        match self.style {
            ContextStyle::Plain => {
                let mut parts: Vec<&str> = chunk.headings.iter().map(|h| h.text.as_str()).collect();
                parts.push(&chunk.text);
                parts.join("\n")
            }
            ContextStyle::Markdown => {
                let trail = chunk
                    .headings
                    .iter()
                    .map(|h| format!("{} {}", "#".repeat(h.level.max(1) as usize), h.text))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{trail}\n\n{}", chunk.text)
            }
        }
    }

    /// Contextualize every chunk in parallel, preserving input order.
    pub fn contextualize_all(&self, chunks: Vec<Chunk>) -> Vec<ContextualizedChunk> {
        chunks
            .into_par_iter()
            .map(|chunk| ContextualizedChunk {
                contextualized_text: self.contextualize(&chunk),
                chunk,
            })
            .collect()
    }
}
