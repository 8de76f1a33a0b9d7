//! Interfaces the engine consumes from the front-end

use crate::position::TextRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node of the front-end's tree.
///
/// Identity is the handle itself: two structurally identical nodes are still
/// distinct if their handles differ.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SourceId(pub u32);

impl SourceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A parse diagnostic reported by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    /// Offset of the first offending character
    pub start: usize,
    /// Length of the offending text, zero when the front-end reports a point
    #[serde(default)]
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, start: usize) -> Self {
        Self {
            message: message.into(),
            start,
            length: 0,
            code: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.start.saturating_add(self.length))
    }
}

/// Read access to a front-end parse tree.
///
/// Every `SourceId` passed to these methods must have been handed out by the
/// same tree (through `root` or `children`).
pub trait SourceTree {
    fn root(&self) -> SourceId;

    /// The node kind used to look up a conversion rule (e.g. "BinaryExpression")
    fn kind(&self, node: SourceId) -> &str;

    fn range(&self, node: SourceId) -> TextRange;

    /// Children in textual order
    fn children(&self, node: SourceId) -> &[SourceId];

    /// Parse diagnostics, ordered by position
    fn diagnostics(&self) -> &[Diagnostic];

    /// The raw program text the tree was parsed from
    fn text(&self) -> &str;
}

/// One lexical token as produced by the front-end's scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToken {
    pub kind: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl SourceToken {
    pub fn new(kind: impl Into<String>, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentStyle {
    #[serde(alias = "line")]
    Line,
    #[serde(alias = "block")]
    Block,
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentStyle::Line => write!(f, "Line"),
            CommentStyle::Block => write!(f, "Block"),
        }
    }
}

/// One comment as produced by the front-end's comment scanner.
///
/// `text` excludes the delimiters (`//`, `/*`, `*/`); `start..end` covers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceComment {
    pub style: CommentStyle,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl SourceComment {
    pub fn line(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            style: CommentStyle::Line,
            text: text.into(),
            start,
            end,
        }
    }

    pub fn block(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            style: CommentStyle::Block,
            text: text.into(),
            start,
            end,
        }
    }
}

/// Lexical token stream for a program text.
pub trait TokenSource {
    fn tokens(&self, text: &str) -> Vec<SourceToken>;
}

/// Comment list for a program text.
pub trait CommentSource {
    fn comments(&self, text: &str) -> Vec<SourceComment>;
}
