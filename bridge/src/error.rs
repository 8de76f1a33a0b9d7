//! Error types for tree conversion

use crate::position::{LineIndex, Position, TextRange};
use crate::source::Diagnostic;
use thiserror::Error;

/// A fatal parse diagnostic surfaced by the diagnostic gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({position})")]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
    /// Offending text as reported by the front-end
    pub range: TextRange,
    pub code: Option<u32>,
}

impl SyntaxError {
    pub fn from_diagnostic(diagnostic: &Diagnostic, lines: &LineIndex<'_>) -> Self {
        Self {
            message: diagnostic.message.clone(),
            position: lines.position(diagnostic.start),
            range: diagnostic.range(),
            code: diagnostic.code,
        }
    }
}

/// A conversion rule failed for one source node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to convert {kind} at {position}: {message}")]
pub struct ConversionError {
    /// Kind of the source node whose rule failed
    pub kind: String,
    pub position: Position,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("unknown node kind '{kind}' at {position}")]
    UnknownNodeKind { kind: String, position: Position },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn position(&self) -> Option<Position> {
        match self {
            BridgeError::Syntax(err) => Some(err.position),
            BridgeError::UnknownNodeKind { position, .. } => Some(*position),
            BridgeError::Conversion(err) => Some(err.position),
            BridgeError::Config(_) => None,
        }
    }
}

/// Outcome of a failed rule invocation.
///
/// `Failed` is attributed to the node whose rule returned it and is subject to
/// the `allow_invalid_ast` setting. `Aborted` carries an error that has already
/// been judged fatal (typically from converting a child) and is propagated as is.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Aborted(#[from] BridgeError),
}

impl RuleError {
    pub fn failed(message: impl Into<String>) -> Self {
        RuleError::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_from_diagnostic_resolves_line_and_column() {
        let lines = LineIndex::new("let x = ;\nconst y = 2 3;\n");
        let diagnostic = Diagnostic::new("';' expected.", 20)
            .with_length(1)
            .with_code(1005);

        let err = SyntaxError::from_diagnostic(&diagnostic, &lines);

        assert_eq!(err.range, TextRange::new(20, 21));

        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 10);
        assert_eq!(err.code, Some(1005));
        assert_eq!(err.to_string(), "';' expected. (2:10)");
    }

    #[test]
    fn test_bridge_error_position() {
        let position = Position {
            offset: 3,
            line: 1,
            column: 3,
        };
        let err = BridgeError::UnknownNodeKind {
            kind: "JsxElement".to_string(),
            position,
        };

        assert_eq!(err.position(), Some(position));
        assert_eq!(err.to_string(), "unknown node kind 'JsxElement' at 1:3");
        assert_eq!(BridgeError::Config("x".to_string()).position(), None);
    }

    #[test]
    fn test_rule_error_wraps_fatal_errors() {
        let fatal = BridgeError::Config("missing".to_string());
        let err: RuleError = fatal.clone().into();
        assert!(matches!(err, RuleError::Aborted(inner) if inner == fatal));
    }
}
