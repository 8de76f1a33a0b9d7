//! Diagnostic gate: refuse to convert a tree the front-end could not parse

use crate::error::SyntaxError;
use crate::position::LineIndex;
use crate::source::Diagnostic;

/// Fail with the first diagnostic, if any.
///
/// Later diagnostics are usually knock-on effects of the first and are not
/// reported. The list order is trusted as-is and the tree is never walked.
pub fn check_diagnostics(
    diagnostics: &[Diagnostic],
    lines: &LineIndex<'_>,
) -> Result<(), SyntaxError> {
    match diagnostics.first() {
        Some(first) => {
            if diagnostics.len() > 1 {
                tracing::debug!(
                    suppressed = diagnostics.len() - 1,
                    "reporting first parse diagnostic only"
                );
            }
            Err(SyntaxError::from_diagnostic(first, lines))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics_pass() {
        let lines = LineIndex::new("a;");
        assert!(check_diagnostics(&[], &lines).is_ok());
    }

    #[test]
    fn test_only_first_diagnostic_surfaces() {
        let lines = LineIndex::new("let x = ;\nconst y = 2 3;\n");
        let diagnostics = vec![
            Diagnostic::new("Expression expected.", 5).with_code(1109),
            Diagnostic::new("';' expected.", 20).with_code(1005),
        ];

        let err = check_diagnostics(&diagnostics, &lines).unwrap_err();

        assert_eq!(err.message, "Expression expected.");
        assert_eq!(err.position.offset, 5);
        assert_eq!(err.position.line, 1);
        assert_eq!(err.code, Some(1109));
    }

    #[test]
    fn test_list_order_is_trusted() {
        let lines = LineIndex::new("0123456789abcdefghijklmnop");
        let diagnostics = vec![
            Diagnostic::new("late", 20),
            Diagnostic::new("early", 5),
        ];

        let err = check_diagnostics(&diagnostics, &lines).unwrap_err();
        assert_eq!(err.message, "late");
    }
}
