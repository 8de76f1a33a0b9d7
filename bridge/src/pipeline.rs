//! Post-processing passes run over the finished target tree

use crate::config::ConversionConfig;
use crate::position::{LineIndex, TextRange};
use crate::source::{CommentSource, TokenSource};
use crate::target::{CommentRecord, TargetTree, TokenRecord};
use crate::traverse;

/// Remove position fields the configuration did not ask for.
///
/// The two flags are independent. Running the pass twice is the same as
/// running it once.
pub fn strip_positions(tree: &mut TargetTree, config: &ConversionConfig) {
    if !config.strips_positions() {
        return;
    }

    let keep_range = config.include_position_ranges;
    let keep_loc = config.include_line_column;
    traverse::walk_mut(tree, |_, node| {
        if !keep_range {
            node.range = None;
        }
        if !keep_loc {
            node.loc = None;
        }
    });
}

/// Attach the token stream as a flat, position-ordered list on the root.
pub fn materialize_tokens(tree: &mut TargetTree, source: &dyn TokenSource, lines: &LineIndex<'_>) {
    let mut tokens: Vec<TokenRecord> = source
        .tokens(lines.text())
        .into_iter()
        .map(|token| {
            let range = TextRange::new(token.start, token.end);
            TokenRecord {
                kind: token.kind,
                value: token.value,
                range,
                loc: lines.location(range),
            }
        })
        .collect();
    tokens.sort_by_key(|token| token.range.start);

    tracing::debug!(count = tokens.len(), "materialized tokens");
    tree.tokens = Some(tokens);
}

/// Attach the comment list as a flat, position-ordered list on the root.
pub fn materialize_comments(
    tree: &mut TargetTree,
    source: &dyn CommentSource,
    lines: &LineIndex<'_>,
) {
    let mut comments: Vec<CommentRecord> = source
        .comments(lines.text())
        .into_iter()
        .map(|comment| {
            let range = TextRange::new(comment.start, comment.end);
            CommentRecord {
                style: comment.style,
                value: comment.text,
                range,
                loc: lines.location(range),
            }
        })
        .collect();
    comments.sort_by_key(|comment| comment.range.start);

    tracing::debug!(count = comments.len(), "materialized comments");
    tree.comments = Some(comments);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SourceLocation;
    use crate::source::{CommentStyle, SourceComment, SourceToken};
    use crate::target::{Field, TargetId, TargetNode};

    struct FixedTokens(Vec<SourceToken>);

    impl TokenSource for FixedTokens {
        fn tokens(&self, _text: &str) -> Vec<SourceToken> {
            self.0.clone()
        }
    }

    struct FixedComments(Vec<SourceComment>);

    impl CommentSource for FixedComments {
        fn comments(&self, _text: &str) -> Vec<SourceComment> {
            self.0.clone()
        }
    }

    fn two_node_tree() -> TargetTree {
        let leaf = TargetNode::new(
            "Identifier".to_string(),
            Vec::new(),
            TextRange::new(0, 1),
            SourceLocation::default(),
            false,
        );
        let root = TargetNode::new(
            "Program".to_string(),
            vec![("body".to_string(), Field::Nodes(vec![TargetId::from_index(0)]))],
            TextRange::new(0, 2),
            SourceLocation::default(),
            false,
        );
        TargetTree::new(vec![leaf, root], TargetId::from_index(1))
    }

    #[test]
    fn test_flags_strip_independently() {
        let mut tree = two_node_tree();
        let config = ConversionConfig::default()
            .with_position_ranges(false)
            .with_line_column(true);

        strip_positions(&mut tree, &config);

        traverse::walk(&tree, |_, node| {
            assert!(node.range.is_none());
            assert!(node.loc.is_some());
        });
    }

    #[test]
    fn test_stripping_is_idempotent() {
        let config = ConversionConfig::default().with_line_column(true);
        let mut once = two_node_tree();
        strip_positions(&mut once, &config);
        let mut twice = once.clone();
        strip_positions(&mut twice, &config);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_keeping_everything_leaves_tree_untouched() {
        let config = ConversionConfig::default()
            .with_position_ranges(true)
            .with_line_column(true);
        let mut tree = two_node_tree();
        strip_positions(&mut tree, &config);
        assert_eq!(tree, two_node_tree());
    }

    #[test]
    fn test_tokens_are_position_ordered_with_locations() {
        let lines = LineIndex::new("a\n+ b");
        let source = FixedTokens(vec![
            SourceToken::new("Identifier", "b", 4, 5),
            SourceToken::new("Identifier", "a", 0, 1),
            SourceToken::new("Punctuator", "+", 2, 3),
        ]);
        let mut tree = two_node_tree();

        materialize_tokens(&mut tree, &source, &lines);

        let tokens = tree.tokens.as_ref().unwrap();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["a", "+", "b"]);
        assert_eq!(tokens[2].loc.start.line, 2);
        assert_eq!(tokens[2].loc.start.column, 2);
        assert!(tree.comments.is_none());
    }

    #[test]
    fn test_comment_pass_does_not_touch_tokens() {
        let lines = LineIndex::new("/* a */ x // b");
        let source = FixedComments(vec![
            SourceComment::line(" b", 10, 14),
            SourceComment::block(" a ", 0, 7),
        ]);
        let mut tree = two_node_tree();

        materialize_comments(&mut tree, &source, &lines);

        let comments = tree.comments.as_ref().unwrap();
        assert_eq!(comments[0].style, CommentStyle::Block);
        assert_eq!(comments[0].value, " a ");
        assert_eq!(comments[1].style, CommentStyle::Line);
        assert!(tree.tokens.is_none());
    }
}
