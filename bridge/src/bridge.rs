//! Entry point: gate, driver, post-processing and result assembly

use crate::config::ConversionConfig;
use crate::driver::{self, Converted};
use crate::error::{BridgeError, ConversionError};
use crate::gate;
use crate::node_map::NodeMap;
use crate::pipeline;
use crate::position::LineIndex;
use crate::rules::RuleSet;
use crate::source::{CommentSource, SourceTree, TokenSource};
use crate::target::TargetTree;

/// What a successful conversion hands back to the caller.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub tree: TargetTree,
    /// Present only when `preserve_node_maps` was set
    pub node_map: Option<NodeMap>,
    /// Rule failures degraded to placeholders under `allow_invalid_ast`
    pub errors: Vec<ConversionError>,
}

impl ConversionResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A rule set plus the lexical collaborators needed by the optional passes.
///
/// Holds no state between calls; every `convert` builds its own arena, node map
/// and line index.
pub struct Bridge<'r, T: SourceTree + ?Sized> {
    rules: &'r RuleSet<T>,
    tokens: Option<&'r dyn TokenSource>,
    comments: Option<&'r dyn CommentSource>,
}

impl<'r, T: SourceTree + ?Sized> Bridge<'r, T> {
    pub fn new(rules: &'r RuleSet<T>) -> Self {
        Self {
            rules,
            tokens: None,
            comments: None,
        }
    }

    pub fn with_token_source(mut self, source: &'r dyn TokenSource) -> Self {
        self.tokens = Some(source);
        self
    }

    pub fn with_comment_source(mut self, source: &'r dyn CommentSource) -> Self {
        self.comments = Some(source);
        self
    }

    pub fn rules(&self) -> &'r RuleSet<T> {
        self.rules
    }

    #[tracing::instrument(name = "convert_tree", skip_all, fields(source_kind = source.kind(source.root())))]
    pub fn convert(
        &self,
        source: &T,
        config: &ConversionConfig,
    ) -> Result<ConversionResult, BridgeError> {
        config.validate()?;
        let tokens = match (config.include_tokens, self.tokens) {
            (true, None) => {
                return Err(BridgeError::Config(
                    "include_tokens is set but no token source was provided".to_string(),
                ))
            }
            (true, provided) => provided,
            (false, _) => None,
        };
        let comments = match (config.include_comments, self.comments) {
            (true, None) => {
                return Err(BridgeError::Config(
                    "include_comments is set but no comment source was provided".to_string(),
                ))
            }
            (true, provided) => provided,
            (false, _) => None,
        };

        let lines = LineIndex::new(source.text());
        gate::check_diagnostics(source.diagnostics(), &lines)?;

        let Converted {
            mut tree,
            node_map,
            errors,
        } = driver::run(source, self.rules, config, &lines)?;

        pipeline::strip_positions(&mut tree, config);
        if let Some(tokens) = tokens {
            pipeline::materialize_tokens(&mut tree, tokens, &lines);
        }
        if let Some(comments) = comments {
            pipeline::materialize_comments(&mut tree, comments, &lines);
        }

        tracing::debug!(
            nodes = tree.len(),
            mapped = node_map.len(),
            errors = errors.len(),
            "conversion finished"
        );

        let node_map = if config.preserve_node_maps {
            Some(node_map)
        } else {
            drop(node_map);
            None
        };

        Ok(ConversionResult {
            tree,
            node_map,
            errors,
        })
    }
}

/// Convert a tree that is its own token and comment source.
pub fn convert_tree<T>(
    source: &T,
    rules: &RuleSet<T>,
    config: &ConversionConfig,
) -> Result<ConversionResult, BridgeError>
where
    T: SourceTree + TokenSource + CommentSource,
{
    Bridge::new(rules)
        .with_token_source(source)
        .with_comment_source(source)
        .convert(source, config)
}
