//! Conversion driver: top-down walk of the source tree through the rule set

use crate::config::ConversionConfig;
use crate::error::{BridgeError, ConversionError, RuleError};
use crate::node_map::NodeMap;
use crate::position::{LineIndex, Position, TextRange};
use crate::rules::{NodeDraft, RuleSet, SpanPolicy};
use crate::source::{SourceId, SourceTree};
use crate::target::{TargetId, TargetNode, TargetTree};
use std::collections::HashSet;

/// Output of the driver, before post-processing.
#[derive(Debug)]
pub(crate) struct Converted {
    pub tree: TargetTree,
    pub node_map: NodeMap,
    pub errors: Vec<ConversionError>,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    nodes: usize,
    errors: usize,
}

/// State of one conversion, handed to every rule.
///
/// Owns the target arena, the node map and the recorded errors for a single
/// invocation; nothing here outlives the call that created it.
pub struct ConversionContext<'a, T: SourceTree + ?Sized> {
    source: &'a T,
    rules: &'a RuleSet<T>,
    config: &'a ConversionConfig,
    lines: &'a LineIndex<'a>,
    nodes: Vec<TargetNode>,
    node_map: NodeMap,
    /// Recorded failures, keyed by the placeholder that stands in for them
    errors: Vec<(TargetId, ConversionError)>,
    warned_kinds: HashSet<String>,
    current: SourceId,
}

impl<'a, T: SourceTree + ?Sized> ConversionContext<'a, T> {
    pub(crate) fn new(
        source: &'a T,
        rules: &'a RuleSet<T>,
        config: &'a ConversionConfig,
        lines: &'a LineIndex<'a>,
    ) -> Self {
        Self {
            source,
            rules,
            config,
            lines,
            nodes: Vec::new(),
            node_map: NodeMap::new(),
            errors: Vec::new(),
            warned_kinds: HashSet::new(),
            current: source.root(),
        }
    }

    pub fn source(&self) -> &'a T {
        self.source
    }

    pub fn config(&self) -> &'a ConversionConfig {
        self.config
    }

    /// The source node whose rule is running
    pub fn current(&self) -> SourceId {
        self.current
    }

    pub fn position_of(&self, node: SourceId) -> Position {
        self.lines.position(self.source.range(node).start)
    }

    /// Convert one source node and its subtree.
    ///
    /// Returns the target nodes to splice into the caller, which is empty when
    /// an unknown kind was skipped in lenient mode.
    pub fn convert(&mut self, node: SourceId) -> Result<Vec<TargetId>, BridgeError> {
        let source = self.source;
        let kind = source.kind(node);
        let rules = self.rules;

        let Some(rule) = rules.get(kind) else {
            return self.skip_unknown(node, kind);
        };

        let checkpoint = Checkpoint {
            nodes: self.nodes.len(),
            errors: self.errors.len(),
        };
        let parent = std::mem::replace(&mut self.current, node);
        let outcome = rule.convert(node, self);
        self.current = parent;

        match outcome {
            Ok(produced) => {
                tracing::trace!(kind, node = %node, produced = produced.len(), "converted node");
                Ok(produced)
            }
            Err(RuleError::Aborted(err)) => Err(err),
            Err(RuleError::Failed(message)) => {
                let error = ConversionError {
                    kind: kind.to_string(),
                    position: self.position_of(node),
                    message,
                };
                if !self.config.allow_invalid_ast {
                    return Err(error.into());
                }

                tracing::warn!(%error, "substituting placeholder for failed rule");
                self.rollback(checkpoint);
                let placeholder = NodeDraft::new(self.config.placeholder_kind.as_str())
                    .value("message", error.message.as_str());
                let id = self.emit_for(node, placeholder);
                self.errors.push((id, error));
                Ok(vec![id])
            }
        }
    }

    /// Convert every child of `node` in textual order, concatenating the output.
    pub fn convert_children(&mut self, node: SourceId) -> Result<Vec<TargetId>, BridgeError> {
        let source = self.source;
        let mut converted = Vec::new();
        for &child in source.children(node) {
            converted.extend(self.convert(child)?);
        }
        Ok(converted)
    }

    /// Convert a child that must map to at most one target node.
    pub fn convert_single(&mut self, node: SourceId) -> Result<Option<TargetId>, RuleError> {
        let produced = self.convert(node)?;
        match produced.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(RuleError::failed(format!(
                "expected a single node from {}, got {}",
                self.source.kind(node),
                produced.len()
            ))),
        }
    }

    /// Emit a target node produced from the current source node.
    pub fn emit(&mut self, draft: NodeDraft) -> TargetId {
        self.emit_for(self.current, draft)
    }

    pub fn target(&self, id: TargetId) -> Option<&TargetNode> {
        self.nodes.get(id.index())
    }

    pub fn range_of(&self, id: TargetId) -> Option<TextRange> {
        self.target(id).and_then(|node| node.range)
    }

    fn emit_for(&mut self, source_node: SourceId, draft: NodeDraft) -> TargetId {
        let source_range = self.source.range(source_node);
        let range = match draft.span {
            SpanPolicy::Source => source_range,
            SpanPolicy::Explicit(range) => range,
            SpanPolicy::UnionOfChildren => {
                TextRange::cover(draft.child_ids().filter_map(|child| self.range_of(child)))
                    .unwrap_or(source_range)
            }
        };
        let loc = self.lines.location(range);

        let id = TargetId::from_index(self.nodes.len());
        if !draft.synthetic {
            self.node_map.register(source_node, id);
        }
        self.nodes.push(TargetNode::new(
            draft.kind,
            draft.fields,
            range,
            loc,
            draft.synthetic,
        ));
        id
    }

    fn skip_unknown(&mut self, node: SourceId, kind: &str) -> Result<Vec<TargetId>, BridgeError> {
        let position = self.position_of(node);
        if self.config.fail_on_unknown_node_kind {
            return Err(BridgeError::UnknownNodeKind {
                kind: kind.to_string(),
                position,
            });
        }

        if !self.config.suppress_unknown_kind_warnings && self.warned_kinds.insert(kind.to_string())
        {
            tracing::warn!(kind, %position, "no conversion rule for node kind, skipping subtree");
        }
        Ok(Vec::new())
    }

    /// Discard everything emitted or recorded since `checkpoint`, including
    /// errors behind placeholders inside the discarded subtree.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.nodes.truncate(checkpoint.nodes);
        self.node_map.rollback(TargetId::from_index(checkpoint.nodes));
        self.errors.truncate(checkpoint.errors);
    }

    /// Build the result from the nodes reachable from `root`.
    ///
    /// Nodes a rule emitted but never attached are dropped together with their
    /// node map entries and any error recorded for them.
    fn finish(self, root: TargetId) -> Converted {
        let mut tree = TargetTree::new(self.nodes, root);
        let emitted = tree.len();
        let remap = tree.retain_reachable();
        if tree.len() < emitted {
            tracing::debug!(
                dropped = emitted - tree.len(),
                "dropped target nodes not attached to the tree"
            );
        }

        let errors = self
            .errors
            .into_iter()
            .filter(|(placeholder, _)| matches!(remap.get(placeholder.index()), Some(Some(_))))
            .map(|(_, error)| error)
            .collect();

        Converted {
            tree,
            node_map: self.node_map.remap(&remap),
            errors,
        }
    }
}

/// Convert the whole source tree. The root must convert to exactly one node.
pub(crate) fn run<T: SourceTree + ?Sized>(
    source: &T,
    rules: &RuleSet<T>,
    config: &ConversionConfig,
    lines: &LineIndex<'_>,
) -> Result<Converted, BridgeError> {
    let mut cx = ConversionContext::new(source, rules, config, lines);
    let root_source = source.root();
    let produced = cx.convert(root_source)?;

    let root = match produced.as_slice() {
        [root] => *root,
        _ => {
            return Err(ConversionError {
                kind: source.kind(root_source).to_string(),
                position: cx.position_of(root_source),
                message: format!(
                    "root must convert to exactly one node, got {}",
                    produced.len()
                ),
            }
            .into())
        }
    };

    Ok(cx.finish(root))
}
