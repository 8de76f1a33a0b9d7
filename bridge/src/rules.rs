//! Rule set: the data-driven table of per-kind conversion handlers
//!
//! The engine never inspects node kinds itself. It looks the kind up here and
//! hands control to the registered rule, which converts the children it needs
//! through the [`ConversionContext`] and emits one or more target nodes.

use crate::driver::ConversionContext;
use crate::error::RuleError;
use crate::position::TextRange;
use crate::source::{SourceId, SourceTree};
use crate::target::{Field, TargetId};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Target nodes a rule splices into its parent, in order.
pub type RuleOutput = Result<Vec<TargetId>, RuleError>;

/// How the driver stamps the range of an emitted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanPolicy {
    /// The span of the source node being converted
    #[default]
    Source,
    /// A span supplied by the rule
    Explicit(TextRange),
    /// The union of the spans of the node's already-converted children,
    /// falling back to the source span when it has none
    UnionOfChildren,
}

/// A target node as described by a rule, before the driver stamps positions
/// and registers it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub(crate) kind: String,
    pub(crate) fields: Vec<(String, Field)>,
    pub(crate) span: SpanPolicy,
    pub(crate) synthetic: bool,
}

impl NodeDraft {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            span: SpanPolicy::Source,
            synthetic: false,
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.push((name.into(), field.into()));
        self
    }

    pub fn node(self, name: impl Into<String>, id: TargetId) -> Self {
        self.field(name, Field::Node(id))
    }

    pub fn nodes(self, name: impl Into<String>, ids: Vec<TargetId>) -> Self {
        self.field(name, Field::Nodes(ids))
    }

    /// A child slot that may be empty; an absent child renders as `null`.
    pub fn optional_node(self, name: impl Into<String>, id: Option<TargetId>) -> Self {
        match id {
            Some(id) => self.node(name, id),
            None => self.value(name, Value::Null),
        }
    }

    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field(name, Field::Value(value.into()))
    }

    pub fn with_span(mut self, range: TextRange) -> Self {
        self.span = SpanPolicy::Explicit(range);
        self
    }

    pub fn span_of_children(mut self) -> Self {
        self.span = SpanPolicy::UnionOfChildren;
        self
    }

    /// Mark the node as having no source counterpart; it is not registered in
    /// the node map.
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn child_ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.fields
            .iter()
            .flat_map(|(_, field)| field.node_ids().iter().copied())
    }
}

/// Conversion handler for one source node kind.
pub trait ConversionRule<T: SourceTree + ?Sized>: Send + Sync {
    fn convert(&self, node: SourceId, cx: &mut ConversionContext<'_, T>) -> RuleOutput;
}

impl<T, F> ConversionRule<T> for F
where
    T: SourceTree + ?Sized,
    F: Fn(SourceId, &mut ConversionContext<'_, T>) -> RuleOutput + Send + Sync,
{
    fn convert(&self, node: SourceId, cx: &mut ConversionContext<'_, T>) -> RuleOutput {
        self(node, cx)
    }
}

/// Kind -> handler registry supplied by the caller.
pub struct RuleSet<T: SourceTree + ?Sized> {
    rules: HashMap<String, Box<dyn ConversionRule<T>>>,
}

impl<T: SourceTree + ?Sized> RuleSet<T> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register a function or closure as the rule for `kind`.
    pub fn with_rule<F>(mut self, kind: impl Into<String>, rule: F) -> Self
    where
        F: Fn(SourceId, &mut ConversionContext<'_, T>) -> RuleOutput + Send + Sync + 'static,
    {
        self.rules.insert(kind.into(), Box::new(rule));
        self
    }

    /// Register a rule type, returning the rule it replaced.
    pub fn insert<R>(&mut self, kind: impl Into<String>, rule: R) -> Option<Box<dyn ConversionRule<T>>>
    where
        R: ConversionRule<T> + 'static,
    {
        self.rules.insert(kind.into(), Box::new(rule))
    }

    pub fn get(&self, kind: &str) -> Option<&dyn ConversionRule<T>> {
        self.rules.get(kind).map(|rule| rule.as_ref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl<T: SourceTree + ?Sized> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SourceTree + ?Sized> fmt::Debug for RuleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("kinds", &self.kinds())
            .finish()
    }
}
