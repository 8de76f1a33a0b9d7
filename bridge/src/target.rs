//! Target tree: the ESTree-style output of a conversion

use crate::position::{SourceLocation, TextRange};
use crate::source::CommentStyle;
use crate::traverse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Handle to a node in a [`TargetTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u32);

impl TargetId {
    pub(crate) fn from_index(index: usize) -> Self {
        TargetId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Value of a named field on a target node.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Node(TargetId),
    Nodes(Vec<TargetId>),
    Value(Value),
}

impl Field {
    /// Child node handles held by this field, in order
    pub fn node_ids(&self) -> &[TargetId] {
        match self {
            Field::Node(id) => std::slice::from_ref(id),
            Field::Nodes(ids) => ids,
            Field::Value(_) => &[],
        }
    }
}

impl From<TargetId> for Field {
    fn from(id: TargetId) -> Self {
        Field::Node(id)
    }
}

impl From<Vec<TargetId>> for Field {
    fn from(ids: Vec<TargetId>) -> Self {
        Field::Nodes(ids)
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetNode {
    pub kind: String,
    fields: Vec<(String, Field)>,
    pub range: Option<TextRange>,
    pub loc: Option<SourceLocation>,
    synthetic: bool,
}

impl TargetNode {
    pub(crate) fn new(
        kind: String,
        fields: Vec<(String, Field)>,
        range: TextRange,
        loc: SourceLocation,
        synthetic: bool,
    ) -> Self {
        Self {
            kind,
            fields,
            range: Some(range),
            loc: Some(loc),
            synthetic,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    /// Fields in the order the rule declared them
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Child handles across all fields, in field order
    pub fn child_ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.fields
            .iter()
            .flat_map(|(_, field)| field.node_ids().iter().copied())
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.field(name)? {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Synthetic nodes have no source counterpart in the node map
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    fn remap_children(&mut self, remap: &[Option<TargetId>]) {
        let renumber = |id: &mut TargetId| {
            if let Some(Some(new)) = remap.get(id.index()) {
                *id = *new;
            }
        };
        for (_, field) in &mut self.fields {
            match field {
                Field::Node(id) => renumber(id),
                Field::Nodes(ids) => ids.iter_mut().for_each(renumber),
                Field::Value(_) => {}
            }
        }
    }
}

/// Flat token record attached at the root when tokens are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub range: TextRange,
    pub loc: SourceLocation,
}

/// Flat comment record attached at the root when comments are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "type")]
    pub style: CommentStyle,
    pub value: String,
    pub range: TextRange,
    pub loc: SourceLocation,
}

/// Arena of converted nodes plus the root-level token and comment lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetTree {
    nodes: Vec<TargetNode>,
    root: TargetId,
    /// Present only when tokens were materialized
    pub tokens: Option<Vec<TokenRecord>>,
    /// Present only when comments were materialized
    pub comments: Option<Vec<CommentRecord>>,
}

impl TargetTree {
    pub(crate) fn new(nodes: Vec<TargetNode>, root: TargetId) -> Self {
        Self {
            nodes,
            root,
            tokens: None,
            comments: None,
        }
    }

    pub fn root(&self) -> TargetId {
        self.root
    }

    pub fn root_node(&self) -> &TargetNode {
        &self.nodes[self.root.index()]
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: TargetId) -> Option<&mut TargetNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop nodes not reachable from the root and renumber the rest, keeping
    /// their relative order. Returns the old-to-new handle table.
    pub(crate) fn retain_reachable(&mut self) -> Vec<Option<TargetId>> {
        let mut keep = vec![false; self.nodes.len()];
        for id in traverse::reachable(self) {
            keep[id.index()] = true;
        }

        let mut next = 0;
        let remap: Vec<Option<TargetId>> = keep
            .iter()
            .map(|&kept| {
                kept.then(|| {
                    next += 1;
                    TargetId::from_index(next - 1)
                })
            })
            .collect();

        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_iter()
            .zip(keep)
            .filter_map(|(mut node, kept)| {
                kept.then(|| {
                    node.remap_children(&remap);
                    node
                })
            })
            .collect();
        if let Some(Some(root)) = remap.get(self.root.index()) {
            self.root = *root;
        }

        remap
    }

    /// Direct children of `id` in field order
    pub fn children(&self, id: TargetId) -> Vec<TargetId> {
        self.get(id)
            .map(|node| node.child_ids().collect())
            .unwrap_or_default()
    }

    /// Kinds of the direct children of `id`, handy for shape assertions
    pub fn child_kinds(&self, id: TargetId) -> Vec<&str> {
        self.children(id)
            .into_iter()
            .filter_map(|child| self.get(child).map(|node| node.kind.as_str()))
            .collect()
    }

    /// Render as an ESTree-style JSON document.
    ///
    /// `range` and `loc` appear only where the node still carries them; `tokens`
    /// and `comments` appear on the root only when materialized.
    pub fn to_json(&self) -> Value {
        let mut root = match self.render_node(self.root) {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Some(tokens) = &self.tokens {
            root.insert(
                "tokens".to_string(),
                serde_json::to_value(tokens).unwrap_or(Value::Null),
            );
        }
        if let Some(comments) = &self.comments {
            root.insert(
                "comments".to_string(),
                serde_json::to_value(comments).unwrap_or(Value::Null),
            );
        }

        Value::Object(root)
    }

    fn render_node(&self, id: TargetId) -> Value {
        let Some(node) = self.get(id) else {
            return Value::Null;
        };

        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(node.kind.clone()));

        for (name, field) in node.fields() {
            let rendered = match field {
                Field::Node(child) => self.render_node(*child),
                Field::Nodes(children) => Value::Array(
                    children
                        .iter()
                        .map(|child| self.render_node(*child))
                        .collect(),
                ),
                Field::Value(value) => value.clone(),
            };
            map.insert(name.to_string(), rendered);
        }

        if let Some(range) = node.range {
            map.insert(
                "range".to_string(),
                serde_json::json!([range.start, range.end]),
            );
        }
        if let Some(loc) = node.loc {
            map.insert(
                "loc".to_string(),
                serde_json::to_value(loc).unwrap_or(Value::Null),
            );
        }

        Value::Object(map)
    }
}
