//! A concrete, front-end agnostic parse tree
//!
//! `SyntaxTree` is an arena of kind-tagged nodes with free-form attributes. It
//! lets callers hand the engine a tree built programmatically (through
//! [`SyntaxTreeBuilder`]) or loaded from a nested JSON document, together with
//! the diagnostics, tokens and comments the front-end reported for it.

use crate::position::TextRange;
use crate::source::{
    CommentSource, Diagnostic, SourceComment, SourceId, SourceToken, SourceTree, TokenSource,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: String,
    pub range: TextRange,
    pub children: Vec<SourceId>,
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub tokens: Vec<SourceToken>,
    pub comments: Vec<SourceComment>,
    nodes: Vec<SyntaxNode>,
    root: SourceId,
}

impl SyntaxTree {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read syntax tree file {:?}: {}", path.as_ref(), e))?;

        Self::from_json_str(&content)
    }

    /// Load a tree from its nested JSON form:
    ///
    /// ```json
    /// {
    ///   "text": "a;",
    ///   "root": { "kind": "SourceFile", "range": [0, 2], "children": [] },
    ///   "diagnostics": [], "tokens": [], "comments": []
    /// }
    /// ```
    ///
    /// Node handles are assigned in pre-order, so the root is always `#0`.
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let document: SyntaxTreeDocument = serde_json::from_str(content)
            .map_err(|e| format!("Failed to parse syntax tree JSON: {}", e))?;

        let mut builder = SyntaxTreeBuilder::new(document.text);
        let root = builder.add_document_node(document.root)?;
        for diagnostic in document.diagnostics {
            builder.diagnostic(diagnostic);
        }
        for token in document.tokens {
            builder.token(token);
        }
        for comment in document.comments {
            builder.comment(comment);
        }

        Ok(builder.finish(root))
    }

    pub fn node(&self, id: SourceId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn attr(&self, id: SourceId, name: &str) -> Option<&Value> {
        self.node(id)?.attrs.get(name)
    }

    pub fn attr_str(&self, id: SourceId, name: &str) -> Option<&str> {
        self.attr(id, name)?.as_str()
    }

    /// The program text covered by `id`
    pub fn source_text(&self, id: SourceId) -> Option<&str> {
        let range = self.node(id)?.range;
        self.text.get(range.start..range.end)
    }

    /// All handles in pre-order from the root
    pub fn descendants(&self) -> Vec<SourceId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }
}

impl SourceTree for SyntaxTree {
    fn root(&self) -> SourceId {
        self.root
    }

    fn kind(&self, node: SourceId) -> &str {
        &self.nodes[node.index()].kind
    }

    fn range(&self, node: SourceId) -> TextRange {
        self.nodes[node.index()].range
    }

    fn children(&self, node: SourceId) -> &[SourceId] {
        &self.nodes[node.index()].children
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl TokenSource for SyntaxTree {
    fn tokens(&self, _text: &str) -> Vec<SourceToken> {
        self.tokens.clone()
    }
}

impl CommentSource for SyntaxTree {
    fn comments(&self, _text: &str) -> Vec<SourceComment> {
        self.comments.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxTreeBuilder {
    text: String,
    nodes: Vec<SyntaxNode>,
    parents: Vec<Option<SourceId>>,
    diagnostics: Vec<Diagnostic>,
    tokens: Vec<SourceToken>,
    comments: Vec<SourceComment>,
}

impl SyntaxTreeBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::new(),
            parents: Vec::new(),
            diagnostics: Vec::new(),
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Allocate a detached node; attach it with [`add_child`](Self::add_child).
    pub fn node(&mut self, kind: impl Into<String>, range: TextRange) -> SourceId {
        let id = SourceId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind: kind.into(),
            range,
            children: Vec::new(),
            attrs: Map::new(),
        });
        self.parents.push(None);
        id
    }

    pub fn attr(&mut self, id: SourceId, name: impl Into<String>, value: impl Into<Value>) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.attrs.insert(name.into(), value.into());
        }
    }

    /// Append `child` to the children of `parent`.
    ///
    /// A node has at most one parent and may not be attached below itself, so
    /// the finished tree is always acyclic.
    pub fn add_child(&mut self, parent: SourceId, child: SourceId) -> Result<(), String> {
        if parent.index() >= self.nodes.len() {
            return Err(format!("Unknown parent node {}", parent));
        }
        match self.parents.get(child.index()) {
            None => return Err(format!("Unknown child node {}", child)),
            Some(Some(existing)) => {
                return Err(format!("Node {} is already a child of {}", child, existing))
            }
            Some(None) => {}
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(format!("Attaching {} below {} would form a cycle", child, parent));
            }
            ancestor = self.parents[id.index()];
        }

        self.parents[child.index()] = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    pub fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn token(&mut self, token: SourceToken) {
        self.tokens.push(token);
    }

    pub fn comment(&mut self, comment: SourceComment) {
        self.comments.push(comment);
    }

    /// `root` must be a handle returned by [`node`](Self::node).
    pub fn finish(self, root: SourceId) -> SyntaxTree {
        debug_assert!(root.index() < self.nodes.len(), "unknown root {}", root);
        SyntaxTree {
            text: self.text,
            diagnostics: self.diagnostics,
            tokens: self.tokens,
            comments: self.comments,
            nodes: self.nodes,
            root,
        }
    }

    fn add_document_node(&mut self, document: SyntaxNodeDocument) -> Result<SourceId, String> {
        let id = self.node(document.kind, document.range);
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.attrs = document.attrs;
        }
        for child in document.children {
            let child_id = self.add_document_node(child)?;
            self.add_child(id, child_id)?;
        }
        Ok(id)
    }
}

#[derive(Debug, Deserialize)]
struct SyntaxTreeDocument {
    text: String,
    root: SyntaxNodeDocument,
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    tokens: Vec<SourceToken>,
    #[serde(default)]
    comments: Vec<SourceComment>,
}

#[derive(Debug, Deserialize)]
struct SyntaxNodeDocument {
    kind: String,
    range: TextRange,
    #[serde(default)]
    attrs: Map<String, Value>,
    #[serde(default)]
    children: Vec<SyntaxNodeDocument>,
}
