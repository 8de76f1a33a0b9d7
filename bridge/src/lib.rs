//! # treebridge
//!
//! Conversion engine from a front-end parse tree to an ESTree-style
//! interchange tree, keeping a bidirectional map between the two so that
//! tools can cross-reference either representation.
//!
//! - **Diagnostic gate** - refuses trees with parse diagnostics
//! - **Driver** - walks the source tree through a caller-supplied [`RuleSet`]
//! - **Node map** - source <-> target correspondence
//! - **Post-processing** - position stripping, token and comment lists
//!
//! ## Example
//!
//! ```rust
//! use treebridge::{convert_tree, ConversionConfig, NodeDraft, RuleSet, SyntaxTree};
//!
//! let tree = SyntaxTree::from_json_str(r#"{
//!     "text": "x",
//!     "root": { "kind": "SourceFile", "range": [0, 1], "children": [
//!         { "kind": "Identifier", "range": [0, 1], "attrs": { "name": "x" } }
//!     ] }
//! }"#).unwrap();
//!
//! let rules = RuleSet::<SyntaxTree>::new()
//!     .with_rule("SourceFile", |node, cx| {
//!         let body = cx.convert_children(node)?;
//!         Ok(vec![cx.emit(NodeDraft::new("Program").nodes("body", body))])
//!     })
//!     .with_rule("Identifier", |node, cx| {
//!         let name = cx.source().attr_str(node, "name").unwrap_or_default();
//!         Ok(vec![cx.emit(NodeDraft::new("Identifier").value("name", name))])
//!     });
//!
//! let result = convert_tree(&tree, &rules, &ConversionConfig::default()).unwrap();
//! assert_eq!(result.tree.to_json()["body"][0]["name"], "x");
//! ```

pub mod bridge;
pub mod config;
pub mod driver;
pub mod error;
pub mod gate;
pub mod node_map;
pub mod pipeline;
pub mod position;
pub mod rules;
pub mod source;
pub mod syntax_tree;
pub mod target;
pub mod telemetry;
pub mod traverse;

pub use bridge::{convert_tree, Bridge, ConversionResult};
pub use config::ConversionConfig;
pub use driver::ConversionContext;
pub use error::{BridgeError, ConversionError, RuleError, SyntaxError};
pub use node_map::NodeMap;
pub use position::{LineColumn, LineIndex, Position, SourceLocation, TextRange};
pub use rules::{ConversionRule, NodeDraft, RuleOutput, RuleSet, SpanPolicy};
pub use source::{
    CommentSource, CommentStyle, Diagnostic, SourceComment, SourceId, SourceToken, SourceTree,
    TokenSource,
};
pub use syntax_tree::{SyntaxNode, SyntaxTree, SyntaxTreeBuilder};
pub use target::{CommentRecord, Field, TargetId, TargetNode, TargetTree, TokenRecord};
pub use telemetry::TelemetryConfig;
