//! A small ESTree rule set over `SyntaxTree`, shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use treebridge::{
    ConversionContext, NodeDraft, RuleError, RuleOutput, RuleSet, SourceId, SourceTree,
    SyntaxTree, TargetId,
};

pub type Cx<'a> = ConversionContext<'a, SyntaxTree>;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> SyntaxTree {
    SyntaxTree::from_json_file(fixture_path(name))
        .unwrap_or_else(|e| panic!("should load {}: {}", name, e))
}

pub fn estree_rules() -> RuleSet<SyntaxTree> {
    RuleSet::new()
        .with_rule("SourceFile", program)
        .with_rule("VariableStatement", variable_statement)
        .with_rule("VariableDeclarator", variable_declarator)
        .with_rule("ExpressionStatement", expression_statement)
        .with_rule("BinaryExpression", binary_expression)
        .with_rule("ParenthesizedExpression", parenthesized_expression)
        .with_rule("Identifier", identifier)
        .with_rule("NumericLiteral", numeric_literal)
}

fn program(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let body = cx.convert_children(node)?;
    Ok(vec![cx.emit(
        NodeDraft::new("Program")
            .nodes("body", body)
            .value("sourceType", "script"),
    )])
}

/// `let a = 1, b = 2;` flattens into one declaration per declarator.
fn variable_statement(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let keyword = cx.source().attr_str(node, "keyword").unwrap_or("var");
    let mut declarations = Vec::new();

    for &child in cx.source().children(node) {
        let Some(declarator) = cx.convert_single(child)? else {
            continue;
        };
        declarations.push(
            cx.emit(
                NodeDraft::new("VariableDeclaration")
                    .nodes("declarations", vec![declarator])
                    .value("kind", keyword)
                    .span_of_children(),
            ),
        );
    }

    Ok(declarations)
}

fn variable_declarator(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let id = required_child(cx, node, 0)?;
    let init = match cx.source().children(node).get(1) {
        Some(&child) => cx.convert_single(child)?,
        None => None,
    };

    Ok(vec![cx.emit(
        NodeDraft::new("VariableDeclarator")
            .node("id", id)
            .optional_node("init", init),
    )])
}

fn expression_statement(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let expression = required_child(cx, node, 0)?;
    Ok(vec![cx.emit(
        NodeDraft::new("ExpressionStatement").node("expression", expression),
    )])
}

fn binary_expression(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let operator = cx
        .source()
        .attr_str(node, "operator")
        .ok_or_else(|| RuleError::failed("binary expression without operator"))?;
    let left = required_child(cx, node, 0)?;
    let right = required_child(cx, node, 1)?;

    Ok(vec![cx.emit(
        NodeDraft::new("BinaryExpression")
            .node("left", left)
            .value("operator", operator)
            .node("right", right),
    )])
}

/// ESTree has no parenthesized node; the inner expression takes its place.
fn parenthesized_expression(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    Ok(cx.convert_children(node)?)
}

fn identifier(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let name = cx
        .source()
        .attr_str(node, "name")
        .ok_or_else(|| RuleError::failed("identifier without name"))?;
    Ok(vec![cx.emit(NodeDraft::new("Identifier").value("name", name))])
}

fn numeric_literal(node: SourceId, cx: &mut Cx<'_>) -> RuleOutput {
    let value = cx
        .source()
        .attr(node, "value")
        .cloned()
        .ok_or_else(|| RuleError::failed("numeric literal without value"))?;
    let raw = cx.source().source_text(node).unwrap_or_default();

    Ok(vec![cx.emit(
        NodeDraft::new("Literal")
            .value("value", value)
            .value("raw", raw),
    )])
}

fn required_child(cx: &mut Cx<'_>, node: SourceId, index: usize) -> Result<TargetId, RuleError> {
    let child = cx
        .source()
        .children(node)
        .get(index)
        .copied()
        .ok_or_else(|| RuleError::failed(format!("missing child {}", index)))?;

    cx.convert_single(child)?
        .ok_or_else(|| RuleError::failed(format!("child {} produced no node", index)))
}
