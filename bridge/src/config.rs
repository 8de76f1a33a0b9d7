//! Conversion settings, built in code or loaded from JSON

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PLACEHOLDER_KIND: &str = "InvalidNode";

/// Settings fixed for one conversion.
///
/// Field names also accept the option names of the upstream parser
/// (`range`, `loc`, `tokens`, `comment`, `errorOnUnknownASTType`,
/// `preserveNodeMaps`, `allowInvalidAST`) when loaded from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    #[serde(alias = "range")]
    pub include_position_ranges: bool,
    #[serde(alias = "loc")]
    pub include_line_column: bool,
    #[serde(alias = "tokens")]
    pub include_tokens: bool,
    #[serde(alias = "comment")]
    pub include_comments: bool,
    #[serde(alias = "errorOnUnknownASTType")]
    pub fail_on_unknown_node_kind: bool,
    #[serde(alias = "preserveNodeMaps")]
    pub preserve_node_maps: bool,
    /// Substitute a placeholder node for a failed rule instead of aborting
    #[serde(alias = "allowInvalidAST")]
    pub allow_invalid_ast: bool,
    /// Node kind of the placeholder substituted under `allow_invalid_ast`
    pub placeholder_kind: String,
    /// Silence the per-kind warning logged when lenient mode skips a node
    pub suppress_unknown_kind_warnings: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            include_position_ranges: false,
            include_line_column: false,
            include_tokens: false,
            include_comments: false,
            fail_on_unknown_node_kind: false,
            preserve_node_maps: true,
            allow_invalid_ast: false,
            placeholder_kind: DEFAULT_PLACEHOLDER_KIND.to_string(),
            suppress_unknown_kind_warnings: false,
        }
    }
}

impl ConversionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(content: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(content).map_err(|e| {
            BridgeError::Config(format!("failed to parse conversion config: {}", e))
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, BridgeError> {
        let content = fs::read_to_string(&path).map_err(|e| {
            BridgeError::Config(format!(
                "failed to read conversion config {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    pub fn with_position_ranges(mut self, enabled: bool) -> Self {
        self.include_position_ranges = enabled;
        self
    }

    pub fn with_line_column(mut self, enabled: bool) -> Self {
        self.include_line_column = enabled;
        self
    }

    pub fn with_tokens(mut self, enabled: bool) -> Self {
        self.include_tokens = enabled;
        self
    }

    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.include_comments = enabled;
        self
    }

    pub fn with_fail_on_unknown_node_kind(mut self, enabled: bool) -> Self {
        self.fail_on_unknown_node_kind = enabled;
        self
    }

    pub fn with_preserve_node_maps(mut self, enabled: bool) -> Self {
        self.preserve_node_maps = enabled;
        self
    }

    pub fn with_allow_invalid_ast(mut self, enabled: bool) -> Self {
        self.allow_invalid_ast = enabled;
        self
    }

    pub fn with_placeholder_kind(mut self, kind: impl Into<String>) -> Self {
        self.placeholder_kind = kind.into();
        self
    }

    pub fn with_suppressed_unknown_kind_warnings(mut self, enabled: bool) -> Self {
        self.suppress_unknown_kind_warnings = enabled;
        self
    }

    /// Whether the stripping pass has anything to remove
    pub fn strips_positions(&self) -> bool {
        !self.include_position_ranges || !self.include_line_column
    }

    pub(crate) fn validate(&self) -> Result<(), BridgeError> {
        if self.allow_invalid_ast && self.placeholder_kind.trim().is_empty() {
            return Err(BridgeError::Config(
                "placeholder_kind must not be empty when allow_invalid_ast is set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_parser() {
        let config = ConversionConfig::default();

        assert!(!config.include_position_ranges);
        assert!(!config.include_line_column);
        assert!(!config.include_tokens);
        assert!(!config.include_comments);
        assert!(!config.fail_on_unknown_node_kind);
        assert!(config.preserve_node_maps);
        assert!(!config.allow_invalid_ast);
        assert_eq!(config.placeholder_kind, "InvalidNode");
        assert!(config.strips_positions());
    }

    #[test]
    fn test_upstream_option_names_are_accepted() {
        let json = r#"{
            "range": true,
            "loc": true,
            "tokens": true,
            "comment": false,
            "errorOnUnknownASTType": true,
            "preserveNodeMaps": false,
            "allowInvalidAST": true
        }"#;
        let config = ConversionConfig::from_json_str(json).expect("config should parse");

        assert!(config.include_position_ranges);
        assert!(config.include_line_column);
        assert!(config.include_tokens);
        assert!(!config.include_comments);
        assert!(config.fail_on_unknown_node_kind);
        assert!(!config.preserve_node_maps);
        assert!(config.allow_invalid_ast);
        assert!(!config.strips_positions());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config =
            ConversionConfig::from_json_str(r#"{ "include_tokens": true }"#).unwrap();
        assert_eq!(config, ConversionConfig::new().with_tokens(true));
    }

    #[test]
    fn test_unknown_field_is_a_config_error() {
        let err = ConversionConfig::from_json_str(r#"{ "ranges": true }"#).unwrap_err();
        assert!(matches!(err, BridgeError::Config(msg) if msg.contains("ranges")));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = ConversionConfig::from_json_file("/nonexistent/treebridge.json").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_empty_placeholder_rejected_only_when_used() {
        let config = ConversionConfig::new().with_placeholder_kind("");
        assert!(config.validate().is_ok());
        assert!(config.with_allow_invalid_ast(true).validate().is_err());
    }
}
