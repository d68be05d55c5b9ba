//! Human-facing YAML formatting

/// Re-emit a YAML document in block style
///
/// Key order is preserved and multi-byte text (CJK, emoji) is written as-is.
///
/// # Errors
/// Returns the parse error if `yaml` is not valid YAML.
pub fn format_yaml_for_display(yaml: &str) -> Result<String, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    serde_yaml::to_string(&value)
}
