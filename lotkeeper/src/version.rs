//! Version information for lotkeeper.

/// Lotkeeper version from Cargo.toml
pub const LOTKEEPER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version information reported by the health check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    pub lotkeeper: &'static str,
    /// Build identifier supplied by the deployment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            lotkeeper: LOTKEEPER_VERSION,
            build: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_build(mut self, build: String) -> Self {
        self.build = Some(build);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_has_crate_version() {
        let info = VersionInfo::new();
        assert_eq!(info.lotkeeper, LOTKEEPER_VERSION);
        assert!(info.build.is_none());
    }

    #[test]
    fn version_info_serializes_minimal() {
        let info = VersionInfo {
            lotkeeper: "0.1.0",
            build: None,
        };
        insta::assert_json_snapshot!(info, @r#"
        {
          "lotkeeper": "0.1.0"
        }
        "#);
    }

    #[test]
    fn version_info_serializes_full() {
        let info = VersionInfo::new().with_build("abc123".to_string());
        assert_eq!(info.build.as_deref(), Some("abc123"));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["build"], "abc123");
    }
}
