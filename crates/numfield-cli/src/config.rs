//! KDL configuration for the `numfield` CLI.
//!
//! ```kdl
//! locale "de-DE"
//! rounding "compensate"
//! custom-locale "de-LI" grouping="'" decimal="." style="standard"
//! ```

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode};
use miette::{IntoDiagnostic, Result, miette};
use numfield_core::{Grouping, LocaleProfile, LocaleRegistry, RoundingPolicy};

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Default locale tag.
    pub locale: Option<String>,
    /// Default cursor policy.
    pub rounding: Option<RoundingPolicy>,
    /// Extra locales, registered ahead of the built-in table.
    pub custom_locales: Vec<LocaleProfile>,
}

impl Config {
    /// `<config dir>/numfield/config.kdl`, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("numfield").join("config.kdl"))
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        Self::parse(&content).map_err(|e| miette!("{}: {e}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc = content
            .parse::<KdlDocument>()
            .map_err(|e| miette!("invalid KDL: {e}"))?;

        let mut config = Self::default();
        for node in doc.nodes() {
            match node.name().value() {
                "locale" => {
                    let tag = argument(node).ok_or_else(|| miette!("`locale` needs a tag"))?;
                    config.locale = Some(tag.to_string());
                }
                "rounding" => {
                    let policy = argument(node).ok_or_else(|| miette!("`rounding` needs a value"))?;
                    config.rounding = Some(policy.parse()?);
                }
                "custom-locale" => config.custom_locales.push(custom_locale(node)?),
                other => tracing::warn!("Ignoring unknown config node `{other}`"),
            }
        }
        Ok(config)
    }

    /// Locale registry with the configured custom locales added.
    pub fn registry(&self) -> LocaleRegistry {
        let mut registry = LocaleRegistry::new();
        for profile in &self.custom_locales {
            registry.register(profile.clone());
        }
        registry
    }
}

fn custom_locale(node: &KdlNode) -> Result<LocaleProfile> {
    let tag = argument(node).ok_or_else(|| miette!("`custom-locale` needs a tag"))?;
    let grouping = single_char(node, "grouping")?;
    let decimal = single_char(node, "decimal")?;
    let style = match property(node, "style") {
        Some(style) => style.parse::<Grouping>()?,
        None => Grouping::default(),
    };
    Ok(LocaleProfile::new(tag, grouping, decimal, style)?)
}

fn argument(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .and_then(|entry| entry.value().as_string())
}

fn property<'a>(node: &'a KdlNode, key: &str) -> Option<&'a str> {
    node.entries()
        .iter()
        .find(|entry| entry.name().map(|name| name.value()) == Some(key))
        .and_then(|entry| entry.value().as_string())
}

fn single_char(node: &KdlNode, key: &str) -> Result<char> {
    let value = property(node, key)
        .ok_or_else(|| miette!("`{}` needs a `{key}` property", node.name().value()))?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(miette!("`{key}` must be a single character, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            locale "de-LI"
            rounding "compensate"
            custom-locale "de-LI" grouping="'" decimal="." style="standard"
            custom-locale "hi-XX" grouping="," decimal="." style="indian"
            "#,
        )
        .unwrap();

        assert_eq!(config.locale.as_deref(), Some("de-LI"));
        assert_eq!(config.rounding, Some(RoundingPolicy::Compensate));
        assert_eq!(config.custom_locales.len(), 2);

        let profile = config.registry().resolve("de-li").unwrap();
        assert_eq!(profile.grouping_separator(), '\'');
        assert_eq!(profile.format(1234.5), "1'234.5");
        assert_eq!(config.custom_locales[1].grouping(), Grouping::Indian);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert!(config.locale.is_none());
        assert!(config.rounding.is_none());
        assert!(config.custom_locales.is_empty());
    }

    #[test]
    fn test_rejects_ambiguous_custom_locale() {
        let err = Config::parse(r#"custom-locale "x" grouping="." decimal=".""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_multi_char_symbol() {
        let err = Config::parse(r#"custom-locale "x" grouping="ab" decimal=".""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_bad_rounding() {
        assert!(Config::parse(r#"rounding "sideways""#).is_err());
    }
}
