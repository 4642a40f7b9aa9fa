use std::time::Duration;

use serde::Deserialize;

use crate::health::default_enabled;

/// CORS policy applied to every route
///
/// Browser clients are the reason this service exists, so the default
/// allows any origin, method and header.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Attach the CORS layer at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed request headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Response headers readable by the browser
    #[serde(default)]
    pub expose_headers: Vec<String>,
    #[serde(default)]
    pub credentials: bool,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: AnyOrArray::Any,
            methods: AnyOrArray::Any,
            headers: AnyOrArray::Any,
            expose_headers: Vec::new(),
            credentials: false,
            max_age: None,
        }
    }
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard "*" or an explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WildcardOrList")]
pub enum AnyOrArray {
    #[default]
    Any,
    List(Vec<String>),
}

/// Shape accepted in TOML: a single string or a list of strings
#[derive(Deserialize)]
#[serde(untagged)]
enum WildcardOrList {
    One(String),
    Many(Vec<String>),
}

impl From<WildcardOrList> for AnyOrArray {
    fn from(raw: WildcardOrList) -> Self {
        let values = match raw {
            WildcardOrList::One(value) => vec![value],
            WildcardOrList::Many(values) => values,
        };

        // a wildcard anywhere widens the list to everything
        if values.iter().any(|value| value == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}
