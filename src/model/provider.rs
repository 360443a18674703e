use serde::{Deserialize, Serialize};

/// An LLM provider known to the API (`/api/providers`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    #[serde(default)]
    pub default_model: Option<String>,
}

/// Default model for `provider`, if the API advertises one
pub fn default_model_for<'a>(providers: &'a [ProviderInfo], provider: &str) -> Option<&'a str> {
    providers
        .iter()
        .find(|p| p.name == provider)
        .and_then(|p| p.default_model.as_deref())
        .filter(|m| !m.is_empty())
}
