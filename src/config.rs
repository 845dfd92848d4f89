use crate::errors::ListError;
use serde::Deserialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Settings shared by every list view of an application.
///
/// Deserialised with defaults for missing keys:
/// ```json
/// { "page_size": 20, "max_page_size": 100, "debounce_ms": 300, "base_path": "/api/v1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Page size used when a view does not set its own
    pub page_size: u64,
    /// Upper bound accepted for any page size
    pub max_page_size: u64,
    /// Quiet period before a search box triggers a fetch
    pub debounce_ms: u64,
    /// Prefix joined in front of every list endpoint
    pub base_path: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: 100,
            debounce_ms: 300,
            base_path: String::new(),
        }
    }
}

impl ListConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns [`ListError::Config`] when the JSON is malformed or fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, ListError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ListError::Config`] for zero sizes or a page size above the maximum.
    pub fn validate(&self) -> Result<(), ListError> {
        if self.page_size == 0 || self.max_page_size == 0 {
            return Err(ListError::config("page sizes must be positive"));
        }
        if self.page_size > self.max_page_size {
            return Err(ListError::config(format!(
                "page_size {} exceeds max_page_size {}",
                self.page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Clamp a requested page size into `1..=max_page_size`.
    #[must_use]
    pub fn clamp_limit(&self, limit: u64) -> u64 {
        limit.clamp(1, self.max_page_size.max(1))
    }
}

/// The signed-in user, as far as list views need to know.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Profile {
    pub fn new(user_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            permissions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Read-only context handed to controllers and tables instead of a global store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    pub profile: Profile,
    pub config: ListConfig,
}

impl ViewContext {
    #[must_use]
    pub fn new(profile: Profile, config: ListConfig) -> Self {
        Self { profile, config }
    }
}
