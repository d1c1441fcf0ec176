// Dashboard identifier domain model
use crate::domain::error::BackupError;
use std::fmt;

/// Id of the platform's default dashboard
pub const DEFAULT_DASHBOARD_ID: &str = "lovelace";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DashboardId(String);

impl DashboardId {
    /// Validate and wrap a raw id.
    ///
    /// Ids end up inside file names, so anything that could escape the
    /// storage or backup directory is rejected.
    pub fn parse(id: &str) -> Result<Self, BackupError> {
        if id.is_empty() {
            return Err(BackupError::InputInvalid(
                "dashboard id must not be empty".to_string(),
            ));
        }
        if id.contains(['/', '\\']) || id.contains("..") || id.chars().any(char::is_whitespace) {
            return Err(BackupError::InputInvalid(format!(
                "dashboard id '{}' contains characters not allowed in a file name",
                id
            )));
        }
        Ok(Self(id.to_string()))
    }

    pub fn default_dashboard() -> Self {
        Self(DEFAULT_DASHBOARD_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_DASHBOARD_ID
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
