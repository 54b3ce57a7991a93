//! Full user name parsing
//!
//! A full user name identifies a login together with the tenant that owns
//! it. Two spellings are accepted:
//!
//! - `user@tenant#cluster` (the `#cluster` suffix is optional)
//! - `cluster:tenant:user`
//!
//! The tenant is mandatory. It selects the relational endpoint the command
//! catalog is read from, so a name without one is rejected instead of
//! falling back to a default tenant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A parsed full user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullUserName {
    /// Login user
    pub user: String,
    /// Owning tenant, never empty
    pub tenant: String,
    /// Cluster, when the name carries one
    pub cluster: Option<String>,
}

impl FullUserName {
    /// Parse a full user name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFullUserName`] when the tenant portion is
    /// missing or empty.
    pub fn parse(full_user_name: &str) -> Result<Self> {
        let invalid = || Error::InvalidFullUserName {
            full_user_name: full_user_name.to_string(),
        };

        let parsed = if let Some((user, rest)) = full_user_name.split_once('@') {
            let (tenant, cluster) = match rest.split_once('#') {
                Some((tenant, cluster)) => (tenant, Some(cluster)),
                None => (rest, None),
            };
            FullUserName {
                user: user.to_string(),
                tenant: tenant.to_string(),
                cluster: cluster.map(str::to_string),
            }
        } else {
            let parts: Vec<&str> = full_user_name.split(':').collect();
            match parts.as_slice() {
                [cluster, tenant, user] => FullUserName {
                    user: user.to_string(),
                    tenant: tenant.to_string(),
                    cluster: Some(cluster.to_string()),
                },
                _ => return Err(invalid()),
            }
        };

        if parsed.tenant.is_empty() {
            return Err(invalid());
        }
        Ok(parsed)
    }
}

impl fmt::Display for FullUserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cluster {
            Some(cluster) => write!(f, "{}@{}#{}", self.user, self.tenant, cluster),
            None => write!(f, "{}@{}", self.user, self.tenant),
        }
    }
}

/// Extract the tenant from a full user name.
///
/// # Errors
///
/// Returns [`Error::InvalidFullUserName`] when no tenant can be extracted.
pub fn tenant_name(full_user_name: &str) -> Result<String> {
    FullUserName::parse(full_user_name).map(|name| name.tenant)
}
