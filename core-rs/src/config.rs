/**
 * config.rs
 * Access-control configuration (YAML format)
 *
 * Format:
 * ```yaml
 * globalRoles:
 *   "admin:sysadmins": administrator
 *   "staff:curators": canManage
 * cache:
 *   maxSize: 10000
 *   ttlSeconds: 300
 * ```
 *
 * Global roles are validated at load time: unknown role names and patron
 * roles are rejected before any evaluator is built. The cache TTL must be
 * between 1 second and 1000 years.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::{AclError, Result};
use crate::rbac::global::parse_global_role;

pub const DEFAULT_CACHE_MAX_SIZE: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Longest TTL the cache accepts: 1000 years
pub const MAX_CACHE_TTL_SECONDS: u64 = 1000 * 365 * 24 * 60 * 60;

/// Object ACL cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of cached objects
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Seconds an entry lives after it was loaded
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_max_size() -> u64 {
    DEFAULT_CACHE_MAX_SIZE
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_CACHE_TTL_SECONDS
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

/// Access-control configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    /// Principal to global staff role name
    #[serde(default)]
    pub global_roles: BTreeMap<String, String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AccessConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML file
    ///
    /// # Errors
    /// `FileNotFound` when missing, `Yaml` when unparseable, `InvalidConfig`
    /// when a global role or cache value is rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AclError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: AccessConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check global roles and cache limits
    pub fn validate(&self) -> Result<()> {
        for (principal, role_name) in &self.global_roles {
            parse_global_role(principal, role_name)?;
        }

        if self.cache.max_size == 0 {
            return Err(AclError::InvalidConfig(
                "cache.maxSize must be greater than 0".to_string(),
            ));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(AclError::InvalidConfig(
                "cache.ttlSeconds must be greater than 0".to_string(),
            ));
        }
        if self.cache.ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(AclError::InvalidConfig(format!(
                "cache.ttlSeconds must not exceed {} (1000 years)",
                MAX_CACHE_TTL_SECONDS
            )));
        }

        Ok(())
    }
}
