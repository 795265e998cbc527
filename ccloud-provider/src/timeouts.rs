//! Operation timeouts per resource class.
//!
//! Dedicated clusters allocate physical capacity and can take most of a day
//! to provision. Everything else completes within the default.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout for dedicated clusters.
pub const DEDICATED_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Timeout for every other resource class.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Kafka cluster class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterType {
    #[default]
    Basic,
    Standard,
    Dedicated,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::Basic => "basic",
            ClusterType::Standard => "standard",
            ClusterType::Dedicated => "dedicated",
        }
    }

    pub fn timeout(&self) -> Duration {
        timeout_for(self.as_str())
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timeout for operations on a resource of class `cluster_type`.
pub fn timeout_for(cluster_type: &str) -> Duration {
    if cluster_type == ClusterType::Dedicated.as_str() {
        DEDICATED_TIMEOUT
    } else {
        DEFAULT_TIMEOUT
    }
}
