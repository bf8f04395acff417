use std::default::Default;

use synckey_shared::LeaseConfig;

/// Contains Config properties which will be used by the `KeyHost`
#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Used to configure the lease table, most notably how long a grant may
    /// stay unconfirmed
    pub lease: LeaseConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            lease: LeaseConfig::default(),
        }
    }
}
