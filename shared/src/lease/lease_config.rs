use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the `LeaseStore`
#[derive(Clone, Debug)]
pub struct LeaseConfig {
    /// How long a granted key may stay unconfirmed before the sweep reclaims it
    pub reservation_timeout: Duration,
}

impl LeaseConfig {
    pub fn new(reservation_timeout: Duration) -> Self {
        Self {
            reservation_timeout,
        }
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            reservation_timeout: Duration::from_secs(5),
        }
    }
}
