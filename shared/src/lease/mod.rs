pub mod error;
pub mod lease;
pub mod lease_config;
pub mod lease_store;
