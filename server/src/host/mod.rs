mod grant_registry;
mod host_config;
mod key_host;

pub use host_config::HostConfig;
pub use key_host::KeyHost;
