pub(crate) mod exchange;
pub(crate) mod key_request;

pub use exchange::ExchangePhase;
pub use key_request::KeyRequest;
