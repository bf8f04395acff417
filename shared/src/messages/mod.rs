pub mod allocation_message;
pub mod error;
