/// Session-assigned numeric id of a connected client
pub type ClientId = u64;
/// A synchronization channel key, unique within one namespace
pub type KeyId = u8;

/// Owner recorded on keys reserved by the host process itself
pub const CORE_OWNER: ClientId = ClientId::MAX;
/// Number of distinct keys available in every namespace
pub const KEY_SPACE: usize = KeyId::MAX as usize + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

