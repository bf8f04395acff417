use std::fmt;

/// Partition of the key space. Keys are only unique within a single
/// namespace, so a Room key and a Player key may share the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamespaceFilter {
    /// Keys tagging state that belongs to the whole room
    Room,
    /// Keys tagging state that belongs to a single player
    Player,
    /// Application-defined provider namespace
    Custom(u16),
}

impl fmt::Display for NamespaceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceFilter::Room => write!(f, "Room"),
            NamespaceFilter::Player => write!(f, "Player"),
            NamespaceFilter::Custom(value) => write!(f, "Custom({})", value),
        }
    }
}
