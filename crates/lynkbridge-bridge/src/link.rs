use std::fmt;

/// One physical/logical serial endpoint of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// The user-facing serial link.
    User,
    /// The module/radio-facing serial link (shared medium).
    Module,
    /// Reserved ingress for a future wireless path. Routing from it is a
    /// no-op.
    Wifi,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::User => f.write_str("user"),
            Link::Module => f.write_str("module"),
            Link::Wifi => f.write_str("wifi"),
        }
    }
}
