//! Execution status reported by the remote service for one invocation.
//!
//! Each variant's wire name matches the PascalCase string the service
//! returns (e.g. `"InProgress"`), so the same enum is used for parsing
//! query responses and for serialising the batch response.

use std::fmt;

use serde::Serialize;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name as returned by the remote service.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }

            /// Parse a wire name. Returns `None` for strings the service
            /// may add in the future; callers decide how to treat those.
            pub fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $( $wire => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle status of one command invocation on one target.
    CommandStatus {
        /// Accepted by the service, not yet delivered to the target.
        Pending = "Pending",
        /// Running on the target.
        InProgress = "InProgress",
        Success = "Success",
        Cancelled = "Cancelled",
        /// The service gave up waiting for the target.
        TimedOut = "TimedOut",
        Failed = "Failed",
        /// A cancel request is being processed; settles to `Cancelled`.
        Cancelling = "Cancelling",
    }
}

impl CommandStatus {
    /// Whether the poller should stop and report this status as final.
    ///
    /// `Pending` and `InProgress` are the documented non-terminal states.
    /// `Cancelling` is transient as well: it always settles to
    /// `Cancelled`, so polling continues and the poll timeout bounds it.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::InProgress | Self::Cancelling)
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}
