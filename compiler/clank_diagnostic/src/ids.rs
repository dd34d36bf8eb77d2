//! Identifier newtypes for diagnostics, obligations, holes, and repairs.
//!
//! All counters live on compiler-instance objects (the collector and the
//! repair engine), never in process-wide state; constructing a fresh
//! instance is what resets them between compilations.

use std::fmt;

use serde::Serialize;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type! {
    /// Identifier of a diagnostic. Shares its counter with obligations so
    /// ids are unique across both sets.
    DiagnosticId
}

id_type! {
    /// Identifier of a proof obligation.
    ObligationId
}

id_type! {
    /// Identifier of a type hole.
    HoleId
}

id_type! {
    /// Identifier of a repair candidate.
    RepairId
}
