//! Error codes for all compiler diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2013`) whose first digit after
//! the letter indicates the phase. This enumeration is the authoritative
//! closed set machine consumers and the repair generator key on.

use std::fmt;

use serde::Serialize;

use crate::Severity;

/// Error codes for all compiler diagnostics.
///
/// Format: `E####`/`W####` where the first digit indicates the group:
/// - E0xxx: Syntax (emitted by the upstream parser)
/// - E1xxx: Name resolution
/// - E2xxx: Types
/// - E3xxx: Refinements
/// - E4xxx: Effects
/// - E5xxx: Linearity
/// - W0xxx: Warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Syntax (E0xxx) - owned by the parser collaborator, enumerated here so
    // downstream consumers see one closed set.
    /// Unexpected token
    E0001,
    /// Expected expression
    E0002,
    /// Unclosed delimiter
    E0003,
    /// Expected identifier
    E0004,
    /// Expected type
    E0005,
    /// Invalid function definition
    E0006,
    /// Missing function body
    E0007,
    /// Invalid pattern syntax
    E0008,
    /// Invalid literal
    E0009,

    // Name resolution (E1xxx)
    /// Unresolved name
    E1001,
    /// Duplicate definition
    E1002,
    /// Import not found
    E1003,
    /// Module not found
    E1004,
    /// Unresolved type
    E1005,
    /// Variant not found
    E1006,

    // Types (E2xxx)
    /// Type mismatch
    E2001,
    /// Arity mismatch
    E2002,
    /// Missing field
    E2003,
    /// Unknown field
    E2004,
    /// Not callable
    E2005,
    /// Not indexable
    E2006,
    /// Missing annotation
    E2007,
    /// Recursive type
    E2008,
    /// Pattern mismatch
    E2009,
    /// Not iterable
    E2010,
    /// Not a record
    E2011,
    /// Invalid propagate
    E2012,
    /// Immutable assign
    E2013,
    /// Return outside function
    E2014,
    /// Non-exhaustive match
    E2015,
    /// Invalid operand
    E2016,
    /// Type parameter mismatch
    E2017,
    /// Infinite type
    E2018,

    // Refinements (E3xxx)
    /// Unprovable refinement
    E3001,
    /// Precondition violation
    E3002,
    /// Postcondition violation
    E3003,
    /// Assertion unprovable
    E3004,

    // Effects (E4xxx)
    /// Effect not allowed
    E4001,
    /// Unhandled effect
    E4002,
    /// Effect mismatch
    E4003,

    // Linearity (E5xxx)
    /// Value used after move
    E5001,
    /// Linear value not consumed
    E5002,
    /// Linear value duplicated
    E5003,

    // Warnings (W0xxx)
    /// Unused variable
    W0001,
    /// Unused function
    W0002,
    /// Unreachable code
    W0003,
    /// Shadowed binding
    W0004,
    /// Unused parameter
    W0005,
    /// Redundant match arm
    W0006,
}

impl ErrorCode {
    /// All variants, for exhaustive testing and `FromStr`.
    pub const ALL: &[ErrorCode] = &[
        // Syntax
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E0007,
        ErrorCode::E0008,
        ErrorCode::E0009,
        // Name resolution
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        // Types
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        // Refinements
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        // Effects
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        // Linearity
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
        // Warnings
        ErrorCode::W0001,
        ErrorCode::W0002,
        ErrorCode::W0003,
        ErrorCode::W0004,
        ErrorCode::W0005,
        ErrorCode::W0006,
    ];

    /// The code as a string (e.g. `"E2013"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::W0001 => "W0001",
            ErrorCode::W0002 => "W0002",
            ErrorCode::W0003 => "W0003",
            ErrorCode::W0004 => "W0004",
            ErrorCode::W0005 => "W0005",
            ErrorCode::W0006 => "W0006",
        }
    }

    /// The default severity this code is emitted at.
    pub fn default_severity(self) -> Severity {
        if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    /// Check if this is a syntax error (E0xxx range).
    pub fn is_syntax_error(self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a name-resolution error (E1xxx range).
    pub fn is_name_error(self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a type error (E2xxx range).
    pub fn is_type_error(self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a refinement error (E3xxx range).
    pub fn is_refinement_error(self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is an effect error (E4xxx range).
    pub fn is_effect_error(self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is a linearity error (E5xxx range).
    pub fn is_linearity_error(self) -> bool {
        self.as_str().starts_with("E5")
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

/// Parse an error code string like `"E2013"` or `"W0001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and
/// [`ErrorCode::as_str`], so it is automatically exhaustive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn all_variants_round_trip_from_str() {
        for &code in ErrorCode::ALL {
            let parsed: ErrorCode = code.as_str().parse().expect("round trip");
            assert_eq!(parsed, code);
            let lower: ErrorCode = code.as_str().to_lowercase().parse().expect("lowercase");
            assert_eq!(lower, code);
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert!("E9999".parse::<ErrorCode>().is_err());
        assert!("".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn classification_ranges() {
        assert!(ErrorCode::E0001.is_syntax_error());
        assert!(ErrorCode::E1001.is_name_error());
        assert!(ErrorCode::E2013.is_type_error());
        assert!(ErrorCode::E3001.is_refinement_error());
        assert!(ErrorCode::E4002.is_effect_error());
        assert!(ErrorCode::E5001.is_linearity_error());
        assert!(ErrorCode::W0001.is_warning());
        assert!(!ErrorCode::E2001.is_warning());
    }

    #[test]
    fn warnings_default_to_warning_severity() {
        assert_eq!(ErrorCode::W0001.default_severity(), Severity::Warning);
        assert_eq!(ErrorCode::E2001.default_severity(), Severity::Error);
    }

    #[test]
    fn all_codes_unique() {
        let mut seen = std::collections::HashSet::new();
        for &code in ErrorCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate {code}");
        }
        assert_eq!(seen.len(), ErrorCode::ALL.len());
    }
}
