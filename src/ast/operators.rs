use std::{cmp::Ordering, fmt};

/// Comparison operators accepted by `WHERE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=`, `EQ`)
    Equal,
    /// Not equal (`!=`, `^=`, `NE`)
    NotEqual,
    /// Less than (`<`, `LT`)
    LessThan,
    /// Greater than (`>`, `GT`)
    GreaterThan,
    /// Less than or equal (`<=`, `LE`)
    LessEqual,
    /// Greater than or equal (`>=`, `GE`)
    GreaterEqual,
}

impl CompareOp {
    /// Tests an ordering of `cell` relative to the literal.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::LessEqual => ordering != Ordering::Greater,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
        }
    }

    /// Result of the comparison when the cell is missing.
    ///
    /// Missing never equals or orders against anything, so only `!=` holds.
    pub fn matches_missing(self) -> bool {
        self == CompareOp::NotEqual
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
