use std::cmp::Ordering;

/// Label used for missing cells in frequency tables and HTML output.
pub const MISSING_LABEL: &str = ".";

/// A single table cell.
///
/// Numeric columns hold [`Value::Number`] cells, text columns hold
/// [`Value::Text`] cells, and either kind may hold [`Value::Missing`].
///
/// # Examples
///
/// ```
/// use datastep_lang::Value;
///
/// assert_eq!(Value::Number(35.0).label(), "35");
/// assert_eq!(Value::Number(2.5).label(), "2.5");
/// assert_eq!(Value::Missing.label(), ".");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty or not-available cell
    Missing,

    /// Floating-point number
    Number(f64),

    /// UTF-8 string
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display text: whole numbers print without a fraction.
    pub fn label(&self) -> String {
        match self {
            Value::Missing => MISSING_LABEL.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    /// Total order used for sorting levels: numbers, then text, then missing.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Missing, Missing) => Ordering::Equal,
            (Number(_), _) => Ordering::Less,
            (_, Number(_)) => Ordering::Greater,
            (Text(_), Missing) => Ordering::Less,
            (Missing, Text(_)) => Ordering::Greater,
        }
    }

    /// JSON form; whole numbers serialize as integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Missing => serde_json::Value::Null,
            Value::Number(n) if is_whole(*n) => serde_json::Value::Number((*n as i64).into()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Largest magnitude printed as an integer (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn is_whole(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER
}

pub fn format_number(n: f64) -> String {
    if is_whole(n) {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}
