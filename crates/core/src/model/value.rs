use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale for decimal answers (two places).
pub const DECIMAL_SCALE: i64 = 100;

/// Canonical answer value.
///
/// Decimals are stored as scaled integers (`Decimal(125)` is `1.25`) so two
/// values compare exactly and a label never depends on float formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Decimal(i64),
    Symbol(String),
}

impl Value {
    /// Rounds `x` to the nearest hundredth.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn decimal(x: f64) -> Self {
        Self::Decimal((x * DECIMAL_SCALE as f64).round() as i64)
    }

    #[must_use]
    pub fn symbol(s: impl Into<String>) -> Self {
        Self::Symbol(s.into())
    }

    /// Text shown on the choice button. Distinct values have distinct labels.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn matches_kind(&self, kind: &ValueKind) -> bool {
        matches!(
            (self, kind),
            (Value::Integer(_), ValueKind::Integer)
                | (Value::Decimal(_), ValueKind::Decimal)
                | (Value::Symbol(_), ValueKind::Symbolic(_))
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Decimal(h) => {
                let sign = if *h < 0 { "-" } else { "" };
                let abs = h.unsigned_abs();
                let scale = DECIMAL_SCALE.unsigned_abs();
                let whole = abs / scale;
                let frac = abs % scale;
                if frac == 0 {
                    write!(f, "{sign}{whole}")
                } else if frac % 10 == 0 {
                    write!(f, "{sign}{whole}.{}", frac / 10)
                } else {
                    write!(f, "{sign}{whole}.{frac:02}")
                }
            }
            Value::Symbol(s) => f.write_str(s),
        }
    }
}

/// Shape of a symbolic answer, used to pick mutation rules for distractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    /// Digit string in the given base (2..=36), upper-case letters above 9.
    Radix(u32),
    /// Boolean-algebra expression: whitespace separated variables and operators.
    Boolean,
    /// Natural-language word or phrase.
    Text,
}

impl Alphabet {
    /// Digit symbols for a radix alphabet.
    #[must_use]
    pub fn digits(self) -> Option<Vec<char>> {
        match self {
            Alphabet::Radix(radix) if (2..=36).contains(&radix) => {
                Some(
                    (0..radix)
                        .filter_map(|d| char::from_digit(d, radix))
                        .map(|c| c.to_ascii_uppercase())
                        .collect(),
                )
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Decimal,
    Symbolic(Alphabet),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_labels_trim_trailing_zeros() {
        assert_eq!(Value::Decimal(125).label(), "1.25");
        assert_eq!(Value::Decimal(150).label(), "1.5");
        assert_eq!(Value::Decimal(300).label(), "3");
        assert_eq!(Value::Decimal(-25).label(), "-0.25");
        assert_eq!(Value::Decimal(5).label(), "0.05");
    }

    #[test]
    fn decimal_constructor_rounds_to_hundredths() {
        assert_eq!(Value::decimal(0.1 + 0.2), Value::Decimal(30));
        assert_eq!(Value::decimal(2.499), Value::Decimal(250));
    }

    #[test]
    fn kind_matching() {
        assert!(Value::Integer(3).matches_kind(&ValueKind::Integer));
        assert!(!Value::Integer(3).matches_kind(&ValueKind::Decimal));
        assert!(Value::symbol("101").matches_kind(&ValueKind::Symbolic(Alphabet::Radix(2))));
    }

    #[test]
    fn hex_digits_are_upper_case() {
        let digits = Alphabet::Radix(16).digits().unwrap();
        assert_eq!(digits.len(), 16);
        assert_eq!(digits[10], 'A');
        assert!(Alphabet::Text.digits().is_none());
        assert!(Alphabet::Radix(1).digits().is_none());
    }
}
