use std::fmt;

use serde::{Deserialize, Serialize};

/// Inferred type of a metadata variable.
///
/// Only `Integer` and `Float` variables can be range-filtered; everything
/// else is handled as a set of factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Integer,
    Float,
    Categorical,
}

impl Dtype {
    pub fn is_numeric(self) -> bool {
        matches!(self, Dtype::Integer | Dtype::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Integer => "integer",
            Dtype::Float => "float",
            Dtype::Categorical => "categorical",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_partition() {
        assert!(Dtype::Integer.is_numeric());
        assert!(Dtype::Float.is_numeric());
        assert!(!Dtype::Categorical.is_numeric());
        assert_eq!(Dtype::Categorical.to_string(), "categorical");
    }
}
