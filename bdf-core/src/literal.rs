//! Literal tables for enumerated BDF fields.
//!
//! Every enumeration serialized in a BDF header has a fixed textual form.
//! Lists of literals are written space separated.

/// An enumeration with a fixed textual form in BDF documents.
pub trait Literal: Sized + Copy + Eq + 'static {
    /// Name of the enumeration, as used in diagnostics.
    const NAME: &'static str;

    /// Returns the textual form of this value.
    fn literal(self) -> &'static str;

    /// Returns every value of the enumeration, in declaration order.
    fn all() -> &'static [Self];

    /// Parses a value from its textual form.
    #[must_use]
    fn from_literal(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.literal() == s)
    }
}

/// Joins literals with single spaces.
#[must_use]
pub fn to_literals<T: Literal>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.literal())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a whitespace separated list of literals.
///
/// # Errors
/// Returns the first token that is not a literal of `T`.
pub fn from_literals<T: Literal>(s: &str) -> Result<Vec<T>, &str> {
    s.split_whitespace()
        .map(|token| T::from_literal(token).ok_or(token))
        .collect()
}

/// Declares an enumeration together with its literal table.
macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $type_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $lit:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::literal::Literal for $name {
            const NAME: &'static str = $type_name;

            fn literal(self) -> &'static str {
                match self {
                    $( Self::$variant => $lit ),+
                }
            }

            fn all() -> &'static [Self] {
                &[ $( Self::$variant ),+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::literal::Literal::literal(*self))
            }
        }
    };
}

pub(crate) use literal_enum;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AxisName, StokesParameter};

    #[test]
    fn test_to_literals() {
        let axes = [AxisName::Tim, AxisName::Bal, AxisName::Spp, AxisName::Pol];
        assert_eq!(to_literals(&axes), "TIM BAL SPP POL");
        assert_eq!(to_literals::<AxisName>(&[]), "");
    }

    #[test]
    fn test_from_literals() {
        let parsed: Vec<StokesParameter> =
            from_literals("XX  XY\tYX YY").expect("Failed to parse literals");
        assert_eq!(
            parsed,
            vec![
                StokesParameter::Xx,
                StokesParameter::Xy,
                StokesParameter::Yx,
                StokesParameter::Yy
            ]
        );
    }

    #[test]
    fn test_from_literals_reports_bad_token() {
        let result = from_literals::<AxisName>("TIM FOO BAL");
        assert_eq!(result, Err("FOO"));
    }

    #[test]
    fn test_literal_tables_are_bijective() {
        for axis in AxisName::all() {
            assert_eq!(AxisName::from_literal(axis.literal()), Some(*axis));
        }
        for stokes in StokesParameter::all() {
            assert_eq!(StokesParameter::from_literal(stokes.literal()), Some(*stokes));
        }
        assert_eq!(AxisName::from_literal("tim"), None);
    }
}
