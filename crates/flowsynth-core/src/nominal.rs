//! Named types with declared coercions.
//!
//! [`NominalTypes`] is the stock [`TypeSystem`]: a type is just a name
//! ([`TypeName`]). Assignability follows a conservative policy:
//!
//! - Every type is assignable to itself.
//! - Declared coercions (`Int -> Number`) apply, and chain transitively
//!   (`Int -> Number -> Any`).
//! - Every type is assignable to the optional top type.
//! - Nothing else: no implicit narrowing, no structural matching.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::TypeSystem;

/// A nominal type, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        TypeName(s.to_string())
    }
}

/// Nominal type system with declared, transitive coercions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NominalTypes {
    /// Declared `(from, to)` coercion pairs.
    #[serde(default)]
    coercions: Vec<(TypeName, TypeName)>,
    /// A type every other type is assignable to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top: Option<TypeName>,
}

impl NominalTypes {
    /// Creates a type system where only identical names are assignable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as the top type.
    pub fn with_top(mut self, name: &str) -> Result<Self, CoreError> {
        self.top = Some(checked_name(name)?);
        Ok(self)
    }

    /// Declares that values of `from` may flow into slots of `to`.
    pub fn declare_coercion(&mut self, from: &str, to: &str) -> Result<&mut Self, CoreError> {
        let pair = (checked_name(from)?, checked_name(to)?);
        if !self.coercions.contains(&pair) {
            self.coercions.push(pair);
        }
        Ok(self)
    }

    /// Returns `true` if `from` reaches `to` through declared coercions.
    pub fn can_coerce(&self, from: &TypeName, to: &TypeName) -> bool {
        if from == to || self.top.as_ref() == Some(to) {
            return true;
        }

        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();
        queue.push_back(from);
        seen.insert(from);

        while let Some(current) = queue.pop_front() {
            for (a, b) in &self.coercions {
                if a != current || !seen.insert(b) {
                    continue;
                }
                if b == to {
                    return true;
                }
                queue.push_back(b);
            }
        }
        false
    }
}

fn checked_name(name: &str) -> Result<TypeName, CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidTypeName {
            name: name.to_string(),
        });
    }
    Ok(TypeName::from(name))
}

impl TypeSystem for NominalTypes {
    type Type = TypeName;

    fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        self.can_coerce(from, to)
    }

    fn display(&self, ty: &TypeName) -> String {
        ty.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> TypeName {
        TypeName::from(name)
    }

    #[test]
    fn identical_names_are_assignable() {
        let types = NominalTypes::new();
        assert!(types.is_assignable(&t("Int"), &t("Int")));
        assert!(!types.is_assignable(&t("Int"), &t("String")));
    }

    #[test]
    fn coercions_chain_transitively() {
        let mut types = NominalTypes::new();
        types
            .declare_coercion("Int", "Number")
            .unwrap()
            .declare_coercion("Number", "Value")
            .unwrap();

        assert!(types.is_assignable(&t("Int"), &t("Value")));
        assert!(!types.is_assignable(&t("Value"), &t("Int")));
    }

    #[test]
    fn coercion_cycles_terminate() {
        let mut types = NominalTypes::new();
        types.declare_coercion("A", "B").unwrap();
        types.declare_coercion("B", "A").unwrap();

        assert!(types.is_assignable(&t("A"), &t("B")));
        assert!(!types.is_assignable(&t("A"), &t("C")));
    }

    #[test]
    fn top_type_accepts_everything() {
        let types = NominalTypes::new().with_top("Any").unwrap();
        assert!(types.is_assignable(&t("String"), &t("Any")));
        assert!(!types.is_assignable(&t("Any"), &t("String")));
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut types = NominalTypes::new();
        let err = types.declare_coercion("", "Int").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTypeName { .. }));
    }

    #[test]
    fn deserializes_from_problem_file_shape() {
        let types: NominalTypes =
            serde_json::from_str(r#"{"coercions": [["Int", "Number"]], "top": "Any"}"#).unwrap();
        assert!(types.is_assignable(&t("Int"), &t("Number")));
        assert!(types.is_assignable(&t("Bool"), &t("Any")));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];

        fn arb_coercions() -> impl Strategy<Value = Vec<(usize, usize)>> {
            prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..8)
        }

        proptest! {
            /// Assignability is reflexive and closed under chaining.
            #[test]
            fn assignability_is_a_preorder(pairs in arb_coercions()) {
                let mut types = NominalTypes::new();
                for (a, b) in &pairs {
                    types.declare_coercion(NAMES[*a], NAMES[*b]).unwrap();
                }
                for a in NAMES {
                    prop_assert!(types.is_assignable(&t(a), &t(a)));
                    for b in NAMES {
                        for c in NAMES {
                            if types.is_assignable(&t(a), &t(b)) && types.is_assignable(&t(b), &t(c)) {
                                prop_assert!(types.is_assignable(&t(a), &t(c)), "{a} -> {b} -> {c}");
                            }
                        }
                    }
                }
            }
        }
    }
}
