//! The type-system seam.
//!
//! The engine never interprets types itself. Every place a type matters it
//! asks a [`TypeSystem`]: "may a value of `from` flow into a slot of `to`?"
//! and "how should `ty` be shown to a human?". Callers plug in their own
//! representation; [`NominalTypes`](crate::nominal::NominalTypes) is the
//! stock implementation and [`PredicateTypes`] wraps a pair of closures.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Caller-supplied type predicates.
pub trait TypeSystem {
    /// The type representation carried by slots and graph inputs.
    type Type: Clone + Eq + Hash + fmt::Debug;

    /// Returns `true` if a value of type `from` may be consumed where `to`
    /// is declared.
    fn is_assignable(&self, from: &Self::Type, to: &Self::Type) -> bool;

    /// Renders a type for diagnostics.
    fn display(&self, ty: &Self::Type) -> String;
}

/// A [`TypeSystem`] built from two closures.
pub struct PredicateTypes<T, A, D> {
    assignable: A,
    display: D,
    _marker: PhantomData<fn() -> T>,
}

impl<T, A, D> PredicateTypes<T, A, D>
where
    A: Fn(&T, &T) -> bool,
    D: Fn(&T) -> String,
{
    pub fn new(assignable: A, display: D) -> Self {
        PredicateTypes {
            assignable,
            display,
            _marker: PhantomData,
        }
    }
}

impl<T, A, D> TypeSystem for PredicateTypes<T, A, D>
where
    T: Clone + Eq + Hash + fmt::Debug,
    A: Fn(&T, &T) -> bool,
    D: Fn(&T) -> String,
{
    type Type = T;

    fn is_assignable(&self, from: &T, to: &T) -> bool {
        (self.assignable)(from, to)
    }

    fn display(&self, ty: &T) -> String {
        (self.display)(ty)
    }
}
