//! Value object marker: equality by value, never mutated after construction.

/// Marker trait for value objects.
///
/// Implementors are immutable once built and compared by their attributes.
/// To "change" one, build a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
