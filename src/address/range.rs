//! Closed-open address intervals.
//!
//! The [`AddressRange`] type backs the engine's containment queries: a live
//! frame occupies the half-open interval between its base and its top, and
//! lookups must decide whether a queried address falls inside it.

use std::fmt;

use super::{Address, AddressSpace};

/// A closed-open interval `[begin, end)` over one address space.
///
/// The boundaries are always stored in ascending order regardless of
/// construction order, so callers never have to normalize operand order
/// themselves. Ranges compare lexicographically on `(begin, end)`, which is
/// the ordering interval-search structures rely on.
///
/// # Example
///
/// ```rust
/// use stackscope::{AddressRange, StackAddress};
///
/// // Operand order does not matter.
/// let range = AddressRange::new(StackAddress::new(0x1000), StackAddress::new(0x0FE0));
/// assert_eq!(range.begin(), StackAddress::new(0x0FE0));
/// assert_eq!(range.end(), StackAddress::new(0x1000));
///
/// assert!(range.contains(StackAddress::new(0x0FE0)));
/// assert!(!range.contains(StackAddress::new(0x1000)));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressRange<S: AddressSpace> {
    begin: Address<S>,
    end: Address<S>,
}

impl<S: AddressSpace> AddressRange<S> {
    /// Creates a range from two boundary addresses, in either order.
    #[must_use]
    pub fn new(a: Address<S>, b: Address<S>) -> Self {
        if a <= b {
            AddressRange { begin: a, end: b }
        } else {
            AddressRange { begin: b, end: a }
        }
    }

    /// Creates a range containing exactly one address.
    #[must_use]
    pub fn at(address: Address<S>) -> Self {
        AddressRange {
            begin: address,
            end: Address::new(address.value().saturating_add(1)),
        }
    }

    /// Returns the inclusive lower boundary.
    #[must_use]
    pub const fn begin(&self) -> Address<S> {
        self.begin
    }

    /// Returns the exclusive upper boundary.
    #[must_use]
    pub const fn end(&self) -> Address<S> {
        self.end
    }

    /// Returns true if the range contains no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Half-open containment test: `begin <= address < end`.
    #[must_use]
    pub fn contains(&self, address: Address<S>) -> bool {
        self.begin <= address && address < self.end
    }

    /// Returns true if the two ranges share at least one address.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.begin < other.end && other.begin < self.end
    }
}

impl<S: AddressSpace> fmt::Debug for AddressRange<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressRange[{}, {})", self.begin, self.end)
    }
}

impl<S: AddressSpace> fmt::Display for AddressRange<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}
