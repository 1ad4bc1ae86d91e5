//! Strongly typed address and offset value types.
//!
//! Binary-lifting code juggles values from several unrelated address spaces:
//! function entry points, executed instruction addresses, and addresses inside
//! the target's runtime stack. Mixing them up is one of the most common bug
//! classes in this domain, so each space gets its own zero-cost wrapper type
//! and no operation is defined across spaces - a violation is a compile-time
//! type error, not a runtime check.
//!
//! Within one space, addresses are totally ordered and subtraction yields a
//! [`ByteOffset`], a signed distance that is itself distinct from every
//! address type.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Sub;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod range;

pub use range::AddressRange;

/// Marker trait for the address spaces an [`Address`] can be tagged with.
///
/// Implemented only by the unit marker types in this module; the trait exists
/// so that [`Address`] can be generic over its space while keeping the wrapper
/// zero-cost.
pub trait AddressSpace: Copy + Eq + Ord + std::hash::Hash + fmt::Debug {
    /// Short lowercase name of the space, used in diagnostics.
    const NAME: &'static str;
}

/// Address space of function entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionSpace;

/// Address space of executed instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodeSpace;

/// Address space of the target's runtime stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackSpace;

impl AddressSpace for FunctionSpace {
    const NAME: &'static str = "function";
}

impl AddressSpace for CodeSpace {
    const NAME: &'static str = "code";
}

impl AddressSpace for StackSpace {
    const NAME: &'static str = "stack";
}

/// A 64-bit address tagged by the address space it belongs to.
///
/// The tag is purely a compile-time artifact; an `Address<S>` is exactly a
/// `u64` at runtime. Addresses of the same space compare and subtract
/// (producing a [`ByteOffset`]); addresses of different spaces share no
/// operations at all.
///
/// # Example
///
/// ```rust
/// use stackscope::{ByteOffset, StackAddress};
///
/// let base = StackAddress::new(0x1000);
/// let top = StackAddress::new(0x0FE0);
///
/// // Subtraction is defined in either direction and always correctly signed.
/// assert_eq!(top - base, ByteOffset::new(-32));
/// assert_eq!(base - top, ByteOffset::new(32));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address<S: AddressSpace> {
    value: u64,
    space: PhantomData<S>,
}

/// Entry address of a traced function.
pub type FunctionAddress = Address<FunctionSpace>;

/// Address of an executed instruction.
pub type CodeAddress = Address<CodeSpace>;

/// Address inside the target's runtime stack.
pub type StackAddress = Address<StackSpace>;

impl<S: AddressSpace> Address<S> {
    /// Creates a new address from a raw 64-bit value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Address {
            value,
            space: PhantomData,
        }
    }

    /// Returns the raw address value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Displaces this address by a signed byte offset, within the same space.
    ///
    /// Returns `None` if the result would leave the 64-bit address range.
    #[must_use]
    pub fn checked_add_offset(self, offset: ByteOffset) -> Option<Self> {
        self.value.checked_add_signed(offset.value()).map(Self::new)
    }
}

impl<S: AddressSpace> Sub for Address<S> {
    type Output = ByteOffset;

    /// Computes the signed byte distance `self - rhs`.
    ///
    /// The subtraction direction is normalized internally: the smaller operand
    /// is subtracted from the larger one and the result negated when needed,
    /// so the offset is the exact signed difference for any operand order.
    fn sub(self, rhs: Self) -> ByteOffset {
        if self.value >= rhs.value {
            ByteOffset::new((self.value - rhs.value) as i64)
        } else {
            ByteOffset::new(-((rhs.value - self.value) as i64))
        }
    }
}

impl<S: AddressSpace> From<u64> for Address<S> {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl<S: AddressSpace> From<Address<S>> for u64 {
    fn from(address: Address<S>) -> Self {
        address.value
    }
}

impl<S: AddressSpace> fmt::Debug for Address<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{:x}, space: {})", self.value, S::NAME)
    }
}

impl<S: AddressSpace> fmt::Display for Address<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.value)
    }
}

impl<S: AddressSpace> Serialize for Address<S> {
    /// Addresses serialize as their raw unsigned integer value.
    fn serialize<T: Serializer>(&self, serializer: T) -> std::result::Result<T::Ok, T::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, S: AddressSpace> Deserialize<'de> for Address<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Address::new)
    }
}

/// A signed distance, in bytes, between two addresses of the same space.
///
/// Offsets are produced by address subtraction and are deliberately not
/// interchangeable with any address type. In recovered frame models they are
/// relative to the frame's base address, which makes the model independent of
/// where in the address space a particular execution placed the stack.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteOffset(i64);

impl ByteOffset {
    /// Creates a byte offset from a raw signed value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        ByteOffset(value)
    }

    /// Returns the raw signed value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ByteOffset {
    fn from(value: i64) -> Self {
        ByteOffset(value)
    }
}

impl From<ByteOffset> for i64 {
    fn from(offset: ByteOffset) -> Self {
        offset.0
    }
}

impl fmt::Debug for ByteOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteOffset({})", self.0)
    }
}

impl fmt::Display for ByteOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
