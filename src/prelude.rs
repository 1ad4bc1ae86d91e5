//! # stackscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the stackscope library. Import this module to get quick access to the
//! essential types for stack-frame recovery.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all stackscope operations
pub use crate::Error;

/// The result type used throughout stackscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The stack-frame recovery engine; one instance per replayed trace
pub use crate::recovery::CallStack;

// ================================================================================================
// Address Value Types
// ================================================================================================

/// Entry address of a traced function
pub use crate::address::FunctionAddress;

/// Address of an executed instruction
pub use crate::address::CodeAddress;

/// Address inside the target's runtime stack
pub use crate::address::StackAddress;

/// Signed byte distance between two same-space addresses
pub use crate::address::ByteOffset;

/// Closed-open interval over one address space
pub use crate::address::AddressRange;

// ================================================================================================
// Persisted Frame Models
// ================================================================================================

/// Identity of a persisted frame: *(function entry, call site)*
pub use crate::frame::FrameId;

/// Accumulated pointer extents for one call site
pub use crate::frame::StackFrame;

/// Serializable snapshot of a recovered frame model
pub use crate::frame::FrameData;

/// One `(instruction, offset)` extent observation
pub use crate::frame::PointerRecord;
