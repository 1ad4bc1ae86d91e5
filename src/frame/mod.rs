//! Persisted per-call-site stack frame models.
//!
//! A *persisted* frame is the accumulated shape ever observed for one distinct
//! call site, independent of any single run: the set of stack-pointer and
//! frame-pointer extents recorded at each instruction, relative to the frame's
//! base address. Persisted models are keyed by [`FrameId`], live for a whole
//! recovery session, and export as immutable [`FrameData`] snapshots - the
//! sole interchange contract with the translation backend.
//!
//! # Key Components
//!
//! - [`FrameId`] - *(function entry, call site)* identity; two calls to the
//!   same function from different sites get distinct models
//! - [`StackFrame`] - The live, growing model; duplicate observations collapse
//!   under set semantics so repeated traces converge
//! - [`FrameData`] / [`PointerRecord`] - The serializable snapshot form
//!
//! # Example
//!
//! ```rust
//! use stackscope::{ByteOffset, CodeAddress, FrameId, FunctionAddress, StackFrame};
//!
//! let id = FrameId::new(FunctionAddress::new(0x4000), CodeAddress::new(0x100));
//! let mut frame = StackFrame::new(id);
//! frame.record_stack_pointer_update(CodeAddress::new(0x104), ByteOffset::new(-32));
//!
//! // Snapshots round-trip losslessly.
//! let data = frame.as_data();
//! let restored = StackFrame::from(data.clone());
//! assert_eq!(restored.as_data(), data);
//! ```

mod data;
mod id;
mod model;

pub use data::{FrameData, PointerRecord};
pub use id::FrameId;
pub use model::StackFrame;
