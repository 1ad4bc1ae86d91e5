//! The event-driven stack-frame recovery engine.
//!
//! During trace replay the engine mirrors the target's actual call stack with
//! a chain of *live* frames: one node per currently-executing activation,
//! innermost outward. Each inbound event mutates the chain and, for
//! stack/frame-pointer events, updates the persisted model attached to the
//! currently active frame. At end of trace the accumulated models export as
//! [`crate::FrameData`] snapshots for the translation backend.
//!
//! # Key Components
//!
//! - [`CallStack`] - The engine: event intake, live chain, containment
//!   queries, model export
//! - `LiveStackFrame` - One concrete activation; internal to the engine and
//!   never serialized
//!
//! # Event Ordering
//!
//! Events must arrive strictly in execution order, one at a time. The engine
//! treats nesting violations as trace-integrity bugs, not recoverable runtime
//! conditions: recovering incorrectly would silently corrupt the exported
//! stack-layout model, so a fatal [`crate::Error`] aborts the session instead.

mod callstack;
mod live;

pub use callstack::CallStack;

pub(crate) use live::LiveStackFrame;
