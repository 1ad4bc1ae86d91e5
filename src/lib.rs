// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # stackscope
//!
//! A stack-frame recovery engine for dynamic binary lifting and recompilation.
//!
//! `stackscope` is the analysis core of a binary-lifting pipeline: a native
//! executable is run under instrumented dynamic execution, the instrumentation
//! engine emits a stream of low-level runtime events (calls, returns,
//! stack-pointer and frame-pointer changes, memory writes), and this crate
//! consumes that stream to reconstruct, per distinct call site, a model of how
//! deep and in what shape that function's stack frame grows. The recovered
//! models let a static translation backend represent stack memory as
//! structured storage instead of an opaque byte array addressed by raw pointer
//! arithmetic.
//!
//! ## Features
//!
//! - **📈 Online recovery** - Incremental, single-pass processing of one linear
//!   event trace; no source, symbols, or disassembly required
//! - **🧩 Per-call-site models** - Frame shape is keyed by *(function entry,
//!   call site)*, since callee layout can depend on caller-supplied context
//! - **🔄 Monotonic accumulation** - Models are a safe union of everything ever
//!   observed; repeated traces converge instead of growing without bound
//! - **↩️ Tail-jump tolerance** - Non-standard epilogues that discard a frame
//!   without a matching return are detected and spliced out of the live chain
//! - **🛡️ Unit-safe addressing** - Function, instruction, and stack addresses
//!   are distinct types; cross-space arithmetic is a compile-time error
//! - **📦 Stable interchange** - Recovered models export as serializable
//!   snapshots for cross-session merging and backend consumption
//!
//! ## Quick Start
//!
//! Add `stackscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! stackscope = "0.1"
//! ```
//!
//! ### Replaying a trace
//!
//! ```rust
//! use stackscope::prelude::*;
//!
//! let mut stack = CallStack::new();
//!
//! // The instrumentation engine delivers events in execution order.
//! stack.record_call(
//!     FunctionAddress::new(0x4000),
//!     CodeAddress::new(0x100),
//!     StackAddress::new(0x1000),
//! )?;
//! stack.record_stack_pointer_update(CodeAddress::new(0x104), StackAddress::new(0x0FE0));
//! stack.record_return(FunctionAddress::new(0x4000))?;
//!
//! // Export the recovered frame models for the translation backend.
//! for frame in stack.data() {
//!     println!(
//!         "{}: {} stack-pointer extents",
//!         frame.id,
//!         frame.stack_pointer_offsets.len()
//!     );
//! }
//! # Ok::<(), stackscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `stackscope` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`address`] - Unit-safe address, offset, and range value types
//! - [`frame`] - Persisted per-call-site frame models and their snapshots
//! - [`recovery`] - The event-driven recovery engine ([`CallStack`])
//! - [`Error`] and [`Result`] - Trace-consistency error handling
//!
//! ## Event Model
//!
//! One [`CallStack`] instance replays exactly one trace. Events must be
//! delivered synchronously, one at a time, in the exact order they occurred
//! during execution; the frame-nesting invariants depend on in-order delivery.
//! A corrupted or misinterpreted trace surfaces as a fatal [`Error`], at which
//! point the session must be abandoned - there is no safe local recovery.
//!
//! Cross-trace merging happens at the data boundary: each session exports a
//! collection of [`FrameData`] snapshots, and an external collaborator merges
//! them (set union of exports, or reloading a snapshot into a fresh
//! [`StackFrame`] and continuing to record into it).
//!
//! ## Thread Safety
//!
//! The engine is strictly single-threaded. [`CallStack`] owns all of its state
//! exclusively and must not be shared between traces; process each trace with
//! an independently constructed instance.

mod error;

/// Prelude module providing convenient imports for common functionality
///
/// This module provides a curated selection of the most frequently used types
/// from across the stackscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use stackscope::prelude::*;
///
/// let stack = CallStack::new();
/// assert!(!stack.points_to_stack(StackAddress::new(0x1000)));
/// ```
pub mod prelude;

/// Unit-safe address, offset, and range value types
///
/// This module provides the strongly typed address arithmetic the rest of the
/// crate is built on:
///
/// - [`address::Address`] - A 64-bit address tagged by its address space
/// - [`address::FunctionAddress`], [`address::CodeAddress`],
///   [`address::StackAddress`] - The three spaces used by the recovery engine
/// - [`address::ByteOffset`] - A signed byte distance between two addresses of
///   the same space
/// - [`address::AddressRange`] - A closed-open `[begin, end)` interval
///
/// Addresses from different spaces cannot be compared or subtracted; the
/// mistake is rejected at compile time rather than checked at runtime.
pub mod address;

/// Persisted per-call-site frame models
///
/// This module defines what the recovery engine accumulates and exports:
///
/// - [`frame::FrameId`] - Identity of a frame: *(function entry, call site)*
/// - [`frame::StackFrame`] - The growing, duplicate-free set of pointer
///   extents observed for one call site
/// - [`frame::FrameData`] - The serializable snapshot form of a model
///
/// Models only ever grow (monotonic union) and round-trip losslessly through
/// their [`frame::FrameData`] snapshots.
pub mod frame;

/// The event-driven stack-frame recovery engine
///
/// The centerpiece is [`recovery::CallStack`], which consumes the
/// instrumentation engine's event stream, maintains the chain of live
/// activations mirroring the target's call stack, and updates the persisted
/// model of whichever frame is currently executing.
///
/// # Example
///
/// ```rust
/// use stackscope::{CallStack, CodeAddress, FunctionAddress, StackAddress};
///
/// let mut stack = CallStack::new();
/// stack.record_call(
///     FunctionAddress::new(0x4000),
///     CodeAddress::new(0x100),
///     StackAddress::new(0x1000),
/// )?;
/// assert_eq!(stack.depth(), 1);
/// # Ok::<(), stackscope::Error>(())
/// ```
pub mod recovery;

/// `stackscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. This is used consistently throughout the crate for all
/// fallible operations.
///
/// # Examples
///
/// ```rust
/// use stackscope::{CallStack, FunctionAddress, Result};
///
/// fn replay_return(stack: &mut CallStack, from: u64) -> Result<()> {
///     stack.record_return(FunctionAddress::new(from))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `stackscope` Error type
///
/// The main error type for all operations in this crate. Every variant is a
/// fatal trace-consistency violation; expected absences (containment queries
/// that find no frame) are reported as `Option`/`bool`, never as an error.
///
/// # Examples
///
/// ```rust
/// use stackscope::{CallStack, Error, FunctionAddress};
///
/// let mut stack = CallStack::new();
/// match stack.record_return(FunctionAddress::new(0x4000)) {
///     Err(Error::ReturnWithoutCall { function }) => {
///         eprintln!("corrupt trace: return from {} with no active frame", function);
///     }
///     other => panic!("expected a fatal consistency error, got {:?}", other),
/// }
/// ```
pub use error::Error;

/// Main entry point for replaying a dynamic trace.
///
/// See [`recovery::CallStack`] for the full event intake and query surface.
pub use recovery::CallStack;

/// Persisted frame model types.
///
/// - [`StackFrame`] - Accumulated pointer extents for one call site
/// - [`FrameData`] - Serializable snapshot of a [`StackFrame`]
/// - [`FrameId`] - *(function entry, call site)* identity
/// - [`PointerRecord`] - One `(instruction, offset)` extent observation
pub use frame::{FrameData, FrameId, PointerRecord, StackFrame};

/// Unit-safe address value types.
///
/// - [`FunctionAddress`] - Entry address of a traced function
/// - [`CodeAddress`] - Address of an executed instruction
/// - [`StackAddress`] - Address inside the target's stack
/// - [`ByteOffset`] - Signed distance between two same-space addresses
/// - [`AddressRange`] - Closed-open interval over one address space
pub use address::{AddressRange, ByteOffset, CodeAddress, FunctionAddress, StackAddress};
