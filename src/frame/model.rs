use std::collections::BTreeSet;
use std::fmt;

use crate::address::{ByteOffset, CodeAddress};
use crate::frame::{FrameData, FrameId, PointerRecord};

/// The persisted model of one call site's stack frame.
///
/// A `StackFrame` accumulates every stack-pointer and frame-pointer extent
/// ever observed for its call site, as ordered, duplicate-free sets of
/// `(instruction, offset)` pairs. Offsets are relative to the frame's base
/// address (the stack address at the moment the call was recorded), which
/// makes the model independent of where a particular execution placed the
/// stack.
///
/// The model only grows: a new observation extends it and never invalidates
/// it, so the model is always a safe union of everything seen across however
/// many traces fed it. Recording an already-known pair is a no-op under set
/// semantics, which is what lets repeated runs converge without unbounded
/// growth.
///
/// Created by the recovery engine the first time a [`FrameId`] is
/// encountered, or reconstructed from a previously exported [`FrameData`]
/// snapshot when an external collaborator merges sessions.
///
/// # Example
///
/// ```rust
/// use stackscope::{ByteOffset, CodeAddress, FrameId, FunctionAddress, StackFrame};
///
/// let id = FrameId::new(FunctionAddress::new(0x4000), CodeAddress::new(0x100));
/// let mut frame = StackFrame::new(id);
///
/// frame.record_stack_pointer_update(CodeAddress::new(0x104), ByteOffset::new(-32));
/// frame.record_stack_pointer_update(CodeAddress::new(0x104), ByteOffset::new(-32));
///
/// // Duplicate observations collapse to one entry.
/// assert_eq!(frame.stack_pointer_offsets().count(), 1);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StackFrame {
    id: FrameId,
    stack_pointer: BTreeSet<(CodeAddress, ByteOffset)>,
    frame_pointer: BTreeSet<(CodeAddress, ByteOffset)>,
}

impl StackFrame {
    /// Creates an empty model for the given frame identity.
    #[must_use]
    pub fn new(id: FrameId) -> Self {
        StackFrame {
            id,
            stack_pointer: BTreeSet::new(),
            frame_pointer: BTreeSet::new(),
        }
    }

    /// Returns the identity this model belongs to.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// Records a stack-pointer extent observed at `instruction`.
    ///
    /// `offset` is the stack pointer's position relative to the frame base.
    /// Duplicate `(instruction, offset)` pairs collapse to one entry.
    pub fn record_stack_pointer_update(&mut self, instruction: CodeAddress, offset: ByteOffset) {
        self.stack_pointer.insert((instruction, offset));
    }

    /// Records a frame-pointer extent observed at `instruction`.
    ///
    /// `offset` is the frame pointer's position relative to the frame base.
    /// Duplicate `(instruction, offset)` pairs collapse to one entry.
    pub fn record_frame_pointer_update(&mut self, instruction: CodeAddress, offset: ByteOffset) {
        self.frame_pointer.insert((instruction, offset));
    }

    /// Iterates the recorded stack-pointer extents in ascending order.
    pub fn stack_pointer_offsets(&self) -> impl Iterator<Item = PointerRecord> + '_ {
        self.stack_pointer
            .iter()
            .map(|&(instruction, offset)| PointerRecord::new(instruction, offset))
    }

    /// Iterates the recorded frame-pointer extents in ascending order.
    pub fn frame_pointer_offsets(&self) -> impl Iterator<Item = PointerRecord> + '_ {
        self.frame_pointer
            .iter()
            .map(|&(instruction, offset)| PointerRecord::new(instruction, offset))
    }

    /// Exports this model as an immutable [`FrameData`] snapshot.
    ///
    /// Exporting, reimporting, and exporting again yields a set-equal
    /// snapshot for any history of recorded updates.
    #[must_use]
    pub fn as_data(&self) -> FrameData {
        FrameData {
            id: self.id,
            stack_pointer_offsets: self.stack_pointer_offsets().collect(),
            frame_pointer_offsets: self.frame_pointer_offsets().collect(),
        }
    }
}

impl From<FrameData> for StackFrame {
    /// Reconstructs a live model from a previously exported snapshot.
    ///
    /// Out-of-order or duplicated records in the snapshot are absorbed by the
    /// set semantics; continuing to record into the result merges new
    /// observations with the imported ones.
    fn from(data: FrameData) -> Self {
        StackFrame {
            id: data.id,
            stack_pointer: data
                .stack_pointer_offsets
                .into_iter()
                .map(|record| (record.instruction_address, record.byte_offset))
                .collect(),
            frame_pointer: data
                .frame_pointer_offsets
                .into_iter()
                .map(|record| (record.instruction_address, record.byte_offset))
                .collect(),
        }
    }
}

impl fmt::Debug for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StackFrame({}, sp extents: {}, fp extents: {})",
            self.id,
            self.stack_pointer.len(),
            self.frame_pointer.len()
        )
    }
}
