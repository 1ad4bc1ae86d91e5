//! Serializable snapshot form of a recovered frame model.
//!
//! [`FrameData`] is the sole on-disk and interchange contract between the
//! recovery engine and the translation backend: an `id` pair plus two arrays
//! of `(instructionAddress, byteOffset)` records. Offsets are signed;
//! addresses serialize as their raw unsigned integer value.

use serde::{Deserialize, Serialize};

use crate::address::{ByteOffset, CodeAddress};
use crate::frame::FrameId;

/// One observed pointer extent: the instruction at which the stack or frame
/// pointer was updated, and the resulting offset from the frame's base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRecord {
    /// Address of the instruction that performed the update.
    pub instruction_address: CodeAddress,
    /// Pointer position after the update, relative to the frame base.
    pub byte_offset: ByteOffset,
}

impl PointerRecord {
    /// Creates a pointer record.
    #[must_use]
    pub const fn new(instruction_address: CodeAddress, byte_offset: ByteOffset) -> Self {
        PointerRecord {
            instruction_address,
            byte_offset,
        }
    }
}

/// Immutable snapshot of one persisted [`crate::frame::StackFrame`] model.
///
/// Exported by [`crate::CallStack::data`] at end of trace (or periodically)
/// and reimported via [`crate::frame::StackFrame::from`] for cross-session
/// merging. Record arrays are ordered and duplicate-free when produced by
/// this crate; reconstruction tolerates arbitrary order and duplicates.
///
/// # Example
///
/// ```rust
/// use stackscope::{FrameData, FrameId, FunctionAddress, CodeAddress};
///
/// let data = FrameData::new(FrameId::new(
///     FunctionAddress::new(0x4000),
///     CodeAddress::new(0x100),
/// ));
/// let json = serde_json::to_string(&data)?;
/// let restored: FrameData = serde_json::from_str(&json)?;
/// assert_eq!(restored, data);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameData {
    /// Identity of the frame this snapshot belongs to.
    pub id: FrameId,
    /// Stack-pointer extents observed for this frame, ordered by instruction.
    pub stack_pointer_offsets: Vec<PointerRecord>,
    /// Frame-pointer extents observed for this frame, ordered by instruction.
    pub frame_pointer_offsets: Vec<PointerRecord>,
}

impl FrameData {
    /// Creates an empty snapshot for the given identity.
    #[must_use]
    pub const fn new(id: FrameId) -> Self {
        FrameData {
            id,
            stack_pointer_offsets: Vec::new(),
            frame_pointer_offsets: Vec::new(),
        }
    }
}
