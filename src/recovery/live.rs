//! Live frame records for the activation chain.
//!
//! A live frame represents one concrete, currently-executing activation
//! observed during trace replay. Live frames exist only for the lifetime of
//! their activation and are never serialized; the durable knowledge they
//! produce flows into the persisted [`crate::StackFrame`] models instead.

use crate::address::{AddressRange, CodeAddress, StackAddress, StackSpace};
use crate::frame::FrameId;

/// One live activation on the recovered call stack.
///
/// `base` is the stack address at the moment the call was recorded and stays
/// fixed for the frame's lifetime; it is the zero point for every offset
/// recorded into the frame's persisted model. `top` is the deepest stack
/// address the frame has reached so far: it only ever extends away from
/// `base` toward lower addresses, so `top <= base` for the frame's whole
/// life. A frame is discarded as a whole - by its matching return, or by the
/// tail-jump collapse rule - never shrunk piecemeal.
#[derive(Debug, Clone)]
pub(crate) struct LiveStackFrame {
    id: FrameId,
    base: StackAddress,
    top: StackAddress,
    in_call: Option<CodeAddress>,
}

impl LiveStackFrame {
    /// Creates a live frame for a call recorded with the given stack top.
    ///
    /// The frame starts empty: `top == base`.
    pub(crate) fn new(id: FrameId, base: StackAddress) -> Self {
        LiveStackFrame {
            id,
            base,
            top: base,
            in_call: None,
        }
    }

    /// Identity of the persisted model this activation feeds.
    pub(crate) fn id(&self) -> FrameId {
        self.id
    }

    /// Stack address at the moment the call was recorded; fixed for life.
    pub(crate) fn base(&self) -> StackAddress {
        self.base
    }

    /// Deepest stack-pointer position observed for this frame so far.
    pub(crate) fn top(&self) -> StackAddress {
        self.top
    }

    /// Extends the reached extent toward the new stack-pointer position.
    ///
    /// Growth is one-way: a value shallower than the current `top` leaves it
    /// untouched, so territory the frame has reached stays part of its range
    /// until the frame itself is discarded.
    pub(crate) fn extend_to(&mut self, value: StackAddress) {
        self.top = self.top.min(value);
    }

    /// Returns true if this frame has an outstanding, not-yet-matched call.
    ///
    /// Distinguishes "between a call instruction and the callee's first
    /// stack-pointer observation" from normal in-frame execution.
    pub(crate) fn in_call(&self) -> bool {
        self.in_call.is_some()
    }

    /// Call site of the outstanding call, if any.
    pub(crate) fn call_site(&self) -> Option<CodeAddress> {
        self.in_call
    }

    /// Marks an outstanding call issued from `call_site`.
    pub(crate) fn begin_call(&mut self, call_site: CodeAddress) {
        self.in_call = Some(call_site);
    }

    /// Clears the outstanding-call marker after the matching return.
    pub(crate) fn end_call(&mut self) {
        self.in_call = None;
    }

    /// The half-open stack region this frame currently occupies.
    pub(crate) fn range(&self) -> AddressRange<StackSpace> {
        AddressRange::new(self.base, self.top)
    }
}
