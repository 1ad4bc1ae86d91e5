use std::collections::BTreeMap;

use crate::address::{CodeAddress, FunctionAddress, StackAddress};
use crate::frame::{FrameData, FrameId, StackFrame};
use crate::recovery::LiveStackFrame;
use crate::{Error, Result};

/// The stack-frame recovery engine for one trace-replay session.
///
/// A `CallStack` consumes the event stream produced by the dynamic
/// instrumentation engine - calls, returns, stack-pointer changes,
/// frame-pointer changes, memory writes - and maintains two things:
///
/// - The *live chain*: one [`LiveStackFrame`] per currently-executing
///   activation, innermost last, mirroring the target's actual call stack.
/// - The *persisted models*: one [`StackFrame`] per distinct [`FrameId`]
///   encountered, accumulating every pointer extent ever observed for that
///   call site.
///
/// The live chain is ordered by strictly descending base address (stacks grow
/// toward lower addresses and frames must nest monotonically), so the chain
/// itself doubles as the base-address lookup structure for containment
/// queries: the innermost candidate for a query address is the frame with the
/// smallest base above it.
///
/// # Session Model
///
/// One instance replays exactly one trace, single-threaded, events strictly
/// in execution order. Consistency violations (a call overlapping live frame
/// territory, a return not matching the innermost frame) are fatal: the
/// session must be abandoned, since every subsequent frame-base computation
/// depends on the violated invariant. Containment queries that find nothing
/// are normal outcomes, not errors.
///
/// # Example
///
/// ```rust
/// use stackscope::{CallStack, CodeAddress, FunctionAddress, StackAddress};
///
/// let mut stack = CallStack::new();
///
/// // call f from 0x100, pushing the stack top to 0x1000
/// stack.record_call(
///     FunctionAddress::new(0x4000),
///     CodeAddress::new(0x100),
///     StackAddress::new(0x1000),
/// )?;
///
/// // f's prologue reserves 32 bytes
/// stack.record_stack_pointer_update(CodeAddress::new(0x4004), StackAddress::new(0x0FE0));
/// assert!(stack.points_to_stack(StackAddress::new(0x0FF0)));
///
/// stack.record_return(FunctionAddress::new(0x4000))?;
/// assert_eq!(stack.depth(), 0);
///
/// let exported = stack.data();
/// assert_eq!(exported.len(), 1);
/// assert_eq!(exported[0].stack_pointer_offsets[0].byte_offset.value(), -32);
/// # Ok::<(), stackscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CallStack {
    /// Live activations, innermost last; doubles as the ordered base index.
    frames: Vec<LiveStackFrame>,
    /// Every persisted model created during this session.
    persisted: BTreeMap<FrameId, StackFrame>,
    /// The very first stack-pointer value seen before any call; anchors
    /// whole-program stack bounds.
    stack_base: Option<StackAddress>,
    /// Outstanding-call marker of the sentinel root (depth 0).
    root_in_call: Option<CodeAddress>,
}

impl CallStack {
    /// Creates an engine for a fresh trace-replay session.
    #[must_use]
    pub fn new() -> Self {
        CallStack::default()
    }

    /// Records a call event: `target` was entered from `call_site`, leaving
    /// the stack pointer at `top`.
    ///
    /// Looks up or creates the persisted model for
    /// `FrameId { target, call_site }`, marks the current innermost frame (or
    /// the sentinel root) as in-call, and pushes a live frame whose base is
    /// `top`.
    ///
    /// # Errors
    ///
    /// [`Error::FrameNesting`] if `top` does not go strictly deeper than
    /// everything the innermost live frame has touched. Frames must nest
    /// monotonically; a violation means the trace is corrupt and the session
    /// cannot continue.
    pub fn record_call(
        &mut self,
        target: FunctionAddress,
        call_site: CodeAddress,
        top: StackAddress,
    ) -> Result<()> {
        if let Some(innermost) = self.frames.last() {
            if top >= innermost.top() {
                return Err(Error::FrameNesting {
                    function: target,
                    call_site,
                    top,
                });
            }
        }

        let id = FrameId::new(target, call_site);
        self.persisted
            .entry(id)
            .or_insert_with(|| StackFrame::new(id));

        match self.frames.last_mut() {
            Some(innermost) => innermost.begin_call(call_site),
            None => self.root_in_call = Some(call_site),
        }

        self.frames.push(LiveStackFrame::new(id, top));
        Ok(())
    }

    /// Records a return event from the function at `from`.
    ///
    /// Pops and destroys the innermost live frame, restoring the chain to
    /// what it was before the matching call, and clears the new innermost
    /// frame's (or the sentinel root's) in-call marker.
    ///
    /// # Errors
    ///
    /// [`Error::ReturnMismatch`] if `from` differs from the innermost frame's
    /// function address, [`Error::ReturnWithoutCall`] if no frame is active.
    /// Both indicate a corrupted or misinterpreted trace.
    pub fn record_return(&mut self, from: FunctionAddress) -> Result<()> {
        let Some(innermost) = self.frames.last() else {
            return Err(Error::ReturnWithoutCall { function: from });
        };
        if innermost.id().function() != from {
            return Err(Error::ReturnMismatch {
                expected: innermost.id().function(),
                actual: from,
            });
        }

        self.frames.pop();
        match self.frames.last_mut() {
            Some(parent) => parent.end_call(),
            None => self.root_in_call = None,
        }
        Ok(())
    }

    /// Records a stack-pointer change: the instruction at `instruction` moved
    /// the stack pointer to `value`.
    ///
    /// Before any call has been recorded there is no frame to attribute the
    /// value to; the first such value is latched as the whole-program stack
    /// base and later pre-call values are ignored. Otherwise the offset from
    /// the current frame's base is recorded into its persisted model and the
    /// frame's reached extent grows to cover the new position. Growth is
    /// one-way: a value shallower than the frame's top leaves its extent as
    /// is, so territory already reached stays part of the frame until the
    /// frame itself is discarded.
    ///
    /// If the new value retreats past the current frame's own base and lands
    /// exactly on the parent frame's base, the parent is spliced out of the
    /// chain without a return event: a tail-jump epilogue discarded that
    /// activation, and its return will never come. Exactly one level is
    /// removed per qualifying update.
    pub fn record_stack_pointer_update(&mut self, instruction: CodeAddress, value: StackAddress) {
        let Some(frame) = self.frames.last_mut() else {
            if self.stack_base.is_none() {
                self.stack_base = Some(value);
            }
            return;
        };

        let id = frame.id();
        let offset = value - frame.base();
        self.persisted
            .entry(id)
            .or_insert_with(|| StackFrame::new(id))
            .record_stack_pointer_update(instruction, offset);
        frame.extend_to(value);

        self.collapse_discarded_parent(value);
    }

    /// Records a frame-pointer change: the instruction at `instruction` moved
    /// the frame pointer to `value`.
    ///
    /// The offset from the current frame's base goes into the frame-pointer
    /// set of its persisted model. The frame's top is untouched and the
    /// tail-jump collapse rule never applies. A no-op before any call has
    /// been recorded.
    pub fn record_frame_pointer_update(&mut self, instruction: CodeAddress, value: StackAddress) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };

        let id = frame.id();
        let offset = value - frame.base();
        self.persisted
            .entry(id)
            .or_insert_with(|| StackFrame::new(id))
            .record_frame_pointer_update(instruction, offset);
    }

    /// Correlates a memory write at `location` with the live frame that owns
    /// that address, if any.
    ///
    /// This is a hook for downstream write-to-frame correlation; the engine
    /// itself accumulates nothing here. `None` is the normal outcome for
    /// writes outside every live frame's range.
    #[must_use]
    pub fn record_memory_write(
        &self,
        _instruction: CodeAddress,
        location: StackAddress,
    ) -> Option<FrameId> {
        self.find_frame(location).map(LiveStackFrame::id)
    }

    /// Returns true if `address` falls inside a live frame's occupied range.
    ///
    /// False is a normal outcome - before the first call, after all frames
    /// returned, or for addresses in territory no frame covers.
    #[must_use]
    pub fn points_to_stack(&self, address: StackAddress) -> bool {
        self.find_frame(address).is_some()
    }

    /// The very first stack-pointer value observed before any call, if one
    /// was seen. Anchors whole-program stack bounds.
    #[must_use]
    pub fn stack_base(&self) -> Option<StackAddress> {
        self.stack_base
    }

    /// Current live nesting depth; 0 means only the sentinel root is active.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Exports every persisted model created during this session.
    ///
    /// The collection is flat and order-irrelevant; each element is an
    /// immutable [`FrameData`] snapshot for the translation backend.
    #[must_use]
    pub fn data(&self) -> Vec<FrameData> {
        self.persisted.values().map(StackFrame::as_data).collect()
    }

    /// Finds the live frame whose occupied range contains `address`.
    ///
    /// Stacks grow toward lower addresses and a frame's reached extent only
    /// grows downward, so every frame's base is the upper end of its occupied
    /// range: the innermost candidate for a query is the frame with the
    /// smallest base strictly above it. The chain is ordered by strictly
    /// descending base, which makes that a binary search; the explicit
    /// containment check afterwards guards against a query landing between
    /// two frames, in territory not covered by either.
    fn find_frame(&self, address: StackAddress) -> Option<&LiveStackFrame> {
        let index = self.frames.partition_point(|frame| frame.base() > address);
        let candidate = self.frames[..index].last()?;
        candidate.range().contains(address).then_some(candidate)
    }

    /// Applies the tail-jump frame-collapse rule after a stack-pointer move.
    ///
    /// The rule keys on the raw pointer `value`, not the stored extent: a
    /// retreat past the current frame's own base that lands exactly on the
    /// parent's base means an intermediate activation was discarded by a
    /// non-standard epilogue, and that parent will never see its return
    /// event. At most one ancestor level is removed per update.
    fn collapse_discarded_parent(&mut self, value: StackAddress) {
        let depth = self.frames.len();
        if depth < 2 {
            return;
        }

        let current = &self.frames[depth - 1];
        let parent = &self.frames[depth - 2];
        if value > current.base() && value == parent.base() {
            self.frames.remove(depth - 2);
        }
    }
}
