use thiserror::Error;

use crate::address::{CodeAddress, FunctionAddress, StackAddress};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant represents a fatal trace-consistency violation: the event
/// stream delivered by the instrumentation engine is corrupt or was
/// misinterpreted upstream (for example, a library call reached through an
/// unexpected control-flow edge). There is no safe local recovery from any of
/// them, since every subsequent frame-base computation depends on the violated
/// invariant; the session must be abandoned and the exported model discarded.
///
/// Conditions that are *expected* to occur - containment queries and
/// write-correlation lookups that find no matching frame - are never reported
/// through this type. They surface as `Option`/`bool` results instead.
///
/// # Examples
///
/// ```rust
/// use stackscope::{CallStack, CodeAddress, Error, FunctionAddress, StackAddress};
///
/// let mut stack = CallStack::new();
/// stack.record_call(
///     FunctionAddress::new(0x4000),
///     CodeAddress::new(0x100),
///     StackAddress::new(0x1000),
/// )?;
///
/// // A return from a function that is not the innermost frame is fatal.
/// match stack.record_return(FunctionAddress::new(0x5000)) {
///     Err(Error::ReturnMismatch { expected, actual }) => {
///         eprintln!("corrupt trace: expected return from {}, saw {}", expected, actual);
///     }
///     other => panic!("expected a fatal consistency error, got {:?}", other),
/// }
/// # Ok::<(), stackscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A recorded call's stack top overlaps an already-active frame's territory.
    ///
    /// Stack frames must nest monotonically: every new call has to push the
    /// stack strictly deeper than anything the currently-active frames have
    /// touched. A call whose `top` lands at or above the innermost frame's
    /// occupied range means the trace is corrupt or the stack-pointer events
    /// were misattributed.
    #[error("call to {function} from {call_site} has stack top {top} inside an active frame")]
    FrameNesting {
        /// Entry address of the called function.
        function: FunctionAddress,
        /// Instruction address the call was issued from.
        call_site: CodeAddress,
        /// The offending stack top recorded for the call.
        top: StackAddress,
    },

    /// A recorded return does not match the innermost active frame.
    ///
    /// The function address carried by the return event must equal the
    /// function address of the frame the engine currently considers innermost.
    /// A mismatch means calls and returns in the trace no longer pair up.
    #[error("return from {actual} does not match innermost frame of {expected}")]
    ReturnMismatch {
        /// Function address of the innermost active frame.
        expected: FunctionAddress,
        /// Function address carried by the return event.
        actual: FunctionAddress,
    },

    /// A return was recorded while no call was active.
    ///
    /// Only the sentinel root exists at depth 0; there is no frame a return
    /// could match against.
    #[error("return from {function} recorded with no active frame")]
    ReturnWithoutCall {
        /// Function address carried by the return event.
        function: FunctionAddress,
    },
}
