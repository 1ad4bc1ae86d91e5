//! End-to-end stack-frame recovery tests.
//!
//! These tests replay small synthetic traces through the public API, the way
//! the dynamic instrumentation engine would drive a real session:
//! 1. Construct a [`CallStack`] for the trace
//! 2. Deliver call/return/pointer/write events in execution order
//! 3. Query containment between events
//! 4. Export [`FrameData`] snapshots and check them against the trace

use stackscope::{
    CallStack, CodeAddress, Error, FrameData, FrameId, FunctionAddress, PointerRecord, Result,
    StackAddress, StackFrame,
};

fn function(address: u64) -> FunctionAddress {
    FunctionAddress::new(address)
}

fn code(address: u64) -> CodeAddress {
    CodeAddress::new(address)
}

fn stack(address: u64) -> StackAddress {
    StackAddress::new(address)
}

/// Find the exported snapshot for one call site.
fn exported<'d>(data: &'d [FrameData], id: &FrameId) -> &'d FrameData {
    data.iter()
        .find(|frame| frame.id == *id)
        .expect("snapshot missing for frame id")
}

#[test]
fn test_single_call_scenario() -> Result<()> {
    // call f at call site 0x100 with top = 0x1000, then a stack-pointer
    // update at instruction 0x104 to 0x0FE0.
    let mut engine = CallStack::new();
    engine.record_call(function(0xF000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x104), stack(0x0FE0));
    engine.record_return(function(0xF000))?;

    let data = engine.data();
    assert_eq!(data.len(), 1);

    let frame = exported(&data, &FrameId::new(function(0xF000), code(0x100)));
    assert_eq!(
        frame.stack_pointer_offsets,
        vec![PointerRecord::new(code(0x104), (-32).into())]
    );
    assert!(frame.frame_pointer_offsets.is_empty());
    Ok(())
}

#[test]
fn test_nested_calls_attribute_to_innermost_frame() -> Result<()> {
    let mut engine = CallStack::new();

    // Pre-call stack pointer anchors the whole-program stack base.
    engine.record_stack_pointer_update(code(0x50), stack(0x2000));
    assert_eq!(engine.stack_base(), Some(stack(0x2000)));

    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0FC0));
    engine.record_frame_pointer_update(code(0x4008), stack(0x0FF8));

    engine.record_call(function(0x5000), code(0x4020), stack(0x0F00))?;
    engine.record_stack_pointer_update(code(0x5004), stack(0x0EE0));
    engine.record_return(function(0x5000))?;

    engine.record_stack_pointer_update(code(0x4030), stack(0x0FA0));
    engine.record_return(function(0x4000))?;

    let data = engine.data();
    assert_eq!(data.len(), 2);

    let outer = exported(&data, &FrameId::new(function(0x4000), code(0x100)));
    assert_eq!(
        outer.stack_pointer_offsets,
        vec![
            PointerRecord::new(code(0x4004), (-64).into()),
            PointerRecord::new(code(0x4030), (-96).into()),
        ]
    );
    assert_eq!(
        outer.frame_pointer_offsets,
        vec![PointerRecord::new(code(0x4008), (-8).into())]
    );

    // The callee's offsets are relative to its own base, not the caller's.
    let inner = exported(&data, &FrameId::new(function(0x5000), code(0x4020)));
    assert_eq!(
        inner.stack_pointer_offsets,
        vec![PointerRecord::new(code(0x5004), (-32).into())]
    );
    Ok(())
}

#[test]
fn test_containment_tracks_live_frames() -> Result<()> {
    let mut engine = CallStack::new();

    // Nothing is stack territory before the first call.
    assert!(!engine.points_to_stack(stack(0x0FF0)));

    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0FE0));

    assert!(engine.points_to_stack(stack(0x0FE0)));
    assert!(engine.points_to_stack(stack(0x0FFF)));
    assert!(!engine.points_to_stack(stack(0x1000)));
    assert!(!engine.points_to_stack(stack(0x0FDF)));

    // After the return the frame's territory is gone again.
    engine.record_return(function(0x4000))?;
    assert!(!engine.points_to_stack(stack(0x0FF0)));
    Ok(())
}

#[test]
fn test_memory_writes_correlate_per_frame() -> Result<()> {
    let mut engine = CallStack::new();
    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0F80));
    engine.record_call(function(0x5000), code(0x4020), stack(0x0F00))?;
    engine.record_stack_pointer_update(code(0x5004), stack(0x0EC0));

    let outer = FrameId::new(function(0x4000), code(0x100));
    let inner = FrameId::new(function(0x5000), code(0x4020));

    assert_eq!(engine.record_memory_write(code(0x5008), stack(0x0FC0)), Some(outer));
    assert_eq!(engine.record_memory_write(code(0x5008), stack(0x0ED0)), Some(inner));
    assert_eq!(engine.record_memory_write(code(0x5008), stack(0x3000)), None);
    Ok(())
}

#[test]
fn test_nesting_violation_aborts_session() -> Result<()> {
    let mut engine = CallStack::new();
    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0F00));

    let result = engine.record_call(function(0x5000), code(0x4020), stack(0x0F80));
    match result {
        Err(Error::FrameNesting {
            function: target,
            call_site,
            top,
        }) => {
            assert_eq!(target, function(0x5000));
            assert_eq!(call_site, code(0x4020));
            assert_eq!(top, stack(0x0F80));
        }
        other => panic!("expected FrameNesting, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_return_mismatch_aborts_session() -> Result<()> {
    let mut engine = CallStack::new();
    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_call(function(0x5000), code(0x4020), stack(0x0F00))?;

    assert!(matches!(
        engine.record_return(function(0x4000)),
        Err(Error::ReturnMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_tail_jump_discards_intermediate_frame() -> Result<()> {
    let mut engine = CallStack::new();

    // outer calls f; f tail-jumps into g, which the instrumentation reports
    // as a call; g's epilogue then retreats the stack pointer past g's own
    // base onto f's base. f's return event will never arrive.
    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0FC0));
    engine.record_call(function(0x5000), code(0x4020), stack(0x0F80))?;
    engine.record_stack_pointer_update(code(0x5004), stack(0x0F40));
    engine.record_call(function(0x6000), code(0x5030), stack(0x0F00))?;
    engine.record_stack_pointer_update(code(0x6004), stack(0x0EC0));
    assert_eq!(engine.depth(), 3);
    assert!(engine.points_to_stack(stack(0x0F60)));

    // The qualifying retreat splices f (base 0x0F80) out of the chain.
    engine.record_stack_pointer_update(code(0x6020), stack(0x0F80));
    assert_eq!(engine.depth(), 2);

    // f's territory is released with it, while queries inside the surviving
    // innermost frame's reached range still resolve.
    assert!(!engine.points_to_stack(stack(0x0F60)));
    assert!(engine.points_to_stack(stack(0x0ED0)));

    // A return for the spliced function is now a mismatch...
    assert!(matches!(
        engine.record_return(function(0x5000)),
        Err(Error::ReturnMismatch { .. })
    ));

    // ...while the innermost frame still returns cleanly, straight to outer.
    // (The mismatch check mutated nothing.)
    engine.record_return(function(0x6000))?;
    assert_eq!(engine.depth(), 1);
    assert!(engine.points_to_stack(stack(0x0FE0)));
    engine.record_return(function(0x4000))?;
    assert_eq!(engine.depth(), 0);

    // The spliced frame's persisted model survives; only the live frame died.
    assert_eq!(engine.data().len(), 3);
    Ok(())
}

#[test]
fn test_export_round_trip_is_set_equal() -> Result<()> {
    let mut engine = CallStack::new();
    engine.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0FC0));
    engine.record_frame_pointer_update(code(0x4008), stack(0x0FF8));
    engine.record_stack_pointer_update(code(0x4010), stack(0x0F80));
    engine.record_return(function(0x4000))?;

    for original in engine.data() {
        let json = serde_json::to_string(&original).expect("serialization failed");
        let reloaded: FrameData = serde_json::from_str(&json).expect("deserialization failed");
        let reexported = StackFrame::from(reloaded).as_data();
        assert_eq!(reexported, original);
    }
    Ok(())
}

#[test]
fn test_cross_session_merge_through_snapshots() -> Result<()> {
    // Two independent sessions over the same binary observe different depths
    // for the same call site.
    let mut first = CallStack::new();
    first.record_call(function(0x4000), code(0x100), stack(0x1000))?;
    first.record_stack_pointer_update(code(0x4004), stack(0x0FE0));
    first.record_return(function(0x4000))?;

    let mut second = CallStack::new();
    second.record_call(function(0x4000), code(0x100), stack(0x9000))?;
    second.record_stack_pointer_update(code(0x4004), stack(0x8FE0));
    second.record_stack_pointer_update(code(0x4010), stack(0x8FC0));
    second.record_return(function(0x4000))?;

    // An external collaborator merges by reloading one export and feeding it
    // the records of the other.
    let mut merged = StackFrame::from(first.data().remove(0));
    for record in &second.data()[0].stack_pointer_offsets {
        merged.record_stack_pointer_update(record.instruction_address, record.byte_offset);
    }

    // Base-relative offsets make the sessions agree on the common extent,
    // so the union has two entries, not three.
    let extents: Vec<_> = merged.stack_pointer_offsets().collect();
    assert_eq!(
        extents,
        vec![
            PointerRecord::new(code(0x4004), (-32).into()),
            PointerRecord::new(code(0x4010), (-64).into()),
        ]
    );
    Ok(())
}

#[test]
fn test_recursive_calls_share_one_model() -> Result<()> {
    let mut engine = CallStack::new();

    // Two recursive activations of the same call site, different depths.
    engine.record_call(function(0x4000), code(0x4020), stack(0x1000))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0FC0));
    engine.record_call(function(0x4000), code(0x4020), stack(0x0F80))?;
    engine.record_stack_pointer_update(code(0x4004), stack(0x0F40));
    engine.record_return(function(0x4000))?;
    engine.record_return(function(0x4000))?;

    let data = engine.data();
    assert_eq!(data.len(), 1);

    // Both activations recorded the same base-relative extent once.
    let frame = exported(&data, &FrameId::new(function(0x4000), code(0x4020)));
    assert_eq!(
        frame.stack_pointer_offsets,
        vec![PointerRecord::new(code(0x4004), (-64).into())]
    );
    Ok(())
}
