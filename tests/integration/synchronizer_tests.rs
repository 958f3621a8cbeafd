//! Integration tests for visibility and colour synchronisation over the
//! wire.

use std::rc::Rc;

use futures_lite::future::block_on;

use crate::mock_transport::MockTransport;
use ultra_client::color::{ColorPalette, ColorSink, ColorSynchronizer};
use ultra_client::rpc::client::op;
use ultra_client::rpc::safe_client::SafeClient;
use ultra_client::rpc::types::{INVALID_HANDLE, Rgba32};
use ultra_client::sync::ManualFrameScheduler;
use ultra_client::visibility::{VisibilitySink, VisibilityState, VisibilitySynchronizer};

const VIM: u32 = 9;
const RED: Rgba32 = Rgba32(0xFF00_00FF);
const BLUE: Rgba32 = Rgba32(0x0000_FFFF);

fn setup() -> (SafeClient<MockTransport>, Rc<ManualFrameScheduler>) {
    (
        SafeClient::new(MockTransport::new()),
        Rc::new(ManualFrameScheduler::new()),
    )
}

// ── Visibility ────────────────────────────────────────────────

#[test]
fn visibility_flush_emits_default_then_groups() {
    let (client, sched) = setup();
    let mut sync = VisibilitySynchronizer::new(VisibilityState::VISIBLE, sched.clone());

    sync.set_state_for_all(VisibilityState::GHOSTED);
    sync.set_state(3, VisibilityState::VISIBLE);
    sync.set_state(1, VisibilityState::VISIBLE);
    sync.set_state(2, VisibilityState::HIDDEN);
    assert_eq!(sched.requests(), 1);
    assert!(sched.take_frame());

    block_on(sync.flush(&mut VisibilitySink::new(&client, VIM)));

    let mock = client.rpc().transport();
    assert_eq!(
        mock.ops(),
        vec![op::SET_STATE_VIM, op::SET_STATE_ELEMENTS, op::SET_STATE_ELEMENTS]
    );
    let default_calls = mock.calls_to(op::SET_STATE_VIM);
    let mut default = default_calls[0].args();
    assert_eq!(default.read_u32().unwrap(), VIM);
    assert_eq!(default.read_u32().unwrap(), VisibilityState::GHOSTED.to_wire());

    let groups = mock.calls_to(op::SET_STATE_ELEMENTS);
    let mut first = groups[0].args();
    first.read_u32().unwrap();
    assert_eq!(first.read_array::<u32>().unwrap(), vec![1, 3]);
    assert_eq!(first.read_u32().unwrap(), VisibilityState::VISIBLE.to_wire());
}

#[test]
fn disconnected_flush_then_reapply_resends() {
    let (client, sched) = setup();
    let mut sync = VisibilitySynchronizer::new(VisibilityState::VISIBLE, sched);
    let mock = client.rpc().transport();

    mock.set_connected(false);
    sync.set_state(4, VisibilityState::HIDDEN);
    let report = block_on(sync.flush(&mut VisibilitySink::new(&client, VIM)));
    assert!(report.dropped);
    assert!(mock.calls().is_empty());

    mock.set_connected(true);
    sync.reapply_states();
    block_on(sync.flush(&mut VisibilitySink::new(&client, VIM)));
    assert_eq!(mock.ops(), vec![op::SET_STATE_ELEMENTS]);
}

// ── Colour ────────────────────────────────────────────────────

#[test]
fn colour_flush_creates_materials_once() {
    let (client, sched) = setup();
    let mock = client.rpc().transport();
    mock.reply(op::CREATE_MATERIAL_INSTANCES, &100u32);

    let mut sync = ColorSynchronizer::new(None, sched);
    let mut palette = ColorPalette::default();
    sync.set_state(1, Some(RED));
    sync.set_state(2, Some(BLUE));
    sync.set_state(3, Some(RED));

    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 10)));

    assert_eq!(mock.calls_to(op::CREATE_MATERIAL_INSTANCES).len(), 1);
    assert_eq!(palette.len(), 2);
    let overrides = mock.calls_to(op::SET_MATERIAL_OVERRIDES);
    assert_eq!(overrides.len(), 2);

    let mut red = overrides[0].args();
    red.read_u32().unwrap();
    assert_eq!(red.read_array::<u32>().unwrap(), vec![1, 3]);
    let materials = red.read_array::<u32>().unwrap();
    assert_eq!(materials, vec![palette.handle(RED).unwrap(); 2]);

    // Cached: a second flush with known colours creates nothing.
    mock.clear();
    sync.set_state(4, Some(BLUE));
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 10)));
    assert_eq!(mock.ops(), vec![op::SET_MATERIAL_OVERRIDES]);
}

#[test]
fn clearing_colours_uses_sentinel_and_clear_call() {
    let (client, sched) = setup();
    let mock = client.rpc().transport();
    mock.reply(op::CREATE_MATERIAL_INSTANCES, &7u32);

    let mut sync = ColorSynchronizer::new(None, sched);
    let mut palette = ColorPalette::default();
    sync.set_state(1, Some(RED));
    sync.set_state(2, Some(RED));
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 5)));
    mock.clear();

    sync.set_state(2, None);
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 5)));
    let calls = mock.calls_to(op::SET_MATERIAL_OVERRIDES);
    let mut args = calls[0].args();
    args.read_u32().unwrap();
    assert_eq!(args.read_array::<u32>().unwrap(), vec![2]);
    assert_eq!(args.read_array::<u32>().unwrap(), vec![INVALID_HANDLE]);

    mock.clear();
    sync.set_state_for_all(None);
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 5)));
    assert_eq!(mock.ops(), vec![op::CLEAR_MATERIAL_OVERRIDES]);
}

#[test]
fn coloured_default_covers_every_element() {
    let (client, sched) = setup();
    let mock = client.rpc().transport();
    mock.reply(op::CREATE_MATERIAL_INSTANCES, &30u32);

    let mut sync = ColorSynchronizer::new(None, sched);
    let mut palette = ColorPalette::default();
    sync.set_state_for_all(Some(BLUE));
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 4)));

    let calls = mock.calls_to(op::SET_MATERIAL_OVERRIDES);

    let mut args = calls[0].args();
    args.read_u32().unwrap();
    assert_eq!(args.read_array::<u32>().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(args.read_array::<u32>().unwrap(), vec![30; 4]);
}

#[test]
fn palette_invalidated_after_reconnect_recreates() {
    let (client, sched) = setup();
    let mock = client.rpc().transport();
    mock.reply_always(op::CREATE_MATERIAL_INSTANCES, &1u32);

    let mut sync = ColorSynchronizer::new(None, sched);
    let mut palette = ColorPalette::default();
    sync.set_state(0, Some(RED));
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 3)));

    palette.invalidate();
    sync.reapply_states();
    block_on(sync.flush(&mut ColorSink::new(&client, &mut palette, VIM, 3)));
    assert_eq!(mock.calls_to(op::CREATE_MATERIAL_INSTANCES).len(), 2);
    assert_eq!(mock.calls_to(op::SET_MATERIAL_OVERRIDES).len(), 2);
}
