//! Integration tests for the safe client: batching, routing, containment.

use futures_lite::future::block_on;

use crate::mock_transport::MockTransport;
use ultra_client::connection::{API_VERSION, ConnectionError, ConnectionStatus, check_compatibility};
use ultra_client::error::Error;
use ultra_client::load::VimSource;
use ultra_client::rpc::client::op;
use ultra_client::rpc::safe_client::SafeClient;
use ultra_client::rpc::types::{Box3, INVALID_HANDLE, Rgba32, Segment, Vector3};
use ultra_client::visibility::VisibilityState;

fn client(batch_size: usize) -> SafeClient<MockTransport> {
    SafeClient::with_batch_size(MockTransport::new(), batch_size)
}

fn mock(c: &SafeClient<MockTransport>) -> &MockTransport {
    c.rpc().transport()
}

fn unit_box(offset: f32) -> Box3 {
    Box3::new(
        Vector3::new(offset, 0.0, 0.0),
        Vector3::new(offset + 1.0, 1.0, 1.0),
    )
}

// ── Batching ──────────────────────────────────────────────────

#[test]
fn visibility_batches_into_equal_sub_calls() {
    let c = client(100);
    let indices: Vec<u32> = (0..200).collect();
    c.set_visibility_elements(4, &indices, VisibilityState::HIDDEN);

    let calls = mock(&c).calls_to(op::SET_STATE_ELEMENTS);
    assert_eq!(calls.len(), 2);
    for (n, call) in calls.iter().enumerate() {
        let mut args = call.args();
        assert_eq!(args.read_u32().unwrap(), 4);
        let part = args.read_array::<u32>().unwrap();
        assert_eq!(part.len(), 100);
        assert_eq!(part[0], n as u32 * 100);
        assert_eq!(args.read_u32().unwrap(), VisibilityState::HIDDEN.to_wire());
    }
}

#[test]
fn element_bounds_are_unioned_across_batches() {
    let c = client(3);
    mock(&c).reply(op::GET_AABB_FOR_ELEMENTS, &unit_box(0.0));
    mock(&c).reply(op::GET_AABB_FOR_ELEMENTS, &unit_box(5.0));

    let b = block_on(c.get_aabb_for_elements(1, &[0, 1, 2, 3, 4, 5])).unwrap();
    assert_eq!(b, unit_box(0.0).union(&unit_box(5.0)));
    assert_eq!(mock(&c).calls_to(op::GET_AABB_FOR_ELEMENTS).len(), 2);
}

#[test]
fn material_handles_reconstructed_per_position() {
    let c = client(2);
    mock(&c).reply(op::CREATE_MATERIAL_INSTANCES, &10u32);
    mock(&c).reply(op::CREATE_MATERIAL_INSTANCES, &50u32);

    let colors = [Rgba32(1), Rgba32(2), Rgba32(3)];
    let handles = block_on(c.create_material_instances(0.5, &colors));
    assert_eq!(handles, vec![10, 11, 50]);
}

#[test]
fn material_overrides_split_in_lock_step() {
    let c = client(2);
    c.set_material_overrides(1, &[0, 1, 2], &[7, 8, 9]);

    let calls = mock(&c).calls_to(op::SET_MATERIAL_OVERRIDES);
    assert_eq!(calls.len(), 2);
    let mut last = calls[1].args();
    last.read_u32().unwrap();
    assert_eq!(last.read_array::<u32>().unwrap(), vec![2]);
    assert_eq!(last.read_array::<u32>().unwrap(), vec![9]);
}

#[test]
fn oversized_frame_elements_frames_the_union_box() {
    let c = client(2);
    mock(&c).reply(op::GET_AABB_FOR_ELEMENTS, &unit_box(0.0));
    mock(&c).reply(op::GET_AABB_FOR_ELEMENTS, &unit_box(2.0));
    let framed = Segment::new(Vector3::new(0.0, -5.0, 0.0), Vector3::new(1.5, 0.5, 0.5));
    mock(&c).reply(op::FRAME_BOX, &framed);

    let seg = block_on(c.frame_elements(1, &[0, 1, 2, 3], 0.5)).unwrap();
    assert_eq!(seg, framed);
    assert!(mock(&c).calls_to(op::FRAME_ELEMENTS).is_empty());

    let calls = mock(&c).calls_to(op::FRAME_BOX);

    let mut args = calls[0].args();
    let framed_box: Box3 = args.read().unwrap();
    assert_eq!(framed_box, unit_box(0.0).union(&unit_box(2.0)));
}

// ── Load routing ──────────────────────────────────────────────

#[test]
fn file_source_uses_path_call() {
    let c = client(10);
    mock(&c).reply(op::LOAD_VIM, &2u32);
    let handle = block_on(c.load_source(&VimSource::new("file:///models/a.vim")));
    assert_eq!(handle, 2);

    let calls = mock(&c).calls_to(op::LOAD_VIM);

    let mut args = calls[0].args();
    assert_eq!(args.read_string().unwrap(), "file://models/a.vim");
}

#[test]
fn url_source_forwards_token_or_empty() {
    let c = client(10);
    mock(&c).reply_always(op::LOAD_VIM_URL, &5u32);

    block_on(c.load_source(&VimSource::new("https://h/a.vim").with_auth_token("secret")));
    block_on(c.load_source(&VimSource::new("https://h/b.vim")));

    let calls = mock(&c).calls_to(op::LOAD_VIM_URL);
    let mut first = calls[0].args();
    first.read_string().unwrap();
    assert_eq!(first.read_string().unwrap(), "secret");
    let mut second = calls[1].args();
    second.read_string().unwrap();
    assert_eq!(second.read_string().unwrap(), "");
}

#[test]
fn invalid_handle_reply_becomes_sentinel() {
    let c = client(10);
    mock(&c).reply(op::LOAD_VIM_URL, &INVALID_HANDLE);
    let result = block_on(c.try_load_vim_url("https://h/a.vim", ""));
    assert!(matches!(result, Err(Error::Rejected(_))));

    mock(&c).reply(op::LOAD_VIM_URL, &INVALID_HANDLE);
    assert_eq!(block_on(c.load_vim_url("https://h/a.vim", "")), INVALID_HANDLE);
}

// ── Containment ───────────────────────────────────────────────

#[test]
fn missing_reply_is_contained() {
    let c = client(10);
    assert!(matches!(
        block_on(c.try_get_aabb_for_all()),
        Err(Error::Transport(_))
    ));
    assert!(block_on(c.get_aabb_for_all()).is_none());
    assert_eq!(block_on(c.get_element_count(1)), 0);
}

#[test]
fn malformed_reply_is_marshal_error() {
    let c = client(10);
    mock(&c).reply(op::GET_ELEMENT_COUNT_FOR_VIM, &[1u32, 2u32][..]);
    assert!(matches!(
        block_on(c.try_get_element_count(1)),
        Err(Error::Marshal(_))
    ));
}

#[test]
fn invalid_input_writes_nothing() {
    let c = client(10);
    c.set_visibility_elements(1, &[], VisibilityState::HIDDEN);
    c.set_visibility_vim(INVALID_HANDLE, VisibilityState::HIDDEN);
    c.set_camera_position(
        Segment::new(Vector3::new(f32::NAN, 0.0, 0.0), Vector3::default()),
        0.0,
    );
    c.set_aspect_ratio(0, 10);
    assert!(mock(&c).calls().is_empty());
}

#[test]
fn disconnected_client_writes_nothing() {
    let c = client(10);
    mock(&c).set_connected(false);
    c.clear_scene();
    assert_eq!(c.try_clear_scene(), Err(Error::NotConnected));
    assert!(mock(&c).calls().is_empty());
}

#[test]
fn settings_are_clamped_before_sending() {
    let c = client(10);
    c.set_camera_speed(-3.0);
    let calls = mock(&c).calls_to(op::SET_CAMERA_SPEED);
    let mut args = calls[0].args();
    assert_eq!(args.read_f32().unwrap(), 0.0);
}

// ── Handshake ─────────────────────────────────────────────────

#[test]
fn version_handshake() {
    let c = client(10);
    mock(&c).reply(op::GET_API_VERSION, API_VERSION);
    assert_eq!(block_on(check_compatibility(&c)), ConnectionStatus::Connected);

    mock(&c).reply(op::GET_API_VERSION, "5.0.0");
    assert_eq!(
        block_on(check_compatibility(&c)),
        ConnectionStatus::Error(ConnectionError::Compatibility {
            client: API_VERSION.into(),
            server: "5.0.0".into(),
        })
    );

    // No reply scripted: the stream error is tagged, not thrown.
    assert!(matches!(
        block_on(check_compatibility(&c)),
        ConnectionStatus::Error(ConnectionError::Stream(_))
    ));
}
