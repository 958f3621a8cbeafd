//! Integration tests for a loaded scene: flush, reload, selection.

use std::rc::Rc;
use std::time::Duration;

use futures_lite::future::{self, block_on};

use crate::mock_transport::MockTransport;
use ultra_client::color::ColorPalette;
use ultra_client::load::{Delay, LoadRequest, LoadedScene, VimSource};
use ultra_client::rpc::client::op;
use ultra_client::rpc::safe_client::SafeClient;
use ultra_client::rpc::types::{Box3, Rgba32, Vector3, VimLoadingState, VimLoadingStatus};
use ultra_client::selection::Selection;
use ultra_client::sync::ManualFrameScheduler;
use ultra_client::vim::{ElementOutliner, Vim};
use ultra_client::visibility::VisibilityState;

const RED: Rgba32 = Rgba32(0xFF00_00FF);

struct YieldDelay;

impl Delay for YieldDelay {
    async fn delay(&self, _duration: Duration) {
        future::yield_now().await;
    }
}

fn setup() -> (SafeClient<MockTransport>, Vim) {
    let vim = Vim::new(
        VimSource::new("https://host/a.vim"),
        LoadedScene {
            handle: 1,
            element_count: 10,
        },
        Rc::new(ManualFrameScheduler::new()),
    );
    (SafeClient::new(MockTransport::new()), vim)
}

#[test]
fn flush_sends_visibility_before_colour() {
    let (client, mut vim) = setup();
    let mock = client.rpc().transport();
    mock.reply(op::CREATE_MATERIAL_INSTANCES, &20u32);

    vim.set_visibility(&[2], VisibilityState::HIDDEN);
    vim.set_color(&[3], Some(RED));
    let mut palette = ColorPalette::default();
    let (vis, col) = block_on(vim.flush(&client, &mut palette));

    assert_eq!((vis.groups, col.groups), (1, 1));
    assert_eq!(
        mock.ops(),
        vec![
            op::SET_STATE_ELEMENTS,
            op::CREATE_MATERIAL_INSTANCES,
            op::SET_MATERIAL_OVERRIDES,
        ]
    );
    assert!(!vim.needs_flush());
}

#[test]
fn reload_adopts_new_handle_and_resends_state() {
    let (client, mut vim) = setup();
    let mock = client.rpc().transport();
    mock.reply_always(op::CREATE_MATERIAL_INSTANCES, &20u32);

    vim.set_visibility_all(VisibilityState::GHOSTED);
    vim.set_visibility(&[2], VisibilityState::VISIBLE);
    vim.set_color(&[3], Some(RED));
    let mut palette = ColorPalette::default();
    block_on(vim.flush(&client, &mut palette));
    mock.clear();

    mock.reply(op::LOAD_VIM_URL, &8u32);
    mock.reply(
        op::GET_VIM_LOADING_STATE,
        &VimLoadingStatus {
            state: VimLoadingState::Done,
            progress: 1.0,
        },
    );
    mock.reply(op::GET_ELEMENT_COUNT_FOR_VIM, &10u32);
    let request = LoadRequest::new(vim.source().clone());
    block_on(vim.reload(&client, request, &YieldDelay)).unwrap();
    assert_eq!(vim.handle(), 8);
    assert!(vim.needs_flush());

    mock.clear();
    palette.invalidate();
    block_on(vim.flush(&client, &mut palette));

    let default_calls = mock.calls_to(op::SET_STATE_VIM);

    let mut default = default_calls[0].args();
    assert_eq!(default.read_u32().unwrap(), 8);
    assert_eq!(default.read_u32().unwrap(), VisibilityState::GHOSTED.to_wire());

    let visible_calls = mock.calls_to(op::SET_STATE_ELEMENTS);

    let mut visible = visible_calls[0].args();
    assert_eq!(visible.read_u32().unwrap(), 8);
    assert_eq!(visible.read_array::<u32>().unwrap(), vec![2]);

    let colour_calls = mock.calls_to(op::SET_MATERIAL_OVERRIDES);

    let mut colour = colour_calls[0].args();
    assert_eq!(colour.read_u32().unwrap(), 8);
    assert_eq!(colour.read_array::<u32>().unwrap(), vec![3]);
    assert_eq!(mock.calls_to(op::CREATE_MATERIAL_INSTANCES).len(), 1);
}

#[test]
fn selection_outlines_and_bounds_through_server() {
    let (client, mut vim) = setup();
    let mock = client.rpc().transport();
    let a = Box3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    let b = Box3::new(Vector3::new(4.0, 4.0, 4.0), Vector3::new(5.0, 5.0, 5.0));
    mock.reply(op::GET_AABB_FOR_ELEMENTS, &a);
    mock.reply(op::GET_AABB_FOR_ELEMENTS, &b);

    let mut selection: Selection<u32> = Selection::new();
    let bounds = {
        let mut outliner = ElementOutliner::new(&mut vim, &client);
        selection.select(&[4, 6], &mut outliner);
        block_on(selection.bounding_box(&outliner))
    };

    assert_eq!(bounds, Some(a.union(&b)));
    assert_eq!(mock.calls_to(op::GET_AABB_FOR_ELEMENTS).len(), 2);
    assert_eq!(vim.visibility(4), VisibilityState::HIGHLIGHTED);
    assert_eq!(vim.visibility(6), VisibilityState::HIGHLIGHTED);

    // Highlights travel with the next flush.
    mock.clear();
    block_on(vim.flush(&client, &mut ColorPalette::default()));
    let calls = mock.calls_to(op::SET_STATE_ELEMENTS);
    let mut args = calls[0].args();
    args.read_u32().unwrap();
    assert_eq!(args.read_array::<u32>().unwrap(), vec![4, 6]);
    assert_eq!(args.read_u32().unwrap(), VisibilityState::HIGHLIGHTED.to_wire());
}

#[test]
fn unload_releases_handle() {
    let (client, vim) = setup();
    vim.unload(&client);
    let calls = client.rpc().transport().calls_to(op::UNLOAD_VIM);
    let mut args = calls[0].args();
    assert_eq!(args.read_u32().unwrap(), 1);
}
