//! Integration tests for the load request state machine.

use std::time::Duration;

use futures_lite::StreamExt;
use futures_lite::future::{self, block_on};

use crate::mock_transport::MockTransport;
use ultra_client::load::{Delay, LoadErrorKind, LoadPhase, LoadRequest, VimSource};
use ultra_client::rpc::client::op;
use ultra_client::rpc::safe_client::SafeClient;
use ultra_client::rpc::types::{INVALID_HANDLE, VimLoadingState, VimLoadingStatus};

/// Yields once instead of sleeping.
struct YieldDelay;

impl Delay for YieldDelay {
    async fn delay(&self, _duration: Duration) {
        future::yield_now().await;
    }
}

fn status(state: VimLoadingState, progress: f32) -> VimLoadingStatus {
    VimLoadingStatus { state, progress }
}

fn request(url: &str) -> LoadRequest {
    LoadRequest::new(VimSource::new(url)).with_poll_interval(Duration::from_millis(1))
}

fn client() -> SafeClient<MockTransport> {
    SafeClient::new(MockTransport::new())
}

#[test]
fn successful_load_reports_progress_and_count() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Downloading, 0.1));
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Downloading, 0.6));
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Done, 1.0));
    mock.reply(op::GET_ELEMENT_COUNT_FOR_VIM, &1234u32);

    let req = request("https://host/a.vim");
    let progress = req.progress_stream();
    let (scene, values) = block_on(future::zip(
        req.run(&c, &YieldDelay),
        progress.collect::<Vec<f32>>(),
    ));

    let scene = scene.unwrap();
    assert_eq!(scene.handle, 4);
    assert_eq!(scene.element_count, 1234);
    assert_eq!(values, vec![0.1, 0.6]);
    assert_eq!(req.phase(), LoadPhase::Done);
    assert_eq!(req.handle(), Some(4));
}

#[test]
fn remote_failure_carries_last_error() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Loading, 0.0));
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::FailedToLoad, 0.0));
    mock.reply(op::GET_LAST_ERROR, "corrupt header");

    let req = request("https://host/a.vim");
    let err = block_on(req.run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::LoadingError);
    assert_eq!(err.details, "corrupt header");
    assert_eq!(req.phase(), LoadPhase::Failed(LoadErrorKind::LoadingError));
    assert_eq!(req.error(), Some(err));
}

#[test]
fn download_failure_is_distinguished() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::FailedToDownload, 0.0));
    mock.reply(op::GET_LAST_ERROR, "404");

    let err = block_on(request("https://host/a.vim").run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::DownloadingError);
    assert_eq!(err.details, "404");
}

#[test]
fn abort_stops_polling() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply_always(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Downloading, 0.1));

    let req = request("https://host/a.vim");
    let mut progress = req.progress_stream();
    let consumer = async {
        let first = progress.next().await;
        assert!(req.abort());
        first
    };
    let (result, first) = block_on(future::zip(req.run(&c, &YieldDelay), consumer));

    assert_eq!(first, Some(0.1));
    assert_eq!(result.unwrap_err().kind, LoadErrorKind::Cancelled);
    assert_eq!(req.phase(), LoadPhase::Cancelled);
    assert_eq!(mock.calls_to(op::GET_VIM_LOADING_STATE).len(), 1);
    assert!(!req.abort());
}

#[test]
fn aborted_request_does_not_start() {
    let c = client();
    let req = request("https://host/a.vim");
    req.abort();
    let err = block_on(req.run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::Cancelled);
    assert!(c.rpc().transport().calls().is_empty());
}

#[test]
fn invalid_handle_is_unknown_failure() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &INVALID_HANDLE);
    mock.reply(op::GET_LAST_ERROR, "bad url");

    let err = block_on(request("https://host/a.vim").run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::Unknown);
    assert_eq!(err.details, "bad url");
    assert!(mock.calls_to(op::GET_VIM_LOADING_STATE).is_empty());
}

#[test]
fn disconnected_server_is_reported() {
    let c = client();
    c.rpc().transport().set_connected(false);
    let req = request("https://host/a.vim");
    let err = block_on(req.run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::ServerDisconnected);
    assert_eq!(req.phase(), LoadPhase::Failed(LoadErrorKind::ServerDisconnected));
}

#[test]
fn file_source_loads_by_path() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM, &1u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Done, 1.0));
    mock.reply(op::GET_ELEMENT_COUNT_FOR_VIM, &3u32);

    let scene = block_on(request("file:///data/a.vim").run(&c, &YieldDelay)).unwrap();
    assert_eq!(scene.element_count, 3);
    assert!(mock.calls_to(op::LOAD_VIM_URL).is_empty());
}

#[test]
fn abort_during_count_fetch_wins() {
    let c = client();
    let mock = c.rpc().transport();
    mock.set_yielding(true);
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Done, 1.0));
    mock.reply(op::GET_ELEMENT_COUNT_FOR_VIM, &10u32);

    let req = request("https://host/a.vim");
    let consumer = async {
        while mock.calls_to(op::GET_ELEMENT_COUNT_FOR_VIM).is_empty() {
            future::yield_now().await;
        }
        req.abort()
    };
    let (result, aborted) = block_on(future::zip(req.run(&c, &YieldDelay), consumer));

    assert!(aborted);
    assert_eq!(result.unwrap_err().kind, LoadErrorKind::Cancelled);
    assert_eq!(req.phase(), LoadPhase::Cancelled);
}

#[test]
fn abort_during_error_fetch_wins() {
    let c = client();
    let mock = c.rpc().transport();
    mock.set_yielding(true);
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::FailedToLoad, 0.0));
    mock.reply(op::GET_LAST_ERROR, "corrupt header");

    let req = request("https://host/a.vim");
    let consumer = async {
        while mock.calls_to(op::GET_LAST_ERROR).is_empty() {
            future::yield_now().await;
        }
        req.abort()
    };
    let (result, aborted) = block_on(future::zip(req.run(&c, &YieldDelay), consumer));

    assert!(aborted);
    assert_eq!(result.unwrap_err().kind, LoadErrorKind::Cancelled);
    assert_eq!(req.phase(), LoadPhase::Cancelled);
    assert!(req.error().is_none());
}

#[test]
fn failed_count_fetch_fails_the_load() {
    let c = client();
    let mock = c.rpc().transport();
    mock.reply(op::LOAD_VIM_URL, &4u32);
    mock.reply(op::GET_VIM_LOADING_STATE, &status(VimLoadingState::Done, 1.0));

    let req = request("https://host/a.vim");
    let err = block_on(req.run(&c, &YieldDelay)).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::Unknown);
    assert_eq!(req.phase(), LoadPhase::Failed(LoadErrorKind::Unknown));
    assert_eq!(req.handle(), Some(4));
}
