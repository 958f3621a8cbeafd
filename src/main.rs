//! ultra-probe: connect, check the API version, load a scene and report on it.
//!
//! ```text
//! ultra-probe [config.json] <url> [auth_token]
//!
//!   TcpTransport ──▶ SafeClient ──▶ check_compatibility
//!                                   LoadRequest::run  ⇄  progress stream
//!                                   element count, bounding box
//!                                   unload
//! ```
//!
//! Log level via `RUST_LOG` (default `info`).
#![deny(unused_must_use)]

use anyhow::{Context, Result, bail};
use futures_lite::StreamExt;
use futures_lite::future;
use log::{info, warn};

use ultra_client::adapters::tcp_transport::TcpTransport;
use ultra_client::config::ClientConfig;
use ultra_client::connection::{ConnectionStatus, check_compatibility};
use ultra_client::load::{LoadRequest, ReactorDelay, VimSource};
use ultra_client::rpc::safe_client::SafeClient;

struct Args {
    config: ClientConfig,
    source: VimSource,
}

fn parse_args() -> Result<Args> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = if args.first().is_some_and(|a| a.ends_with(".json")) {
        let path = args.remove(0);
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        ClientConfig::from_json(&text).with_context(|| format!("parsing {path}"))?
    } else {
        ClientConfig::default()
    };

    let mut rest = args.into_iter();
    let Some(url) = rest.next() else {
        bail!("usage: ultra-probe [config.json] <url> [auth_token]");
    };
    let mut source = VimSource::new(url);
    if let Some(token) = rest.next() {
        source = source.with_auth_token(token);
    }
    Ok(Args { config, source })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Args { config, source } = parse_args()?;
    info!("ultra-probe: {} via {}", source.url, config.server_address);

    let transport = TcpTransport::connect(&config.server_address)?;
    let client = SafeClient::with_batch_size(transport, config.batch_size);

    future::block_on(async {
        match check_compatibility(&client).await {
            ConnectionStatus::Connected => {}
            ConnectionStatus::Error(e) => bail!("{e}"),
            other => bail!("server not ready: {other:?}"),
        }

        let request =
            LoadRequest::new(source).with_poll_interval(config.load_poll_interval());
        let mut progress = request.progress_stream();
        let report = async {
            while let Some(p) = progress.next().await {
                println!("progress {:>5.1}%", p * 100.0);
            }
        };
        let (scene, ()) = future::zip(request.run(&client, &ReactorDelay), report).await;
        let scene = scene.context("loading scene")?;

        println!("handle        {}", scene.handle);
        println!("elements      {}", scene.element_count);
        match client.get_aabb_for_vim(scene.handle).await {
            Some(b) => println!(
                "bounds        ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
            ),
            None => warn!("no bounding box reported"),
        }

        client.unload_vim(scene.handle);
        Ok(())
    })
}
