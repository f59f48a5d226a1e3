//! `dlc fetch` – download URLs concurrently through one coordinator.

use anyhow::Result;
use dlc_core::config::DlcConfig;
use dlc_core::transfer::CurlTransfer;
use dlc_core::{
    AggregateState, Coordinator, CoordinatorOptions, Destination, RequestCallbacks, StartOutcome,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;

#[derive(Debug)]
pub struct FetchArgs {
    pub urls: Vec<String>,
    pub dir: PathBuf,
    pub overwrite: bool,
    pub json: bool,
}

pub async fn run_fetch(cfg: &DlcConfig, args: FetchArgs) -> Result<i32> {
    let coordinator = Coordinator::new(
        Arc::new(CurlTransfer::new(cfg.curl.clone())),
        CoordinatorOptions::from(cfg),
    );
    let mut sub = coordinator.subscribe();
    let dest = Destination::new(&args.dir);
    let failures = Arc::new(AtomicUsize::new(0));

    let mut started = 0usize;
    for url in &args.urls {
        if !args.overwrite && coordinator.exists(url, &dest) {
            println!("{}: already downloaded, skipping", url);
            continue;
        }
        let failures_cb = Arc::clone(&failures);
        let label = url.clone();
        let callbacks = RequestCallbacks::new().on_completion(move |ok| {
            if ok {
                tracing::info!(url = %label, "download finished");
            } else {
                tracing::warn!(url = %label, "download failed");
                failures_cb.fetch_add(1, Ordering::SeqCst);
            }
        });
        match coordinator.start(url, &dest, callbacks) {
            Ok(StartOutcome::Started { key, .. }) => {
                started += 1;
                tracing::debug!(%key, "queued {}", url);
            }
            Ok(StartOutcome::Joined { key, .. }) => {
                println!("{}: already in flight as {}", url, key);
            }
            Err(e) => {
                eprintln!("{}: {}", url, e);
                failures.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    let json = args.json;
    let printer = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(state) = sub.recv().await {
            if json {
                match serde_json::to_string(&state) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("could not encode state: {}", e),
                }
                continue;
            }
            let due = last_print
                .map_or(true, |t| t.elapsed().as_millis() as u64 >= PROGRESS_INTERVAL_MS);
            match state {
                AggregateState::InProgress(_) if due => {
                    println!("  {:.1}%", state.fraction() * 100.0);
                    last_print = Some(Instant::now());
                }
                AggregateState::Success => println!("  done"),
                _ => {}
            }
        }
    });

    coordinator.wait_idle().await;
    // Dropping the last coordinator handle closes the subscription so the printer drains and exits.
    drop(coordinator);
    let _ = printer.await;

    let failed = failures.load(Ordering::SeqCst);
    if failed > 0 {
        anyhow::bail!("{} of {} download(s) failed", failed, args.urls.len());
    }
    tracing::info!("fetch completed {} download(s)", started);
    Ok(0)
}
