use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use log::{trace, warn};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::checker::WebsiteChecker;
use crate::{CheckResult, LinkOccurrence, Outcome};

/// The unique URLs of a batch and the occurrences that reference them
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Batch {
    /// Unique URLs in order of first appearance
    pub(crate) urls: Vec<String>,
    /// Every occurrence of a URL, in input order
    pub(crate) occurrences: HashMap<String, Vec<LinkOccurrence>>,
}

/// Group occurrences by URL so that each URL is only checked once
pub(crate) fn dedupe(occurrences: Vec<LinkOccurrence>) -> Batch {
    let mut batch = Batch::default();
    for occurrence in occurrences {
        match batch.occurrences.get_mut(&occurrence.url) {
            Some(existing) => existing.push(occurrence),
            None => {
                batch.urls.push(occurrence.url.clone());
                batch
                    .occurrences
                    .insert(occurrence.url.clone(), vec![occurrence]);
            }
        }
    }
    batch
}

/// Start checking a batch in the background.
///
/// Three kinds of tasks are spawned:
/// - one dispatcher feeding unique URLs into a bounded job queue,
/// - `concurrency` workers, each checking one URL at a time,
/// - one fan-out task turning each finished URL into one result per
///   occurrence.
///
/// The returned stream ends once every worker is done, or early if the
/// batch is cancelled. URLs that were still queued at that point produce no
/// result.
///
/// Must be called from within a tokio runtime.
pub(crate) fn spawn(
    checker: WebsiteChecker,
    concurrency: usize,
    occurrences: Vec<LinkOccurrence>,
    token: CancellationToken,
) -> ReceiverStream<CheckResult> {
    let Batch { urls, occurrences } = dedupe(occurrences);
    trace!(
        "Checking {} unique URLs with {concurrency} workers",
        urls.len()
    );

    let (send_job, recv_job) = async_channel::bounded(concurrency);
    let (send_done, recv_done) = mpsc::channel(concurrency);
    let (send_result, recv_result) = mpsc::channel(concurrency);

    tokio::spawn(dispatch(urls, send_job, token.clone()));
    for id in 0..concurrency {
        tokio::spawn(work(
            id,
            checker.clone(),
            recv_job.clone(),
            send_done.clone(),
            token.clone(),
        ));
    }
    tokio::spawn(fan_out(occurrences, recv_done, send_result));

    ReceiverStream::new(recv_result)
}

async fn dispatch(urls: Vec<String>, jobs: Sender<String>, token: CancellationToken) {
    for url in urls {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                trace!("Dispatch cancelled");
                break;
            }
            sent = jobs.send(url) => {
                if sent.is_err() {
                    // All workers are gone
                    break;
                }
            }
        }
    }
    // Dropping the sender closes the queue once it is drained
}

async fn work(
    id: usize,
    checker: WebsiteChecker,
    jobs: Receiver<String>,
    done: mpsc::Sender<(String, Outcome)>,
    token: CancellationToken,
) {
    trace!("Worker {id} started");
    loop {
        let url = tokio::select! {
            biased;
            () = token.cancelled() => break,
            job = jobs.recv() => match job {
                Ok(url) => url,
                Err(_) => break,
            },
        };

        let outcome = checker.check(&url, &token).await;
        if token.is_cancelled() {
            warn!("Check of {url} was interrupted: {outcome}");
        }
        if done.send((url, outcome)).await.is_err() {
            break;
        }
    }
    trace!("Worker {id} stopped");
}

async fn fan_out(
    mut occurrences: HashMap<String, Vec<LinkOccurrence>>,
    mut done: mpsc::Receiver<(String, Outcome)>,
    results: mpsc::Sender<CheckResult>,
) {
    while let Some((url, outcome)) = done.recv().await {
        let Some(mut remaining) = occurrences.remove(&url).map(Vec::into_iter) else {
            continue;
        };
        let Some(first) = remaining.next() else {
            continue;
        };

        let primary = Arc::new(CheckResult::new(first, outcome));
        if results.send(CheckResult::clone(&primary)).await.is_err() {
            trace!("Result stream was dropped");
            return;
        }
        for occurrence in remaining {
            let duplicate = CheckResult::new(occurrence, Outcome::Duplicate(Arc::clone(&primary)));
            if results.send(duplicate).await.is_err() {
                trace!("Result stream was dropped");
                return;
            }
        }
    }
}
