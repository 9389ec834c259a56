//! Bounded worker pool for the asset downloads of one page.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;

use url::Url;

use crate::error::FetchError;
use crate::fetch::AssetFetcher;

/// One download: the first URL seen for a local name and where it goes.
#[derive(Debug, Clone)]
pub(super) struct FetchJob {
    pub local_name: String,
    pub url: Url,
    pub dest: PathBuf,
}

pub(super) type FetchOutcome = (FetchJob, Result<u64, FetchError>);

/// Runs `jobs` on at most `workers` threads (1 = sequential, in order).
/// Results arrive in completion order.
pub(super) fn fetch_all(fetcher: &dyn AssetFetcher, jobs: Vec<FetchJob>, workers: usize) -> Vec<FetchOutcome> {
    let count = jobs.len();
    if count == 0 {
        return Vec::new();
    }
    if workers <= 1 || count == 1 {
        return jobs
            .into_iter()
            .map(|job| {
                let res = fetcher.fetch(&job.url, &job.dest);
                (job, res)
            })
            .collect();
    }

    let work: Mutex<VecDeque<FetchJob>> = Mutex::new(jobs.into_iter().collect());
    let (tx, rx) = mpsc::channel();
    let num_workers = workers.min(count);
    std::thread::scope(|s| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            s.spawn(move || loop {
                let job = match work.lock() {
                    Ok(mut q) => q.pop_front(),
                    Err(_) => None,
                };
                let Some(job) = job else { break };
                let res = fetcher.fetch(&job.url, &job.dest);
                if tx.send((job, res)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
        rx.iter().collect()
    })
}
