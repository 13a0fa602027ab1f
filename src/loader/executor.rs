//! Background decode workers.
//!
//! The render thread submits [`LoadJob`]s and drains [`LoadCompletion`]s once
//! per frame without blocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::decode::{DecodeChain, DecodedImage};
use crate::descriptor::SlotIndex;
use crate::error::LoadError;
use crate::lifecycle::ChildToken;

/// Raised when a worker takes a job off the queue. A job's timeout only
/// runs from then, so jobs waiting behind a slow one are not charged for it.
#[derive(Debug, Clone, Default)]
pub struct StartSignal(Arc<AtomicBool>);

impl StartSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A request to fetch and decode one thumbnail.
#[derive(Debug, Clone)]
pub struct LoadJob {
    pub slot: SlotIndex,
    pub locator: String,
    pub token: ChildToken,
    pub started: StartSignal,
}

impl LoadJob {
    pub fn new(slot: SlotIndex, locator: impl Into<String>, token: ChildToken) -> Self {
        Self {
            slot,
            locator: locator.into(),
            token,
            started: StartSignal::default(),
        }
    }
}

/// Result of a [`LoadJob`], carrying the job's token back.
#[derive(Debug)]
pub struct LoadCompletion {
    pub slot: SlotIndex,
    pub token: ChildToken,
    pub result: Result<DecodedImage, LoadError>,
}

/// Where load jobs run.
pub trait LoadExecutor {
    fn submit(&mut self, job: LoadJob);

    /// Take one finished job, if any. Never blocks.
    fn try_next(&mut self) -> Option<LoadCompletion>;
}

enum WorkerMessage {
    Load(LoadJob),
    Shutdown,
}

/// Fixed pool of decoder threads fed from one shared queue.
pub struct ThreadPoolExecutor {
    job_tx: Sender<WorkerMessage>,
    result_rx: Receiver<LoadCompletion>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPoolExecutor {
    /// Spawn `workers` decoder threads (at least one). Network fetches give
    /// up after `fetch_timeout`.
    pub fn spawn(workers: usize, fast_decode: bool, fetch_timeout: Duration) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<WorkerMessage>();
        let (result_tx, result_rx) = mpsc::channel::<LoadCompletion>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let chain = Arc::new(DecodeChain::new(fast_decode, fetch_timeout));

        let mut handles = Vec::new();
        for id in 0..workers.max(1) {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let chain = Arc::clone(&chain);
            let handle = thread::Builder::new()
                .name(format!("image-decoder-{}", id))
                .spawn(move || {
                    log::debug!("Decoder worker {} started", id);
                    Self::worker_loop(&job_rx, &result_tx, &chain);
                    log::debug!("Decoder worker {} exiting", id);
                })?;
            handles.push(handle);
        }

        log::info!("Spawned {} decoder worker(s)", handles.len());

        Ok(Self {
            job_tx,
            result_rx,
            workers: handles,
        })
    }

    fn worker_loop(
        job_rx: &Mutex<Receiver<WorkerMessage>>,
        result_tx: &Sender<LoadCompletion>,
        chain: &DecodeChain,
    ) {
        loop {
            let message = match job_rx.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };
            match message {
                Ok(WorkerMessage::Load(job)) => {
                    if job.token.is_cancelled() {
                        log::debug!("Skipping cancelled load of slot {}", job.slot);
                        continue;
                    }
                    job.started.raise();
                    let result = chain.decode(&job.locator);
                    let completion = LoadCompletion {
                        slot: job.slot,
                        token: job.token,
                        result,
                    };
                    if result_tx.send(completion).is_err() {
                        break;
                    }
                }
                Ok(WorkerMessage::Shutdown) | Err(_) => break,
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl LoadExecutor for ThreadPoolExecutor {
    fn submit(&mut self, job: LoadJob) {
        let slot = job.slot;
        if self.job_tx.send(WorkerMessage::Load(job)).is_err() {
            log::error!("Failed to queue load of slot {}: workers gone", slot);
        }
    }

    fn try_next(&mut self) -> Option<LoadCompletion> {
        match self.result_rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Decoder workers disconnected");
                None
            }
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        log::debug!("Shutting down decoder workers");
        for _ in &self.workers {
            let _ = self.job_tx.send(WorkerMessage::Shutdown);
        }
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                log::warn!("Decoder worker panicked: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CancellationToken;

    const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

    fn wait_for(executor: &mut ThreadPoolExecutor) -> LoadCompletion {
        for _ in 0..500 {
            if let Some(c) = executor.try_next() {
                return c;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("no completion within timeout");
    }

    #[test]
    fn test_pool_decodes_file() {
        let path = std::env::temp_dir().join(format!("globe-gallery-pool-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(5, 4, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let mut executor = ThreadPoolExecutor::spawn(2, true, FETCH_TIMEOUT).unwrap();
        assert_eq!(executor.worker_count(), 2);

        let root = CancellationToken::new();
        let job = LoadJob::new(SlotIndex(3), path.to_string_lossy(), root.child());
        let started = job.started.clone();
        executor.submit(job);

        let completion = wait_for(&mut executor);
        assert!(started.is_raised());
        assert_eq!(completion.slot, SlotIndex(3));
        let image = completion.result.unwrap();
        assert_eq!((image.width, image.height), (5, 4));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_pool_reports_failure() {
        let mut executor = ThreadPoolExecutor::spawn(1, false, FETCH_TIMEOUT).unwrap();
        executor.submit(LoadJob::new(
            SlotIndex(0),
            "/no/such/image.png",
            CancellationToken::new().child(),
        ));

        let completion = wait_for(&mut executor);
        assert!(matches!(completion.result, Err(LoadError::Fetch { .. })));
    }

    #[test]
    fn test_drop_joins_workers() {
        let executor = ThreadPoolExecutor::spawn(3, true, FETCH_TIMEOUT).unwrap();
        drop(executor);
    }
}
