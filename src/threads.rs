use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Set once, observed by every task of a batch.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs one fallible operation over every item of a batch.
///
/// Returns results in input order, or the first error observed. Once an error
/// is seen no further items are started; `map` returns only after every
/// item has either finished or been skipped.
pub trait Executor {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static;
}

fn task_name(index: usize) -> String {
    format!("task #{}", index)
}

fn run_guarded<T, U, F>(f: &F, item: T, index: usize) -> Result<U>
where
    F: Fn(T) -> Result<U>,
{
    panic::catch_unwind(AssertUnwindSafe(|| f(item))).unwrap_or_else(|_| {
        Err(Error::WorkerPanicked {
            task: task_name(index),
        })
    })
}

/// Runs every item on the calling thread, stopping at the first error.
#[derive(Copy, Clone, Debug, Default)]
pub struct Inline;

impl Executor for Inline {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| run_guarded(&f, item, i))
            .collect()
    }
}

struct Worker {
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, jobs: Arc<Mutex<mpsc::Receiver<Job>>>) -> Self {
        let handle = thread::Builder::new()
            .name(format!("heatframes-worker-{}", id))
            .spawn(move || loop {
                let job = match jobs.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => return,
                };
                match job {
                    Ok(job) => job(),
                    Err(_) => return,
                }
            });
        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(worker = id, error = %e, "failed to spawn worker thread");
                None
            }
        };
        Self { handle }
    }
}

enum Outcome<U> {
    Done(Result<U>),
    Skipped,
}

/// Fixed set of threads pulling jobs off one shared queue.
///
/// The pool outlives individual batches, so both passes of a run share the
/// same threads.
pub struct WorkerPool {
    workers: Vec<Worker>,
    tx: Option<mpsc::Sender<Job>>,
}

impl WorkerPool {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "no workers");
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let workers: Vec<Worker> = (0..n).map(|id| Worker::new(id, rx.clone())).collect();
        Self {
            workers,
            tx: Some(tx),
        }
    }

    pub fn size(&self) -> usize {
        self.workers.iter().filter(|w| w.handle.is_some()).count()
    }

    fn submit(&self, job: Job) -> bool {
        match &self.tx {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }
}

impl Executor for WorkerPool {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        if self.size() == 0 {
            return Inline.map(items, f);
        }
        let n = items.len();
        let f = Arc::new(f);
        let cancel = CancelToken::new();
        let (res_tx, res_rx) = mpsc::channel::<(usize, Outcome<U>)>();

        let mut submitted = 0;
        for (i, item) in items.into_iter().enumerate() {
            let f = f.clone();
            let cancel = cancel.clone();
            let res_tx = res_tx.clone();
            let job: Job = Box::new(move || {
                let outcome = if cancel.is_cancelled() {
                    Outcome::Skipped
                } else {
                    let result = run_guarded(f.as_ref(), item, i);
                    if result.is_err() {
                        cancel.cancel();
                    }
                    Outcome::Done(result)
                };
                // The collector only hangs up after it has everything it waits for.
                let _ = res_tx.send((i, outcome));
            });
            if !self.submit(job) {
                break;
            }
            submitted += 1;
        }
        drop(res_tx);

        let mut results: Vec<Option<U>> = (0..n).map(|_| None).collect();
        let mut first_error: Option<Error> = None;
        let mut skipped = 0;
        for _ in 0..submitted {
            match res_rx.recv() {
                Ok((i, Outcome::Done(Ok(u)))) => results[i] = Some(u),
                Ok((i, Outcome::Done(Err(e)))) => {
                    debug!(task = i, error = %e, "task failed");
                    first_error.get_or_insert(e);
                }
                Ok((_, Outcome::Skipped)) => skipped += 1,
                Err(_) => break,
            }
        }
        if skipped > 0 {
            warn!(skipped, total = n, "skipped queued tasks after failure");
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        results
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.ok_or_else(|| Error::WorkerPanicked {
                    task: task_name(i),
                })
            })
            .collect()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.tx.take());
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

/// Pool for `threads` workers, or inline execution for 0.
pub enum AnyExecutor {
    Inline(Inline),
    Pool(WorkerPool),
}

impl AnyExecutor {
    pub fn with_threads(threads: usize) -> Self {
        if threads == 0 {
            Self::Inline(Inline)
        } else {
            Self::Pool(WorkerPool::new(threads))
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Inline(_) => 0,
            Self::Pool(p) => p.size(),
        }
    }
}

impl Executor for AnyExecutor {
    fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        match self {
            Self::Inline(e) => e.map(items, f),
            Self::Pool(e) => e.map(items, f),
        }
    }
}
