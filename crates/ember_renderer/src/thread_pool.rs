//! Fixed-size worker pool with a shared FIFO queue.
//!
//! Workers are spawned by [`ThreadPool::start`] and joined by
//! [`ThreadPool::stop`]. Jobs are either `'static` closures submitted with
//! [`ThreadPool::execute`] and awaited with [`ThreadPool::wait`], or borrowing
//! closures submitted inside a [`ThreadPool::scoped`] batch, which doesn't
//! return until all of its jobs have finished.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Errors reported by the pool.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("{count} task(s) panicked")]
    TaskPanicked { count: usize },

    #[error("Thread pool is not running, {pending} task(s) can't complete")]
    NotRunning { pending: usize },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Task {
    job: Job,
    latch: Arc<Latch>,
}

/// Counts outstanding tasks and wakes waiters when the count drops to zero.
struct Latch {
    pending: AtomicUsize,
    panicked: AtomicUsize,
    lock: Mutex<()>,
    done: Condvar,
}

impl Latch {
    fn new() -> Self {
        Self {
            pending: AtomicUsize::new(0),
            panicked: AtomicUsize::new(0),
            lock: Mutex::new(()),
            done: Condvar::new(),
        }
    }

    fn add(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    fn complete(&self, panicked: bool) {
        if panicked {
            self.panicked.fetch_add(1, Ordering::AcqRel);
        }
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            // Taking the lock orders this notify after a waiter's check.
            let _guard = self.lock.lock();
            self.done.notify_all();
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Block until no tasks are pending. Returns and resets the panic count.
    fn wait(&self) -> usize {
        let mut guard = self.lock.lock();
        while self.pending() != 0 {
            self.done.wait(&mut guard);
        }
        drop(guard);
        self.panicked.swap(0, Ordering::AcqRel)
    }
}

struct Queue {
    tasks: VecDeque<Task>,
    stopping: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

/// A fixed number of worker threads pulling jobs from one queue.
pub struct ThreadPool {
    thread_count: usize,
    shared: Arc<Shared>,
    latch: Arc<Latch>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Create a stopped pool with `thread_count` workers.
    ///
    /// # Panics
    ///
    /// Panics if `thread_count` is zero.
    pub fn new(thread_count: usize) -> Self {
        assert!(thread_count > 0, "ThreadPool needs at least one thread");
        Self {
            thread_count,
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    tasks: VecDeque::new(),
                    stopping: false,
                }),
                available: Condvar::new(),
            }),
            latch: Arc::new(Latch::new()),
            workers: Vec::with_capacity(thread_count),
        }
    }

    /// One less than the number of hardware threads, and at least one.
    pub fn default_thread_count() -> usize {
        thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Tasks submitted through [`execute`](Self::execute) that haven't finished.
    pub fn pending_tasks(&self) -> usize {
        self.latch.pending()
    }

    /// Spawn the worker threads.
    ///
    /// # Panics
    ///
    /// Panics if the pool is already running.
    pub fn start(&mut self) -> Result<(), PoolError> {
        assert!(!self.is_running(), "ThreadPool is already running");

        self.shared.queue.lock().stopping = false;

        for i in 0..self.thread_count {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("ember-worker-{i}"))
                .spawn(move || worker_loop(&shared));

            match handle {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    if self.is_running() {
                        self.stop();
                    }
                    return Err(e.into());
                }
            }
        }

        log::debug!("Started thread pool with {} workers", self.thread_count);
        Ok(())
    }

    /// Finish every queued task, then join the workers.
    ///
    /// # Panics
    ///
    /// Panics if the pool isn't running.
    pub fn stop(&mut self) {
        assert!(self.is_running(), "ThreadPool is not running");

        self.shared.queue.lock().stopping = true;
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Thread pool worker exited abnormally");
            }
        }

        log::debug!("Stopped thread pool");
    }

    /// Queue a job. It runs once a worker is free.
    ///
    /// Jobs may be queued on a stopped pool; they run after the next
    /// [`start`](Self::start).
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(job), Arc::clone(&self.latch));
    }

    /// Block until every job from [`execute`](Self::execute) has finished.
    ///
    /// Returns an error if any of them panicked since the last call.
    pub fn wait(&self) -> Result<(), PoolError> {
        let pending = self.latch.pending();
        if pending > 0 && !self.is_running() {
            return Err(PoolError::NotRunning { pending });
        }

        match self.latch.wait() {
            0 => Ok(()),
            count => Err(PoolError::TaskPanicked { count }),
        }
    }

    /// Run a batch of jobs that may borrow from the caller's stack.
    ///
    /// `f` submits jobs through the [`Scope`]. This returns once all of them
    /// have finished, even if `f` panics.
    pub fn scoped<'env, F, R>(&self, f: F) -> Result<R, PoolError>
    where
        F: FnOnce(&Scope<'_, 'env>) -> R,
    {
        if !self.is_running() {
            return Err(PoolError::NotRunning { pending: 0 });
        }

        let scope = Scope {
            pool: self,
            latch: Arc::new(Latch::new()),
            _env: PhantomData,
        };

        let result = f(&scope);
        let panicked = scope.latch.wait();
        drop(scope);

        match panicked {
            0 => Ok(result),
            count => Err(PoolError::TaskPanicked { count }),
        }
    }

    fn submit(&self, job: Job, latch: Arc<Latch>) {
        latch.add();
        self.shared.queue.lock().tasks.push_back(Task { job, latch });
        self.shared.available.notify_one();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

/// Handle for submitting borrowing jobs to a [`ThreadPool::scoped`] batch.
pub struct Scope<'pool, 'env> {
    pool: &'pool ThreadPool,
    latch: Arc<Latch>,
    _env: PhantomData<&'env mut &'env ()>,
}

impl<'pool, 'env> Scope<'pool, 'env> {
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'env,
    {
        let job: Box<dyn FnOnce() + Send + 'env> = Box::new(job);
        // SAFETY: the scope waits on its latch before it is dropped, and it is
        // only ever lent out by reference, so every job finishes while the
        // data it borrows for 'env is still alive.
        let job: Job = unsafe {
            std::mem::transmute::<Box<dyn FnOnce() + Send + 'env>, Box<dyn FnOnce() + Send + 'static>>(
                job,
            )
        };
        self.pool.submit(job, Arc::clone(&self.latch));
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.latch.wait();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }
                if queue.stopping {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };

        let Task { job, latch } = task;
        let panicked = panic::catch_unwind(AssertUnwindSafe(job)).is_err();
        if panicked {
            log::error!(
                "Task panicked on {}",
                thread::current().name().unwrap_or("worker")
            );
        }
        latch.complete(panicked);
    }
}
