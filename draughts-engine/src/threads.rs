//! Worker pool running root branches of the search.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{self, ErrorKind};

/// Unit of work handed to a worker.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    NewJob(Job),
    Terminate,
}

/// A named worker pulling messages off the shared queue until told to quit.
#[derive(Debug)]
struct Thread {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl Thread {
    /// Spawn a new thread. Jobs received after `closing` is raised are dropped unrun.
    fn new(
        id: usize,
        receiver: Arc<Mutex<Receiver<Message>>>,
        closing: Arc<AtomicBool>,
    ) -> error::Result<Self> {
        let name = format!("worker {id}");
        let thread_name = name.clone();

        let runner = move || loop {
            let recv_result = {
                receiver
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .recv()
            };

            match recv_result {
                Ok(Message::NewJob(_)) if closing.load(Ordering::Relaxed) => continue,
                Ok(Message::NewJob(job)) => {
                    // A panicking job loses its own result, the worker lives on.
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        log::error!("job panicked on {thread_name}");
                    }
                }
                Ok(Message::Terminate) => break,

                // Pool is gone.
                Err(_) => break,
            }
        };

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(runner)
            .map_err(|err| error::Error::new(ErrorKind::ThreadSpawnFailed, err))?;

        Ok(Self {
            name,
            handle: Some(handle),
        })
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("{} exited with a panic", self.name);
            }
        }
    }
}

/// Fixed set of workers fed from one queue.
///
/// One pool lives as long as its engine, and the move search and the ponder
/// search both submit to it. Dropping the pool joins every worker.
#[derive(Debug)]
pub struct ThreadPool {
    num_threads: usize,
    threads: Vec<Thread>,
    sender: Mutex<Sender<Message>>,
    closing: Arc<AtomicBool>,
}

impl ThreadPool {
    /// Start `num_threads` workers, at least one.
    pub fn new(num_threads: usize) -> error::Result<Self> {
        let num_threads = num_threads.max(1);
        let (sender, receiver) = mpsc::channel::<Message>();
        let receiver = Arc::new(Mutex::new(receiver));
        let closing = Arc::new(AtomicBool::new(false));

        let mut threads = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            match Thread::new(id, Arc::clone(&receiver), Arc::clone(&closing)) {
                Ok(thread) => threads.push(thread),
                Err(err) => {
                    // Started workers exit once the channel closes.
                    drop(sender);
                    return Err(err);
                }
            }
        }

        Ok(Self {
            num_threads,
            threads,
            sender: Mutex::new(sender),
            closing,
        })
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Queue a job for the next idle worker.
    pub fn run<J: Into<Job>>(&self, job: J) -> error::Result<()> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(Message::NewJob(job.into()))
            .map_err(|_| ErrorKind::ThreadPoolClosed.into())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Pending jobs are skipped. An idle worker holds the receiver lock while
        // waiting, so the queue cannot be drained from here.
        self.closing.store(true, Ordering::Relaxed);

        {
            let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
            for _ in 0..self.num_threads {
                let _ = sender.send(Message::Terminate);
            }
        }

        // Each Thread joins on drop.
        self.threads.clear();
    }
}
