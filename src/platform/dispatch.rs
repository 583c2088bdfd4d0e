//! Marshals world access onto a dedicated thread.
//!
//! Worlds are not thread safe: every call must happen on the world's own
//! update thread. Callers submit closures over a bounded channel and get the
//! result back through a oneshot reply.

use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::world::WorldAccess;

type OwnedWorld = Box<dyn WorldAccess + Send>;
type Job = Box<dyn FnOnce(&mut dyn WorldAccess) + Send>;

/// Default number of jobs that may wait for the world thread
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Owns a world on its own thread and runs submitted jobs against it in order
pub struct WorldDispatcher {
    name: String,
    job_tx: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<OwnedWorld>>,
}

impl WorldDispatcher {
    /// Move `world` onto a new thread accepting up to `queue_depth` pending jobs
    pub fn spawn(world: OwnedWorld, queue_depth: usize) -> Result<Self> {
        let name = world.name().to_string();
        let (job_tx, mut job_rx) = mpsc::channel::<Job>(queue_depth.max(1));

        let thread = std::thread::Builder::new()
            .name(format!("world-{name}"))
            .spawn(move || {
                let mut world = world;
                let mut jobs = 0usize;
                while let Some(job) = job_rx.blocking_recv() {
                    job(world.as_mut());
                    jobs += 1;
                }
                log::debug!("World thread for '{}' stopping after {} jobs", world.name(), jobs);
                world
            })?;

        log::info!("Dispatching world '{}' on its own thread", name);
        Ok(Self {
            name,
            job_tx: Some(job_tx),
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `f` on the world thread and wait for its result.
    ///
    /// Must not be called from inside an async runtime; use [`WorldDispatcher::run`] there.
    pub fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WorldAccess) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, reply_rx) = package(f);
        self.sender()?
            .blocking_send(job)
            .map_err(|_| self.closed())?;
        reply_rx.blocking_recv().map_err(|_| self.closed())
    }

    /// Run `f` on the world thread from async code
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WorldAccess) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, reply_rx) = package(f);
        self.sender()?.send(job).await.map_err(|_| self.closed())?;
        reply_rx.await.map_err(|_| self.closed())
    }

    /// Stop accepting jobs, finish the queued ones and hand the world back
    pub fn shutdown(mut self) -> Result<OwnedWorld> {
        self.job_tx.take();
        let thread = self.thread.take().ok_or_else(|| self.closed())?;
        thread
            .join()
            .map_err(|_| Error::Dispatch(format!("world thread for '{}' panicked", self.name)))
    }

    fn sender(&self) -> Result<&mpsc::Sender<Job>> {
        self.job_tx.as_ref().ok_or_else(|| self.closed())
    }

    fn closed(&self) -> Error {
        Error::Dispatch(format!("world thread for '{}' is not running", self.name))
    }
}

impl Drop for WorldDispatcher {
    fn drop(&mut self) {
        self.job_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("World thread for '{}' panicked", self.name);
            }
        }
    }
}

fn package<T, F>(f: F) -> (Job, oneshot::Receiver<T>)
where
    F: FnOnce(&mut dyn WorldAccess) -> T + Send + 'static,
    T: Send + 'static,
{
    let (reply_tx, reply_rx) = oneshot::channel();
    let job: Job = Box::new(move |world| {
        // The caller may have stopped waiting
        let _ = reply_tx.send(f(world));
    });
    (job, reply_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BlockPos;
    use crate::voxel::block::{ids, BlockState};
    use crate::voxel::world::{MemoryWorld, MemoryWorldSettings};

    fn dispatcher() -> WorldDispatcher {
        let world = MemoryWorld::new(MemoryWorldSettings::default());
        WorldDispatcher::spawn(Box::new(world), 4).unwrap()
    }

    #[test]
    fn test_run_blocking_in_order() {
        let dispatcher = dispatcher();
        let pos = BlockPos::new(1, 20, 1);
        assert!(dispatcher
            .run_blocking(move |world| world.set_block(pos, &BlockState::of(ids::WOOL), true))
            .unwrap());
        let block = dispatcher.run_blocking(move |world| world.block(pos)).unwrap();
        assert_eq!(block, BlockState::of(ids::WOOL));

        let world = dispatcher.shutdown().unwrap();
        assert_eq!(world.block(pos), BlockState::of(ids::WOOL));
    }

    #[test]
    fn test_panicking_job_reports_dispatch_error() {
        let dispatcher = dispatcher();
        let result: Result<()> = dispatcher.run_blocking(|_| panic!("boom"));
        assert!(matches!(result, Err(Error::Dispatch(_))));
        assert!(matches!(dispatcher.run_blocking(|w| w.max_y()), Err(Error::Dispatch(_))));
    }

    #[tokio::test]
    async fn test_async_run() {
        let dispatcher = dispatcher();
        let name = dispatcher.run(|world| world.name().to_string()).await.unwrap();
        assert_eq!(name, "world");
        assert_eq!(dispatcher.name(), "world");
    }
}
