use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::future::{AbortHandle, Abortable};
use futures::task::LocalSpawnExt;

use crate::error::ComposeError;

thread_local! {
    static SPAWNER: RefCell<Option<LocalSpawner>> = const { RefCell::new(None) };
}

pub(crate) fn install_spawner(spawner: LocalSpawner) {
    SPAWNER.with(|s| *s.borrow_mut() = Some(spawner));
}

pub(crate) fn uninstall_spawner() {
    let _ = SPAWNER.try_with(|s| s.borrow_mut().take());
}

/// Handle to a launched task.
#[derive(Clone)]
pub struct Job {
    abort: AbortHandle,
    done: Rc<Cell<bool>>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Job {
    /// Cancels the task at its next suspension point.
    pub fn cancel(&self) {
        if !self.done.get() {
            log::trace!("job cancelled");
        }
        self.abort.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.done.get() && !self.abort.is_aborted()
    }

    pub fn is_completed(&self) -> bool {
        self.done.get()
    }
}

/// Starts `fut` on the scheduler's cooperative executor.
///
/// The task runs on the next `run_until_stalled` of the scheduler (every
/// frame) and yields at each `.await` on the frame clock.
pub fn launch<F>(fut: F) -> Result<Job, ComposeError>
where
    F: Future<Output = ()> + 'static,
{
    let (abort, reg) = AbortHandle::new_pair();
    let done = Rc::new(Cell::new(false));
    let task = {
        let done = done.clone();
        async move {
            let _ = Abortable::new(fut, reg).await;
            done.set(true);
        }
    };
    SPAWNER.with(|s| match s.borrow().as_ref() {
        Some(spawner) => spawner
            .spawn_local(task)
            .map_err(|_| ComposeError::NoScheduler),
        None => Err(ComposeError::NoScheduler),
    })?;
    Ok(Job { abort, done })
}
