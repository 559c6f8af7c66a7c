//! Location Acquirer
//!
//! Turns a stream of raw fixes into filtered resolved locations for the
//! local participant. Escalation policy: an error on the very first fix
//! request reaches the error callback; everything later is logged and
//! absorbed so a long-running sharing session is never torn down by a
//! transient watch failure.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::domain::{LocationFilter, ParticipantId, ResolvedLocation};
use crate::shared::PositionError;

use super::{PositionSource, FIX_DEADLINE};

/// Handle to a running acquisition task.
///
/// Dropping the handle stops the acquisition.
#[derive(Debug)]
pub struct LocationAcquirer {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl LocationAcquirer {
    /// Begin continuous observation of `source` for `owner`.
    ///
    /// `on_location` receives every accepted, blended location.
    /// `on_error` is invoked at most once, and only for a failure of the
    /// very first fix request.
    pub fn start<S, F, E>(source: S, owner: ParticipantId, on_location: F, on_error: E) -> Self
    where
        S: PositionSource,
        F: FnMut(ResolvedLocation) + Send + 'static,
        E: FnOnce(PositionError) + Send + 'static,
    {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(watch_positions(source, owner, on_location, on_error, stop_rx));
        Self {
            stop,
            task: Some(task),
        }
    }

    /// Cancel the observation. Idempotent; safe after a delivered error.
    pub fn stop(&mut self) {
        // send fails once the task has already exited, which is fine
        let _ = self.stop.send(true);
        self.task.take();
    }
}

impl Drop for LocationAcquirer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn watch_positions<S, F, E>(
    mut source: S,
    owner: ParticipantId,
    mut on_location: F,
    on_error: E,
    mut stop: watch::Receiver<bool>,
) where
    S: PositionSource,
    F: FnMut(ResolvedLocation) + Send + 'static,
    E: FnOnce(PositionError) + Send + 'static,
{
    let mut filter = LocationFilter::new(owner);
    let mut on_error = Some(on_error);
    let mut first_request = true;

    loop {
        let fix = tokio::select! {
            _ = stop.changed() => return,
            fix = timeout(FIX_DEADLINE, source.next_fix()) => {
                fix.unwrap_or(Err(PositionError::Timeout(FIX_DEADLINE)))
            }
        };

        // Stale completions must not resurrect a stopped acquirer.
        if *stop.borrow() {
            return;
        }

        match fix {
            Ok(sample) => {
                first_request = false;
                if let Some(resolved) = filter.apply(sample) {
                    on_location(resolved);
                }
            }
            Err(err) => {
                let terminal = err.is_terminal();
                if first_request {
                    first_request = false;
                    tracing::error!(error = %err, "Initial position fix failed");
                    if let Some(cb) = on_error.take() {
                        cb(err);
                    }
                } else {
                    tracing::warn!(error = %err, "Position fix failed, continuing watch");
                }
                if terminal {
                    return;
                }
            }
        }
    }
}
