//! The background task that extends a locked figure and enumerates its
//! triangles.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use parking_lot::Mutex;
use procr_ansi_term::Color;
use tracing::{debug, info, warn};

use crate::{
    debug::COLOR_ORANGE,
    emit_info, info_label,
    extend::Extender,
    figure::Figure,
    triangles::{Triangle, TriangleScan},
};

/// What the solver reports, in the order it happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverEvent {
    /// A new phase started.
    Progress(String),
    /// A triangle was found. The same triangle is reported once per way the
    /// scan reaches it.
    Triangle { status: String, triangle: Triangle },
    /// The scan completed with this many distinct triangles.
    Finished { total: usize },
    /// The run was cancelled before completing.
    Cancelled,
}

/// The observer went away; stop working.
struct Disconnected;

struct Reporter {
    events: Sender<SolverEvent>,
}

impl Reporter {
    fn send(&self, event: SolverEvent) -> Result<(), Disconnected> {
        self.events.send(event).map_err(|_| Disconnected)
    }

    fn progress(&self, status: &str) -> Result<(), Disconnected> {
        emit_info!(sty:Color::Cyan, fmt:"{}" | status);
        self.send(SolverEvent::Progress(status.to_string()))
    }
}

/// A running solver. Dropping the handle cancels and joins the worker.
pub struct SolverHandle {
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SolverHandle {
    /// Spawn a solver over `figure`, which must already be locked.
    pub fn spawn(figure: Arc<Mutex<Figure>>) -> (Self, Receiver<SolverEvent>) {
        let (events, receiver) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = {
            let cancel = Arc::clone(&cancel);
            thread::Builder::new()
                .name("triangle-solver".to_string())
                .spawn(move || {
                    let reporter = Reporter { events };
                    if solve(&figure, &cancel, &reporter).is_err() {
                        debug!("solver observer disconnected");
                    }
                })
                .expect("failed to spawn solver thread")
        };
        (
            Self {
                cancel,
                worker: Some(worker),
            },
            receiver,
        )
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Ask the worker to stop and wait for it.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("solver thread panicked");
            }
        }
    }
}

impl Drop for SolverHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn solve(
    shared: &Mutex<Figure>,
    cancel: &AtomicBool,
    reporter: &Reporter,
) -> Result<(), Disconnected> {
    reporter.progress("Copying basic segments...")?;
    let snapshot = {
        let mut figure = shared.lock();
        debug_assert!(figure.is_locked(), "solver started on unlocked figure");
        let basic: Vec<_> = figure.iter_segments().map(|(_, s)| *s).collect();
        figure.push_extended(&basic);
        figure.clone()
    };

    reporter.progress("Generating extended segments...")?;
    let extended = Extender::new(&snapshot).run(cancel, |batch| {
        shared.lock().push_extended(batch);
    });
    let Some(extended) = extended else {
        info!(
            "{} {}",
            info_label!("extend"),
            COLOR_ORANGE.paint("solver cancelled")
        );
        return reporter.send(SolverEvent::Cancelled);
    };

    reporter.progress("Solving triangles...")?;
    let mut disconnected = false;
    let total = TriangleScan::new(&snapshot, &extended).run(cancel, |triangle, found| {
        if disconnected {
            return;
        }
        let status = format!("Solving triangles... (found: {})", found);
        if reporter.send(SolverEvent::Triangle { status, triangle }).is_err() {
            disconnected = true;
            cancel.store(true, Ordering::Relaxed);
        }
    });
    if disconnected {
        return Err(Disconnected);
    }
    let Some(total) = total else {
        info!(
            "{} {}",
            info_label!("triangles"),
            COLOR_ORANGE.paint("solver cancelled")
        );
        return reporter.send(SolverEvent::Cancelled);
    };

    reporter.progress(&format!("Completed - total found: {}", total))?;
    reporter.send(SolverEvent::Finished { total })
}
