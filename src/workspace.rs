use std::{
    path::{Path, PathBuf},
    sync::{mpsc::Receiver, Arc},
};

use parking_lot::{Mutex, MutexGuard};
use tracing::info;

use crate::{
    figure::{Figure, FigureErr},
    insert::{insert_segment, Insertion},
    persist,
    point::Point,
    segment::Segment,
    solver::{SolverEvent, SolverHandle},
    tolerance::Tolerances,
    vertex::Vertex,
};

/// The figure as seen by an interactive shell.
///
/// Edits go through [`Workspace::insert_segment`] while unlocked.
/// [`Workspace::lock`] starts a background solver; its events arrive on the
/// returned channel. Unlocking, replacing the figure or dropping the
/// workspace cancels a running solver first.
pub struct Workspace {
    figure: Arc<Mutex<Figure>>,
    solver: Option<SolverHandle>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

impl Workspace {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            figure: Arc::new(Mutex::new(Figure::new(tolerances))),
            solver: None,
        }
    }

    fn stop_solver(&mut self) {
        if let Some(mut solver) = self.solver.take() {
            solver.cancel();
        }
    }

    /// Replace the figure with an empty one using the same tolerances.
    pub fn new_figure(&mut self) {
        self.stop_solver();
        let mut figure = self.figure.lock();
        let tolerances = figure.tolerances();
        *figure = Figure::new(tolerances);
        info!("new figure");
    }

    pub fn insert_segment(
        &self,
        a: Point,
        b: Point,
    ) -> Result<Insertion, FigureErr> {
        insert_segment(&mut self.figure.lock(), a, b)
    }

    pub fn is_locked(&self) -> bool {
        self.figure.lock().is_locked()
    }

    /// True while a solver thread is still running.
    pub fn is_solving(&self) -> bool {
        self.solver.as_ref().map_or(false, |s| !s.is_finished())
    }

    /// Lock the figure and start solving it. Locking again restarts the
    /// solver from scratch.
    pub fn lock(&mut self) -> Receiver<SolverEvent> {
        self.stop_solver();
        self.figure.lock().lock();
        let (solver, events) = SolverHandle::spawn(Arc::clone(&self.figure));
        self.solver = Some(solver);
        events
    }

    pub fn unlock(&mut self) {
        self.stop_solver();
        self.figure.lock().unlock();
    }

    /// Direct access to the live figure. Holding the guard blocks the solver
    /// from publishing extended segments.
    pub fn figure(&self) -> MutexGuard<'_, Figure> {
        self.figure.lock()
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        self.figure.lock().iter_vertices().copied().collect()
    }

    pub fn basic_segments(&self) -> Vec<Segment> {
        self.figure.lock().iter_segments().map(|(_, s)| *s).collect()
    }

    pub fn extended_segments(&self) -> Vec<Segment> {
        self.figure.lock().extended().to_vec()
    }

    /// Write the figure, adding the `.ts` extension if `path` has none.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, FigureErr> {
        persist::save(&self.figure.lock(), path)
    }

    /// Replace the figure with the one stored at `path`. On failure the
    /// current figure is left as it was, apart from being unlocked.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), FigureErr> {
        self.unlock();
        let tolerances = self.figure.lock().tolerances();
        let loaded = persist::load(path, tolerances)?;
        *self.figure.lock() = loaded;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.stop_solver();
    }
}
