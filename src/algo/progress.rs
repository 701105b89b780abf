//! Progress reporting for the long-running algorithms.
//!
//! ```
//! use halfedit::algo::Progress;
//! use halfedit::algo::remesh::{isotropic_remesh_with_progress, RemeshOptions};
//! use halfedit::mesh::{primitives, HalfEdgeMesh};
//!
//! let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
//! let progress = Progress::new(|step, total, stage| log::info!("[{step}/{total}] {stage}"));
//! isotropic_remesh_with_progress(&mut mesh, &RemeshOptions::default().with_iterations(1), &progress)
//!     .unwrap();
//! ```

/// Callback receiving `(step, total, stage)` updates.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report that `step` of `total` steps is starting.
    #[inline]
    pub fn report(&self, step: usize, total: usize, stage: &str) {
        (self.callback)(step, total, stage);
    }

    /// Report progress inside one step of a coarser schedule.
    ///
    /// `done` of `count` items of step `step` (out of `steps`) are finished.
    /// The update is scaled to per-mille of the whole schedule so that the
    /// reported fraction never moves backwards across steps.
    #[inline]
    pub fn report_sub(&self, done: usize, count: usize, step: usize, steps: usize, stage: &str) {
        if count == 0 || steps == 0 {
            return;
        }
        let within = done.min(count) * 1000 / count;
        (self.callback)(step * 1000 + within, steps * 1000, stage);
    }

    /// A reporter that drops every update.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Progress, Arc<Mutex<Vec<(usize, usize)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |step, total, _| sink.lock().unwrap().push((step, total)));
        (progress, seen)
    }

    #[test]
    fn test_report_forwards() {
        let (progress, seen) = recording();
        progress.report(2, 5, "rounds");
        assert_eq!(*seen.lock().unwrap(), vec![(2, 5)]);
    }

    #[test]
    fn test_report_sub_scales_into_step() {
        let (progress, seen) = recording();
        progress.report_sub(1, 4, 2, 3, "collapsing");
        progress.report_sub(9, 4, 2, 3, "collapsing");
        progress.report_sub(1, 0, 2, 3, "nothing to do");
        assert_eq!(*seen.lock().unwrap(), vec![(2250, 3000), (3000, 3000)]);
    }
}
