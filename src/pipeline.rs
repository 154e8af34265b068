//! Two-phase cluster passes with cooperative cancellation.
//!
//! Phase one (index build and clustering) runs on a worker thread. Phase two
//! (diffing the result into what is on screen) runs on whichever thread calls
//! [`PendingPass::commit`], normally the one that owns the display. Commit
//! waits for phase one, so the second phase never sees a partial result.
//!
//! Submitting a new pass cancels the previous one. Cancellation is checked
//! between grid columns and once more right before the diff is applied.

use crate::clusterer::{Clusterer, Viewport};
use crate::error::{ClusterError, Result};
use crate::marker::{DisplayMarker, Marker};
use crate::render::{DisplayState, MarkerDiff, MarkerRenderer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Shared flag telling both phases of a pass to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Runs cluster passes off the display thread, one at a time.
///
/// # Examples
///
/// ```
/// use quadcluster::{ClusterPipeline, Clusterer, Coordinate, DisplayState, RawMarker, Viewport};
/// use quadcluster::render::RecordingRenderer;
/// use std::sync::Arc;
///
/// let markers: Arc<[RawMarker]> = vec![RawMarker::at(0.2, 0.2), RawMarker::at(0.4, 0.4)].into();
/// let viewport = Viewport::new(Coordinate::new(1.0, 1.0), Coordinate::new(0.0, 0.0), 7.0);
///
/// let mut pipeline = ClusterPipeline::new(Clusterer::new());
/// let mut display = DisplayState::new();
/// let mut renderer = RecordingRenderer::default();
///
/// let pass = pipeline.submit(markers, viewport)?;
/// let diff = pass.commit(&mut display, &mut renderer)?;
/// assert_eq!(diff.added, 1);
/// # Ok::<(), quadcluster::ClusterError>(())
/// ```
pub struct ClusterPipeline<M> {
    clusterer: Arc<Mutex<Clusterer<M>>>,
    current: Option<CancellationToken>,
}

impl<M> ClusterPipeline<M>
where
    M: Marker + Clone + Send + Sync + 'static,
{
    pub fn new(clusterer: Clusterer<M>) -> Self {
        Self {
            clusterer: Arc::new(Mutex::new(clusterer)),
            current: None,
        }
    }

    /// Start a pass for `viewport`, superseding any pass still in flight.
    pub fn submit(&mut self, markers: Arc<[M]>, viewport: Viewport) -> Result<PendingPass<M>> {
        self.cancel_pending();

        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let clusterer = Arc::clone(&self.clusterer);
        let worker_token = token.clone();
        let handle = thread::Builder::new()
            .name("quadcluster-pass".to_string())
            .spawn(move || {
                // Passes queue on the lock; a superseded one bails out here.
                let mut clusterer = clusterer.lock();
                clusterer.rebuild_with_cancel(&markers, &viewport, &worker_token)
            })?;

        Ok(PendingPass { token, handle })
    }

    /// Cancel the most recently submitted pass, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Forget cached extents. Waits for any pass holding the clusterer.
    pub fn reset_extents(&self) {
        self.clusterer.lock().reset_extents();
    }

    pub fn clusterer(&self) -> Arc<Mutex<Clusterer<M>>> {
        Arc::clone(&self.clusterer)
    }
}

/// Handle to a submitted pass.
#[must_use = "a pass does nothing on screen until it is committed"]
pub struct PendingPass<M> {
    token: CancellationToken,
    handle: JoinHandle<Result<Vec<DisplayMarker<M>>>>,
}

impl<M: Marker> PendingPass<M> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Block until phase one finishes and return its output.
    pub fn wait(self) -> Result<Vec<DisplayMarker<M>>> {
        let output = self
            .handle
            .join()
            .map_err(|_| ClusterError::WorkerPanicked)??;

        if self.token.is_cancelled() {
            log::debug!("Dropping output of superseded pass");
            return Err(ClusterError::Cancelled);
        }
        Ok(output)
    }

    /// Wait for phase one, then diff its output into `display`.
    pub fn commit<R>(self, display: &mut DisplayState<M>, renderer: &mut R) -> Result<MarkerDiff>
    where
        R: MarkerRenderer<M>,
    {
        let output = self.wait()?;
        Ok(display.apply(output, renderer))
    }
}
