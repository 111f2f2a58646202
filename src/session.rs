//! Analysis session: worker-thread execution with single-run enforcement.
//!
//! The pipeline runs on a dedicated worker so the interactive context stays
//! responsive while generation calls (network-bound, potentially
//! multi-second) are in flight. Each finished role output is handed back
//! over a channel consumed exclusively by the owner context; that hand-off
//! is the one synchronization point between the two sides.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::pipeline::orchestrator::{CancelToken, OpinionPipeline};
use crate::pipeline::types::{ExecutionMode, OpinionSet, Role, RoleOutput, TextGenerator};
use crate::report::MedicalReport;
use crate::sink::ReportSink;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("An analysis is already running. Wait for it to finish or cancel it first.")]
    RunInFlight,
}

/// Starts analysis runs and enforces the single-run-in-flight invariant:
/// a second run cannot start while one is active, so two runs never
/// interleave their writes to shared output storage.
#[derive(Default)]
pub struct AnalysisSession {
    busy: Arc<AtomicBool>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a run currently in flight?
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Spawn one pipeline run on a worker thread.
    ///
    /// The report snapshot is owned by the worker for the whole run; a new
    /// file selection affects only the next run. Refuses while a previous
    /// run is still in flight.
    pub fn spawn<G>(
        &self,
        generator: Arc<G>,
        report: MedicalReport,
        mode: ExecutionMode,
    ) -> Result<AnalysisHandle, SessionError>
    where
        G: TextGenerator + Send + Sync + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::RunInFlight);
        }

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let (tx, rx) = mpsc::channel();
        let slot = RunSlot(Arc::clone(&self.busy));

        let worker = std::thread::spawn(move || {
            let _slot = slot; // released when the worker exits, panics included
            let mut sink = ChannelSink { tx };
            let pipeline = OpinionPipeline::with_mode(generator.as_ref(), mode);
            pipeline.run_with_cancel(report.text(), &mut sink, &token)
        });

        Ok(AnalysisHandle {
            events: rx,
            cancel,
            worker: Some(worker),
        })
    }
}

/// Clears the busy flag when the worker finishes.
struct RunSlot(Arc<AtomicBool>);

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Worker-side sink: forwards each delivery to the owner context.
struct ChannelSink {
    tx: mpsc::Sender<RoleOutput>,
}

impl ReportSink for ChannelSink {
    fn accept(&mut self, _role: Role, output: &RoleOutput) {
        // A gone receiver means the owner stopped listening; the run still
        // completes and its result is available via the join handle.
        let _ = self.tx.send(output.clone());
    }
}

/// Owner-side handle to an in-flight run.
#[derive(Debug)]
pub struct AnalysisHandle {
    events: mpsc::Receiver<RoleOutput>,
    cancel: CancelToken,
    worker: Option<JoinHandle<OpinionSet>>,
}

impl AnalysisHandle {
    /// Role outputs as they are computed. Iteration ends when the run
    /// finishes; the three independent roles arrive (in any order) before
    /// Aggregation.
    pub fn events(&self) -> &mpsc::Receiver<RoleOutput> {
        &self.events
    }

    /// Request cooperative cancellation of the run.
    pub fn cancel(&self) {
        tracing::info!("analysis cancellation requested");
        self.cancel.cancel();
    }

    /// Wait for the run to finish and take the full opinion set.
    /// Returns `None` if the worker panicked.
    pub fn wait(mut self) -> Option<OpinionSet> {
        let worker = self.worker.take()?;
        worker.join().ok()
    }
}

impl Drop for AnalysisHandle {
    fn drop(&mut self) {
        // Dropping the handle abandons the run: cancel and wait for the
        // worker to reach its next check.
        if let Some(worker) = self.worker.take() {
            self.cancel.cancel();
            let _ = worker.join();
        }
    }
}
