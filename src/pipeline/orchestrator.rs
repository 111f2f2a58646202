//! Pipeline Orchestrator: sequencing, failure isolation, delivery.
//!
//! Runs the three independent specialist roles (sequentially or fanned out
//! across threads), then the Aggregation role, which is strictly ordered
//! after all three and consumes their outputs as plain text whatever their
//! outcome. Each output is handed to the sink as soon as it is computed,
//! always from the orchestrator's own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use super::prompt::{aggregation_prompt, specialist_prompt};
use super::types::{
    ExecutionMode, OpinionSet, Role, RoleOutput, TextGenerator, CANCELLED_TEXT,
    EMPTY_REPORT_ADVICE,
};
use crate::sink::ReportSink;

/// Cooperative cancellation token for an in-flight run.
///
/// Checked between role computations. An outstanding backend call is
/// bounded by the client timeout rather than aborted mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the four roles of one analysis over a single report snapshot.
///
/// The orchestrator owns sequencing and delivery only; it never blocks
/// except inside the generator calls themselves, and it never raises: every
/// failure is folded into the affected role's output.
pub struct OpinionPipeline<'a, G: TextGenerator + Sync> {
    generator: &'a G,
    mode: ExecutionMode,
}

impl<'a, G: TextGenerator + Sync> OpinionPipeline<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self {
            generator,
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn with_mode(generator: &'a G, mode: ExecutionMode) -> Self {
        Self { generator, mode }
    }

    /// Run all four roles against `report`, delivering each output to
    /// `sink` as it completes, and return the full set.
    pub fn run(&self, report: &str, sink: &mut dyn ReportSink) -> OpinionSet {
        self.run_with_cancel(report, sink, &CancelToken::new())
    }

    /// `run`, with cooperative cancellation. Roles skipped by a cancel
    /// yield a failed output with `CANCELLED_TEXT` and are still delivered;
    /// no role is ever left blank.
    pub fn run_with_cancel(
        &self,
        report: &str,
        sink: &mut dyn ReportSink,
        cancel: &CancelToken,
    ) -> OpinionSet {
        if report.trim().is_empty() {
            tracing::warn!("analysis requested without a report");
            return self.deliver_advisory(sink, EMPTY_REPORT_ADVICE);
        }

        tracing::info!(mode = ?self.mode, "analysis run started");

        let (cardiology, psychology, pulmonology) = match self.mode {
            ExecutionMode::Sequential => self.run_specialists_sequential(report, sink, cancel),
            ExecutionMode::Concurrent => self.run_specialists_concurrent(report, sink, cancel),
        };

        // Aggregation is gated on all three specialists reaching complete.
        // Their text goes in verbatim, failures included.
        let aggregation = if cancel.is_cancelled() {
            RoleOutput::failed(Role::Aggregation, CANCELLED_TEXT)
        } else {
            let prompt = aggregation_prompt(
                cardiology.as_text(),
                psychology.as_text(),
                pulmonology.as_text(),
            );
            self.generate(Role::Aggregation, &prompt)
        };
        sink.accept(Role::Aggregation, &aggregation);

        tracing::info!("analysis run finished");

        OpinionSet {
            cardiology,
            psychology,
            pulmonology,
            aggregation,
        }
    }

    fn run_specialists_sequential(
        &self,
        report: &str,
        sink: &mut dyn ReportSink,
        cancel: &CancelToken,
    ) -> (RoleOutput, RoleOutput, RoleOutput) {
        let cardiology = self.specialist(Role::Cardiology, report, sink, cancel);
        let psychology = self.specialist(Role::Psychology, report, sink, cancel);
        let pulmonology = self.specialist(Role::Pulmonology, report, sink, cancel);
        (cardiology, psychology, pulmonology)
    }

    fn run_specialists_concurrent(
        &self,
        report: &str,
        sink: &mut dyn ReportSink,
        cancel: &CancelToken,
    ) -> (RoleOutput, RoleOutput, RoleOutput) {
        let (tx, rx) = mpsc::channel::<RoleOutput>();
        let mut collected: Vec<RoleOutput> = Vec::with_capacity(3);

        std::thread::scope(|scope| {
            for &role in Role::independent() {
                if cancel.is_cancelled() {
                    let _ = tx.send(RoleOutput::failed(role, CANCELLED_TEXT));
                    continue;
                }
                let tx = tx.clone();
                scope.spawn(move || {
                    let _ = tx.send(self.run_specialist_role(role, report));
                });
            }
            drop(tx);

            // Deliver in completion order on this thread; the workers never
            // touch the sink.
            for output in rx {
                sink.accept(output.role, &output);
                collected.push(output);
            }
        });

        (
            take_output(&mut collected, Role::Cardiology),
            take_output(&mut collected, Role::Psychology),
            take_output(&mut collected, Role::Pulmonology),
        )
    }

    fn specialist(
        &self,
        role: Role,
        report: &str,
        sink: &mut dyn ReportSink,
        cancel: &CancelToken,
    ) -> RoleOutput {
        let output = if cancel.is_cancelled() {
            RoleOutput::failed(role, CANCELLED_TEXT)
        } else {
            self.run_specialist_role(role, report)
        };
        sink.accept(role, &output);
        output
    }

    fn run_specialist_role(&self, role: Role, report: &str) -> RoleOutput {
        let prompt = specialist_prompt(role, report);
        self.generate(role, &prompt)
    }

    fn generate(&self, role: Role, prompt: &str) -> RoleOutput {
        tracing::debug!(role = %role, "requesting assessment");
        let output = RoleOutput::from_generation(role, self.generator.generate(prompt));
        if output.is_failure() {
            // Isolated: the other roles proceed, and this text still feeds
            // the Aggregation prompt.
            tracing::warn!(role = %role, text = output.as_text(), "assessment failed");
        } else {
            tracing::debug!(role = %role, chars = output.as_text().len(), "assessment complete");
        }
        output
    }

    fn deliver_advisory(&self, sink: &mut dyn ReportSink, text: &str) -> OpinionSet {
        let set = OpinionSet {
            cardiology: RoleOutput::failed(Role::Cardiology, text),
            psychology: RoleOutput::failed(Role::Psychology, text),
            pulmonology: RoleOutput::failed(Role::Pulmonology, text),
            aggregation: RoleOutput::failed(Role::Aggregation, text),
        };
        for output in set.iter() {
            sink.accept(output.role, output);
        }
        set
    }
}

/// Pull one role's output out of the collected results. Every spawned role
/// sends exactly one output; the fallback only fires if a worker died.
fn take_output(outputs: &mut Vec<RoleOutput>, role: Role) -> RoleOutput {
    outputs
        .iter()
        .position(|o| o.role == role)
        .map(|i| outputs.swap_remove(i))
        .unwrap_or_else(|| {
            RoleOutput::failed(role, format!("Error: {role} worker terminated unexpectedly"))
        })
}
