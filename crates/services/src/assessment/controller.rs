//! The single-queue controller that owns a [`Session`], its countdown and its
//! integrity guard.
//!
//! User actions, host events, guard callbacks, timer ticks and collaborator
//! completions are all [`Message`]s on one unbounded queue, processed in
//! order by [`Runner::run`]. Timer messages carry the cycle they were started
//! in; anything from a stopped cycle is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, WeakUnboundedSender};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use assess_core::guard::{
    GuardAction, GuardConfig, GuardHost, GuardPolicy, HostEvent, IntegrityGuard,
};
use assess_core::model::{AttemptResult, ItemId, Violation};
use assess_core::session::{
    Finalization, PauseReason, Session, SessionEffect, SessionEvent, SessionSnapshot,
    SessionStatus,
};
use assess_core::variant::Score;
use assess_core::Clock;
use storage::repository::ResultRepository;

use crate::assessment::variant::{AssessmentVariant, Graders};
use crate::timer::CountdownTimer;

/// Where the finished attempt is in its hand-off to the result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// The attempt has not finished.
    NotSubmitted,
    /// Scoring or the store call is in flight.
    Pending,
    Submitted { id: i64 },
    Failed { message: String },
}

/// Everything the UI needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSnapshot<R> {
    pub session: SessionSnapshot,
    pub responses: HashMap<ItemId, R>,
    pub grades: HashMap<ItemId, u8>,
    /// The violation behind the current pause, while the warning is up.
    pub warning: Option<Violation>,
    pub submission: SubmissionState,
    pub result: Option<AttemptResult>,
}

pub(crate) enum Message<R> {
    Event {
        event: SessionEvent<R>,
        reply: Option<oneshot::Sender<()>>,
    },
    Host {
        event: HostEvent,
        reply: oneshot::Sender<GuardAction>,
    },
    Timer {
        cycle: u64,
        /// `None` means the cycle expired.
        remaining: Option<u32>,
    },
    Scored(AttemptResult),
    Stored {
        result: AttemptResult,
        outcome: Result<i64, String>,
    },
    Retry {
        reply: oneshot::Sender<bool>,
    },
    Sync {
        reply: oneshot::Sender<AssessmentSnapshot<R>>,
    },
    Close,
}

pub(crate) struct Runner<V: AssessmentVariant> {
    session: Session<V>,
    guard: IntegrityGuard<Box<dyn GuardHost + Send>>,
    policy: GuardPolicy,
    clock: Clock,
    results: Arc<dyn ResultRepository>,
    graders: Graders,
    tx: WeakUnboundedSender<Message<V::Response>>,
    timer: CountdownTimer,
    cycle: u64,
    warning: Option<Violation>,
    started_at: Option<DateTime<Utc>>,
    finalized: bool,
    submission: SubmissionState,
    result: Option<AttemptResult>,
}

impl<V: AssessmentVariant> Runner<V> {
    pub(crate) fn new(
        session: Session<V>,
        guard: IntegrityGuard<Box<dyn GuardHost + Send>>,
        policy: GuardPolicy,
        clock: Clock,
        results: Arc<dyn ResultRepository>,
        graders: Graders,
        tx: WeakUnboundedSender<Message<V::Response>>,
    ) -> Self {
        Self {
            session,
            guard,
            policy,
            clock,
            results,
            graders,
            tx,
            timer: CountdownTimer::new(),
            cycle: 0,
            warning: None,
            started_at: None,
            finalized: false,
            submission: SubmissionState::NotSubmitted,
            result: None,
        }
    }

    pub(crate) fn snapshot(&self) -> AssessmentSnapshot<V::Response> {
        AssessmentSnapshot {
            session: self.session.snapshot(),
            responses: self.session.responses().clone(),
            grades: self.session.grades().clone(),
            warning: self.warning,
            submission: self.submission.clone(),
            result: self.result.clone(),
        }
    }

    /// Process messages until every handle is gone or `Close` arrives, then
    /// stop the countdown and release the guard.
    pub(crate) async fn run(
        mut self,
        mut rx: UnboundedReceiver<Message<V::Response>>,
        snapshots: watch::Sender<AssessmentSnapshot<V::Response>>,
    ) {
        while let Some(message) = rx.recv().await {
            if !self.handle(message) {
                break;
            }
            snapshots.send_replace(self.snapshot());
        }
        self.timer.stop();
        self.guard.deactivate();
        debug!(attempt = %self.session.id(), "assessment controller stopped");
    }

    fn handle(&mut self, message: Message<V::Response>) -> bool {
        match message {
            Message::Event { event, reply } => {
                self.dispatch(event);
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
            }
            Message::Host { event, reply } => {
                let action = self.guard.handle(&event);
                let _ = reply.send(action);
            }
            Message::Timer { cycle, remaining } => {
                if cycle != self.cycle {
                    debug!(cycle, current = self.cycle, "dropping stale timer message");
                } else {
                    match remaining {
                        Some(remaining) => self.dispatch(SessionEvent::Tick { remaining }),
                        None => self.dispatch(SessionEvent::Expire),
                    }
                }
            }
            Message::Scored(result) => self.store(result),
            Message::Stored { result, outcome } => match outcome {
                Ok(id) => {
                    info!(attempt = %result.attempt_id, id, score = result.score, "attempt stored");
                    self.submission = SubmissionState::Submitted { id };
                }
                Err(message) => {
                    warn!(attempt = %result.attempt_id, error = %message, "attempt submission failed");
                    self.submission = SubmissionState::Failed { message };
                }
            },
            Message::Retry { reply } => {
                let failed = matches!(self.submission, SubmissionState::Failed { .. });
                let retried = match (failed, self.result.clone()) {
                    (true, Some(result)) => {
                        self.store(result);
                        true
                    }
                    _ => false,
                };
                let _ = reply.send(retried);
            }
            Message::Sync { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Message::Close => return false,
        }
        true
    }

    fn dispatch(&mut self, event: SessionEvent<V::Response>) {
        let before = self.session.status();
        let name = event.name();
        let violation = match &event {
            SessionEvent::FirstViolation(v) => Some(*v),
            _ => None,
        };

        let effects = self.session.apply(event);
        let after = self.session.status();
        if before != after {
            info!(
                attempt = %self.session.id(),
                event = name,
                from = ?before,
                to = ?after,
                remaining = self.session.remaining_secs(),
                "session transition"
            );
        }

        if before == SessionStatus::NotStarted && after == SessionStatus::Running {
            self.started_at = Some(self.clock.now());
            if V::PROCTORED {
                self.activate_guard();
            }
        }
        if after == SessionStatus::Paused && violation.is_some() {
            self.warning = violation;
        }
        if after == SessionStatus::Running
            || self.session.pause_reason() == Some(PauseReason::FullscreenExit)
        {
            self.warning = None;
        }
        if after.is_terminal() {
            self.warning = None;
            self.guard.deactivate();
        }

        for effect in effects {
            match effect {
                SessionEffect::StartTimer { seconds } => self.start_timer(seconds),
                SessionEffect::StopTimer => self.stop_timer(),
                SessionEffect::Finalize(finalization) => self.finalize(*finalization),
            }
        }
    }

    fn activate_guard(&mut self) {
        let first = self.tx.clone();
        let second = self.tx.clone();
        let focus = self.tx.clone();
        let config = GuardConfig::new(
            move |violation: &Violation| {
                post(&first, SessionEvent::FirstViolation(*violation));
            },
            move |violation: &Violation| {
                post(&second, SessionEvent::SecondViolation(*violation));
            },
            move || post(&focus, SessionEvent::FocusReturned),
        )
        .with_policy(self.policy);
        self.guard.activate(config);
    }

    fn start_timer(&mut self, seconds: u32) {
        self.cycle += 1;
        let cycle = self.cycle;
        let on_tick = self.tx.clone();
        let on_expire = self.tx.clone();
        self.timer.start(
            seconds,
            move |remaining| {
                send(
                    &on_tick,
                    Message::Timer {
                        cycle,
                        remaining: Some(remaining),
                    },
                );
            },
            move || {
                send(
                    &on_expire,
                    Message::Timer {
                        cycle,
                        remaining: None,
                    },
                );
            },
        );
    }

    fn stop_timer(&mut self) {
        self.timer.stop();
        self.cycle += 1;
    }

    fn finalize(&mut self, finalization: Finalization<V::Response>) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.submission = SubmissionState::Pending;

        let finished_at = self.clock.now();
        let mut result = AttemptResult {
            attempt_id: finalization.attempt_id,
            test_type: finalization.test_type,
            score: 0,
            total_items: finalization.total_items,
            answered: finalization.answered,
            skipped: finalization.skipped,
            violation_count: finalization.violation_count,
            outcome: finalization.outcome,
            elapsed_secs: finalization.elapsed_secs,
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        };

        match finalization.score {
            Score::Percent(score) => {
                result.score = score;
                self.store(result);
            }
            Score::Deferred => {
                let items = self.session.items().to_vec();
                let responses = finalization.responses;
                let grades = self.session.grades().clone();
                let graders = self.graders.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    result.score = V::deferred_score(&items, &responses, &grades, &graders).await;
                    send(&tx, Message::Scored(result));
                });
            }
        }
    }

    /// Hand `result` to the result store off the queue. The outcome comes
    /// back as `Message::Stored`.
    fn store(&mut self, result: AttemptResult) {
        self.submission = SubmissionState::Pending;
        self.result = Some(result.clone());
        let results = Arc::clone(&self.results);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = results
                .append_result(&result)
                .await
                .map_err(|err| err.to_string());
            send(&tx, Message::Stored { result, outcome });
        });
    }
}

fn send<R>(tx: &WeakUnboundedSender<Message<R>>, message: Message<R>) {
    if let Some(tx) = tx.upgrade() {
        let _ = tx.send(message);
    }
}

fn post<R>(tx: &WeakUnboundedSender<Message<R>>, event: SessionEvent<R>) {
    send(tx, Message::Event { event, reply: None });
}
