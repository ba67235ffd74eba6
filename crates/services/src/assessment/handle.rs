use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

use assess_core::guard::{GuardAction, GuardHost, GuardPolicy, HostEvent, IntegrityGuard};
use assess_core::model::{AssessmentItem, CodeDraft, ItemId};
use assess_core::session::{Session, SessionEvent, SessionStatus};
use assess_core::variant::Coding;
use assess_core::Clock;
use storage::repository::{ItemRepository, ResultRepository};

use crate::assessment::controller::{AssessmentSnapshot, Message, Runner};
use crate::assessment::variant::{AssessmentVariant, Graders};
use crate::error::AssessmentError;
use crate::execution::{CodeExecutor, GradeReport, GradeRequest, RunOutput, RunRequest};
use crate::fullscreen::FullscreenControl;
use crate::text_grading::TextGrader;

/// The collaborators one assessment talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub items: Arc<dyn ItemRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub executor: Arc<dyn CodeExecutor>,
    pub text_grader: Arc<dyn TextGrader>,
    pub fullscreen: Arc<dyn FullscreenControl>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentOptions {
    /// Overrides the variant's default budget.
    pub budget_secs: Option<u32>,
    pub fullscreen_required: bool,
    pub policy: GuardPolicy,
    pub clock: Clock,
}

/// Cheap-to-clone front end of a running assessment controller.
///
/// Every mutating call is queued behind earlier messages and resolves once
/// the controller has processed it. Dropping the last handle stops the
/// countdown and releases the guard.
pub struct AssessmentHandle<V: AssessmentVariant> {
    tx: mpsc::UnboundedSender<Message<V::Response>>,
    snapshots: watch::Receiver<AssessmentSnapshot<V::Response>>,
    items: Arc<[V::Item]>,
    executor: Arc<dyn CodeExecutor>,
    fullscreen: Arc<dyn FullscreenControl>,
}

impl<V: AssessmentVariant> Clone for AssessmentHandle<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            snapshots: self.snapshots.clone(),
            items: Arc::clone(&self.items),
            executor: Arc::clone(&self.executor),
            fullscreen: Arc::clone(&self.fullscreen),
        }
    }
}

impl<V: AssessmentVariant> AssessmentHandle<V> {
    /// Load the variant's items and spawn its controller. A failing item
    /// source leaves the session unstartable with the error in its snapshot.
    pub async fn open(
        host: Box<dyn GuardHost + Send>,
        collaborators: &Collaborators,
        options: AssessmentOptions,
    ) -> Self {
        let mut session =
            Session::new(V::default()).with_fullscreen_required(options.fullscreen_required);
        if let Some(budget) = options.budget_secs {
            session = session.with_budget(budget);
        }
        match V::load_items(collaborators.items.as_ref()).await {
            Ok(items) => session.load_items(items),
            Err(err) => {
                warn!(test_type = %V::TEST_TYPE, error = %err, "failed to load items");
                session.load_failed(format!("could not load items: {err}"));
            }
        }
        Self::spawn(session, host, collaborators, options)
    }

    /// Spawn a controller around an already prepared session.
    #[must_use]
    pub fn spawn(
        session: Session<V>,
        host: Box<dyn GuardHost + Send>,
        collaborators: &Collaborators,
        options: AssessmentOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let items: Arc<[V::Item]> = Arc::from(session.items());
        let runner = Runner::new(
            session,
            IntegrityGuard::new(host, options.clock),
            options.policy,
            options.clock,
            Arc::clone(&collaborators.results),
            Graders {
                text: Arc::clone(&collaborators.text_grader),
                code: Arc::clone(&collaborators.executor),
            },
            tx.downgrade(),
        );
        let (snapshot_tx, snapshots) = watch::channel(runner.snapshot());
        tokio::spawn(runner.run(rx, snapshot_tx));

        Self {
            tx,
            snapshots,
            items,
            executor: Arc::clone(&collaborators.executor),
            fullscreen: Arc::clone(&collaborators.fullscreen),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[V::Item] {
        &self.items
    }

    /// The most recently published snapshot. May lag behind queued messages;
    /// use [`Self::sync`] to wait for them.
    #[must_use]
    pub fn snapshot(&self) -> AssessmentSnapshot<V::Response> {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AssessmentSnapshot<V::Response>> {
        self.snapshots.clone()
    }

    /// Snapshot taken after every message queued before this call.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn sync(&self) -> Result<AssessmentSnapshot<V::Response>, AssessmentError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Sync { reply })
            .map_err(|_| AssessmentError::Closed)?;
        rx.await.map_err(|_| AssessmentError::Closed)
    }

    /// Queue a session event and wait until it has been applied.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn send(&self, event: SessionEvent<V::Response>) -> Result<(), AssessmentError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Event {
                event,
                reply: Some(reply),
            })
            .map_err(|_| AssessmentError::Closed)?;
        rx.await.map_err(|_| AssessmentError::Closed)
    }

    /// Feed one raw host event through the integrity guard.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn host_event(&self, event: HostEvent) -> Result<GuardAction, AssessmentError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Host { event, reply })
            .map_err(|_| AssessmentError::Closed)?;
        rx.await.map_err(|_| AssessmentError::Closed)
    }

    /// Start the attempt, asking for fullscreen first when it is required.
    ///
    /// Starting an attempt that is already under way returns its snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Unavailable` when items failed to load and
    /// `AssessmentError::FullscreenDenied` when the host refused fullscreen;
    /// the session stays `NotStarted` in both cases.
    pub async fn start(&self) -> Result<AssessmentSnapshot<V::Response>, AssessmentError> {
        let current = self.sync().await?;
        if let Some(message) = &current.session.load_error {
            return Err(AssessmentError::Unavailable(message.clone()));
        }
        if current.session.status != SessionStatus::NotStarted {
            return Ok(current);
        }
        if current.session.fullscreen_required && !current.session.fullscreen_active {
            self.enter_fullscreen().await?;
        }
        self.send(SessionEvent::Start).await?;
        self.sync().await
    }

    /// Ask the host for fullscreen and report success to the session, which
    /// resumes a session paused by leaving fullscreen.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::FullscreenDenied` when the host refuses.
    pub async fn enter_fullscreen(&self) -> Result<(), AssessmentError> {
        if let Err(err) = self.fullscreen.request().await {
            warn!(test_type = %V::TEST_TYPE, error = %err, "fullscreen request denied");
            return Err(AssessmentError::FullscreenDenied);
        }
        self.send(SessionEvent::FullscreenChanged { active: true })
            .await
    }

    /// Leave fullscreen once the attempt is over.
    pub async fn release_fullscreen(&self) {
        self.fullscreen.exit().await;
    }

    /// Record a response for `item`. Only applied while running.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::UnknownItem` for an id outside this test.
    pub async fn record(&self, item: ItemId, response: V::Response) -> Result<(), AssessmentError> {
        if !self.items.iter().any(|candidate| candidate.id() == item) {
            return Err(AssessmentError::UnknownItem(item));
        }
        self.send(SessionEvent::Record { item, response }).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn next(&self) -> Result<(), AssessmentError> {
        self.send(SessionEvent::Next).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn previous(&self) -> Result<(), AssessmentError> {
        self.send(SessionEvent::Previous).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn skip(&self) -> Result<(), AssessmentError> {
        self.send(SessionEvent::Skip).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn jump(&self, index: usize) -> Result<(), AssessmentError> {
        self.send(SessionEvent::Jump(index)).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn acknowledge(&self) -> Result<(), AssessmentError> {
        self.send(SessionEvent::Acknowledge).await
    }

    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn fullscreen_changed(&self, active: bool) -> Result<(), AssessmentError> {
        self.send(SessionEvent::FullscreenChanged { active }).await
    }

    /// Submit the attempt and return the snapshot right after finalization.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn submit(&self) -> Result<AssessmentSnapshot<V::Response>, AssessmentError> {
        self.send(SessionEvent::Submit).await?;
        self.sync().await
    }

    /// Re-send the finalized result after a failed submission. Returns
    /// `false` when there was nothing to retry.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Closed` if the controller has stopped.
    pub async fn retry_submission(&self) -> Result<bool, AssessmentError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Retry { reply })
            .map_err(|_| AssessmentError::Closed)?;
        rx.await.map_err(|_| AssessmentError::Closed)
    }

    /// Stop the controller without finalizing. Later calls on any clone of
    /// this handle return `AssessmentError::Closed`.
    pub fn close(&self) {
        let _ = self.tx.send(Message::Close);
    }
}

impl AssessmentHandle<Coding> {
    async fn running_draft(&self, item: ItemId) -> Result<CodeDraft, AssessmentError> {
        let snapshot = self.sync().await?;
        if snapshot.session.status != SessionStatus::Running {
            return Err(AssessmentError::NotRunning);
        }
        snapshot
            .responses
            .get(&item)
            .cloned()
            .ok_or(AssessmentError::NoResponse(item))
    }

    /// Execute the recorded draft against `stdin`. The countdown keeps
    /// running while the request is in flight.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotRunning` outside a running attempt,
    /// `AssessmentError::NoResponse` without a draft, or the executor's error.
    pub async fn run_code(&self, item: ItemId, stdin: &str) -> Result<RunOutput, AssessmentError> {
        let draft = self.running_draft(item).await?;
        let output = self.executor.run(&RunRequest::new(&draft, stdin)).await?;
        Ok(output)
    }

    /// Send the recorded draft for grading and record the returned
    /// percentage. A grade that lands after the attempt ended is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_code`].
    pub async fn submit_problem(&self, item: ItemId) -> Result<GradeReport, AssessmentError> {
        let draft = self.running_draft(item).await?;
        let report = self
            .executor
            .grade(&GradeRequest::new(item, &draft))
            .await?;
        self.send(SessionEvent::Grade {
            item,
            percent: report.score,
        })
        .await?;
        Ok(report)
    }
}
