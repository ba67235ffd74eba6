//! Proctoring for the desktop webview: the guard host, its listener script
//! and the per-view shell that drives one assessment.

mod bridge;
mod frame;
mod host;
mod scripts;
mod shell;

use std::future::Future;
use std::sync::Arc;

use dioxus::document::eval;
use dioxus::prelude::*;
use tracing::warn;

use assess_core::model::ItemId;
use services::{AssessmentError, AssessmentHandle, AssessmentSnapshot, AssessmentVariant};

use crate::context::AppContext;
use crate::vm::error_notice;

pub use bridge::{Forwarded, GuardMessage};
pub use frame::{FrameAction, NavAction, ProctorFrame, QuestionNav};
pub use host::{HostCommand, WebviewFullscreen, WebviewHost};

/// Reactive handle to the assessment behind one test view.
pub struct Assessment<V: AssessmentVariant> {
    handle: Signal<Option<AssessmentHandle<V>>>,
    items: Signal<Arc<[V::Item]>>,
    snapshot: Signal<Option<AssessmentSnapshot<V::Response>>>,
    notice: Signal<Option<String>>,
}

impl<V: AssessmentVariant> Clone for Assessment<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: AssessmentVariant> Copy for Assessment<V> {}

/// Opens an assessment of type `V` for the calling component and keeps its
/// signals current. The guard script is removed when the component unmounts.
pub fn use_assessment<V: AssessmentVariant>() -> Assessment<V> {
    let ctx = use_context::<AppContext>();
    let assessment = Assessment {
        handle: use_signal(|| None),
        items: use_signal(|| Arc::from(Vec::new())),
        snapshot: use_signal(|| None),
        notice: use_signal(|| None),
    };

    use_future(move || {
        let services = ctx.services();
        let fullscreen_required = ctx.fullscreen_required() && V::PROCTORED;
        shell::run_shell::<V>(services, fullscreen_required, assessment)
    });

    use_drop(|| {
        let _ = eval(scripts::TEARDOWN_SCRIPT);
    });

    assessment
}

impl<V: AssessmentVariant> Assessment<V> {
    #[must_use]
    pub fn snapshot(&self) -> Option<AssessmentSnapshot<V::Response>> {
        self.snapshot.read().clone()
    }

    #[must_use]
    pub fn items(&self) -> Arc<[V::Item]> {
        Arc::clone(&*self.items.read())
    }

    #[must_use]
    pub fn handle(&self) -> Option<AssessmentHandle<V>> {
        self.handle.read().clone()
    }

    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.notice.read().clone()
    }

    pub fn set_notice(&self, message: Option<String>) {
        let mut notice = self.notice;
        notice.set(message);
    }

    /// Runs `action` against the controller in the background. A failure
    /// becomes the notice; a success clears it.
    pub fn act<F, Fut>(&self, action: F)
    where
        F: FnOnce(AssessmentHandle<V>) -> Fut + 'static,
        Fut: Future<Output = Result<(), AssessmentError>> + 'static,
    {
        let Some(handle) = self.handle() else {
            return;
        };
        let this = *self;
        spawn(async move {
            match action(handle).await {
                Ok(()) => this.set_notice(None),
                Err(err) => {
                    warn!(error = %err, "assessment action failed");
                    this.set_notice(Some(error_notice(&err)));
                }
            }
        });
    }

    pub fn frame_action(&self, action: FrameAction) {
        match action {
            FrameAction::Start => self.act(|h| async move { h.start().await.map(drop) }),
            FrameAction::Acknowledge => self.act(|h| async move { h.acknowledge().await }),
            FrameAction::Fullscreen => self.act(|h| async move { h.enter_fullscreen().await }),
            FrameAction::Submit => self.act(|h| async move { h.submit().await.map(drop) }),
            FrameAction::Retry => self.act(|h| async move { h.retry_submission().await.map(drop) }),
        }
    }

    pub fn navigate(&self, action: NavAction) {
        match action {
            NavAction::Previous => self.act(|h| async move { h.previous().await }),
            NavAction::Next => self.act(|h| async move { h.next().await }),
            NavAction::Skip => self.act(|h| async move { h.skip().await }),
            NavAction::Jump(index) => self.act(move |h| async move { h.jump(index).await }),
        }
    }

    pub fn record(&self, item: ItemId, response: V::Response) {
        self.act(move |h| async move { h.record(item, response).await });
    }
}
