//! The loop that connects one mounted test view to its controller.
//!
//! It owns the guard listener eval and drains [`HostCommand`]s, so every
//! script runs on the UI task. Controller snapshots are copied into the
//! view's signals as they arrive.

use std::sync::Arc;

use dioxus::document::eval;
use dioxus::prelude::*;
use tracing::{debug, info, warn};

use services::{AssessmentHandle, AssessmentServices, AssessmentVariant};

use super::Assessment;
use super::bridge::{Forwarded, GuardMessage};
use super::host::{HostCommand, WebviewHost};
use super::scripts::{
    EXIT_FULLSCREEN_SCRIPT, FOCUS_WARNING_SCRIPT, REQUEST_FULLSCREEN_SCRIPT, arm_script,
    install_script, text_selection_script, unload_prompt_script,
};

pub(crate) async fn run_shell<V: AssessmentVariant>(
    services: AssessmentServices,
    fullscreen_required: bool,
    assessment: Assessment<V>,
) {
    let (host, mut commands) = WebviewHost::channel();
    let fullscreen = Arc::new(host.fullscreen());
    let mut listener = eval(&install_script());

    let handle = services
        .open::<V>(Box::new(host), fullscreen, fullscreen_required)
        .await;
    let mut updates = handle.subscribe();

    let Assessment {
        handle: mut handle_slot,
        items: mut items_slot,
        snapshot: mut snapshot_slot,
        ..
    } = assessment;
    items_slot.set(Arc::from(handle.items().to_vec()));
    snapshot_slot.set(Some(updates.borrow_and_update().clone()));
    handle_slot.set(Some(handle.clone()));
    info!(test_type = %V::TEST_TYPE, "proctor shell ready");

    let mut listening = true;
    let mut released = false;
    loop {
        tokio::select! {
            message = listener.recv::<serde_json::Value>(), if listening => match message {
                Ok(value) => forward(&handle, value).await,
                Err(err) => {
                    warn!(error = ?err, "guard listener closed");
                    listening = false;
                }
            },
            command = commands.recv() => match command {
                Some(command) => apply(command).await,
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                if current.session.status.is_terminal() && current.session.fullscreen_active && !released {
                    released = true;
                    handle.release_fullscreen().await;
                }
                snapshot_slot.set(Some(current));
            }
        }
    }
    debug!("proctor shell stopped");
}

async fn forward<V: AssessmentVariant>(handle: &AssessmentHandle<V>, value: serde_json::Value) {
    let message = match serde_json::from_value::<GuardMessage>(value) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "dropping malformed guard message");
            return;
        }
    };
    let outcome = match Forwarded::from(message) {
        Forwarded::Host(event) => handle.host_event(event).await.map(|action| {
            debug!(?action, "guard handled host event");
        }),
        Forwarded::Fullscreen { active } => handle.fullscreen_changed(active).await,
    };
    if let Err(err) = outcome {
        debug!(error = %err, "controller did not take host event");
    }
}

async fn apply(command: HostCommand) {
    match command {
        HostCommand::Attach => run_script(&arm_script(true)).await,
        HostCommand::Detach => run_script(&arm_script(false)).await,
        HostCommand::TextSelection(enabled) => run_script(&text_selection_script(enabled)).await,
        HostCommand::UnloadPrompt(enabled) => run_script(&unload_prompt_script(enabled)).await,
        HostCommand::ShowWarning(violation) => {
            info!(kind = violation.kind.as_str(), "integrity warning shown");
            run_script(FOCUS_WARNING_SCRIPT).await;
        }
        HostCommand::RequestFullscreen(reply) => {
            let granted = eval(REQUEST_FULLSCREEN_SCRIPT)
                .join::<bool>()
                .await
                .unwrap_or(false);
            let _ = reply.send(granted);
        }
        HostCommand::ExitFullscreen => run_script(EXIT_FULLSCREEN_SCRIPT).await,
    }
}

async fn run_script(script: &str) {
    if let Err(err) = eval(script).await {
        debug!(error = ?err, "guard script failed");
    }
}
