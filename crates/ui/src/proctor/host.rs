use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use assess_core::guard::GuardHost;
use assess_core::model::Violation;
use services::fullscreen::{FullscreenControl, FullscreenDenied};

/// Work the guard and the fullscreen switch ask of the webview. The proctor
/// shell drains these on the UI task, where scripts can be evaluated.
#[derive(Debug)]
pub enum HostCommand {
    Attach,
    Detach,
    TextSelection(bool),
    UnloadPrompt(bool),
    ShowWarning(Violation),
    RequestFullscreen(oneshot::Sender<bool>),
    ExitFullscreen,
}

/// [`GuardHost`] for the desktop webview. Every call becomes a
/// [`HostCommand`]; once the shell is gone they are dropped.
#[derive(Debug, Clone)]
pub struct WebviewHost {
    commands: mpsc::UnboundedSender<HostCommand>,
}

impl WebviewHost {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        (Self { commands }, receiver)
    }

    #[must_use]
    pub fn fullscreen(&self) -> WebviewFullscreen {
        WebviewFullscreen {
            commands: self.commands.clone(),
        }
    }

    fn send(&self, command: HostCommand) {
        if self.commands.send(command).is_err() {
            debug!("proctor shell is gone; dropping host command");
        }
    }
}

impl GuardHost for WebviewHost {
    fn attach(&mut self) {
        self.send(HostCommand::Attach);
    }

    fn detach(&mut self) {
        self.send(HostCommand::Detach);
    }

    fn set_text_selection(&mut self, enabled: bool) {
        self.send(HostCommand::TextSelection(enabled));
    }

    fn set_unload_prompt(&mut self, enabled: bool) {
        self.send(HostCommand::UnloadPrompt(enabled));
    }

    fn show_warning(&mut self, violation: &Violation) {
        self.send(HostCommand::ShowWarning(*violation));
    }
}

/// Fullscreen through the document Fullscreen API, answered by the shell.
#[derive(Debug, Clone)]
pub struct WebviewFullscreen {
    commands: mpsc::UnboundedSender<HostCommand>,
}

#[async_trait]
impl FullscreenControl for WebviewFullscreen {
    async fn request(&self) -> Result<(), FullscreenDenied> {
        let (reply, granted) = oneshot::channel();
        self.commands
            .send(HostCommand::RequestFullscreen(reply))
            .map_err(|_| FullscreenDenied)?;
        match granted.await {
            Ok(true) => Ok(()),
            _ => Err(FullscreenDenied),
        }
    }

    async fn exit(&self) {
        let _ = self.commands.send(HostCommand::ExitFullscreen);
    }
}
