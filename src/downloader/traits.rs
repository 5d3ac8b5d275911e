// Collaborator traits: progress sink, process runner, cancellation

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::watch;

use super::errors::RunError;
use super::models::AttemptOutcome;

/// Receives yt-dlp output one line at a time, in arrival order.
///
/// Called synchronously between reads; a slow sink stalls draining of the
/// child's output.
pub trait ProgressSink: Send {
    fn on_line(&mut self, line: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(&str) + Send,
{
    fn on_line(&mut self, line: &str) {
        self(line)
    }
}

/// A concrete command to launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Launches one child process and reports how it ended
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Name of the runner (for logging)
    fn name(&self) -> &'static str;

    /// Run to completion, forwarding every output line to `sink`.
    ///
    /// Returns `RunError::Cancelled` if `cancel` fires while the child runs.
    async fn run(
        &self,
        invocation: &Invocation,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<AttemptOutcome, RunError>;
}

/// Triggers cancellation of a running session
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes a `CancelHandle`
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the handle
    /// was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_closure_is_a_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |line: &str| seen.push(line.to_string());
            let sink_ref: &mut dyn ProgressSink = &mut sink;
            sink_ref.on_line("a");
            sink_ref.on_line("b");
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let handle = CancelHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());

        let waiter = tokio::spawn(async move { token.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_never_token_pends() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        let res = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(res.is_err());
    }
}
