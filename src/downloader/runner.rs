// Process runner backed by tokio::process

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;

use super::diagnostics::OutcomeClassifier;
use super::errors::{RunError, NO_EXIT_CODE};
use super::models::AttemptOutcome;
use super::traits::{CancelToken, Invocation, ProcessRunner, ProgressSink};

/// Hide the console window for child processes on Windows
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs yt-dlp with stdout and stderr merged into a single line stream
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> TokioCommand {
        let mut cmd = TokioCommand::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }
}

/// Forward lines from one pipe into the shared channel until EOF.
async fn pump_lines<R>(pipe: R, tx: mpsc::UnboundedSender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).await?;
        if read == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if tx.send(line).is_err() {
            return Ok(());
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    fn name(&self) -> &'static str {
        "tokio-process"
    }

    async fn run(
        &self,
        invocation: &Invocation,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<AttemptOutcome, RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        log::debug!(
            "[runner] {} {}",
            invocation.program.display(),
            invocation.args.join(" ")
        );

        let mut child = Self::command(invocation).spawn().map_err(|e| RunError::Spawn {
            program: invocation.program.display().to_string(),
            source: e,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stderr"))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let stdout_task = tokio::spawn(pump_lines(stdout, tx.clone()));
        let stderr_task = tokio::spawn(pump_lines(stderr, tx));

        let mut classifier = OutcomeClassifier::new();
        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        classifier.observe(&line);
                        sink.on_line(&line);
                    }
                    None => break,
                },
                _ = cancel.cancelled() => {
                    log::info!("[runner] Cancellation requested, killing child");
                    let _ = child.kill().await;
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(RunError::Cancelled);
                }
            }
        }

        for task in [stdout_task, stderr_task] {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("[runner] Output read error: {}", e),
                Err(e) => log::warn!("[runner] Output task failed: {}", e),
            }
        }

        // Output can close before the process exits
        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                log::info!("[runner] Cancellation requested after output closed, killing child");
                let _ = child.kill().await;
                return Err(RunError::Cancelled);
            }
        };
        let exit_code = status.code().unwrap_or(NO_EXIT_CODE);
        log::debug!(
            "[runner] exited with {} after {} lines",
            exit_code,
            classifier.lines_seen()
        );

        Ok(classifier.finish(exit_code))
    }
}
