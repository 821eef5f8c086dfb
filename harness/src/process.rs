// File: harness/src/process.rs
use anyhow::{anyhow, Result};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command as AsyncCommand};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::HarnessError;
use crate::output::{log_msg, OutputCallback, OutputSource};

/// A spawned agent process with its output streams being relayed
pub struct AgentProcess {
    child: Child,
    relays: Vec<JoinHandle<()>>,
    prefix: Option<String>,
}

impl AgentProcess {
    /// Spawn `args[0]` with the remaining args and extra environment.
    ///
    /// The parent environment is inherited. Stdout and stderr are drained on
    /// their own tasks and every line is handed to `relay`.
    pub fn spawn(
        args: &[String],
        envs: &[(String, String)],
        prefix: Option<String>,
        relay: OutputCallback,
    ) -> Result<Self> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| anyhow!("Cannot spawn agent: empty command line"))?;

        debug!("Spawning agent process: {} ({} args)", program, rest.len());

        let mut command = AsyncCommand::new(program);
        command
            .args(rest)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| HarnessError::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Agent stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Agent stderr was not captured"))?;

        let relays = vec![
            spawn_relay(stdout, OutputSource::Stdout, relay.clone()),
            spawn_relay(stderr, OutputSource::Stderr, relay),
        ];

        Ok(Self {
            child,
            relays,
            prefix,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the process has not exited yet
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Ask the process to exit and wait up to `timeout` for it.
    ///
    /// A process that is still running afterwards is killed and the call
    /// fails with [`HarnessError::TerminateTimeout`].
    pub async fn terminate(&mut self, timeout: Duration) -> Result<Option<ExitStatus>> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("Agent process already exited: {}", status);
            self.drain_relays().await;
            return Ok(Some(status));
        }

        self.send_sigterm();

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                let code = status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string());
                log_msg(
                    self.prefix.as_deref(),
                    &format!("Exited with return code {}", code),
                );
                self.drain_relays().await;
                Ok(Some(status))
            }
            Ok(Err(e)) => Err(anyhow!("Error waiting for agent process: {}", e)),
            Err(_) => {
                let err = HarnessError::TerminateTimeout;
                log_msg(self.prefix.as_deref(), &err.to_string());
                if let Err(e) = self.child.start_kill() {
                    warn!("Failed to kill agent process: {}", e);
                }
                Err(err.into())
            }
        }
    }

    fn send_sigterm(&mut self) {
        #[cfg(unix)]
        {
            if let Some(pid) = self.child.id() {
                // SAFETY: pid belongs to a child we spawned and have not reaped.
                let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
                if ret == 0 {
                    return;
                }
                warn!(pid, "SIGTERM failed, killing agent process");
            }
        }
        if let Err(e) = self.child.start_kill() {
            warn!("Failed to kill agent process: {}", e);
        }
    }

    /// Let the relays flush what the process wrote before exiting
    async fn drain_relays(&mut self) {
        let relays = std::mem::take(&mut self.relays);
        let drained = tokio::time::timeout(
            Duration::from_secs(1),
            futures::future::join_all(relays),
        )
        .await;
        if drained.is_err() {
            debug!("Output relays still open after process exit");
        }
    }
}

fn spawn_relay<R>(stream: R, source: OutputSource, relay: OutputCallback) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    relay(source, line.trim_end_matches(['\r', '\n']));
                    buf.clear();
                }
                Err(e) => {
                    debug!("Agent {} relay stopped: {}", source.as_str(), e);
                    break;
                }
            }
        }
    })
}
