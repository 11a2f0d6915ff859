use std::{process::Stdio, time::Duration};

use tokio::process::Command;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::RefreshAction,
};

/// Executes one recommender action for a profile
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommenderRunner: Send + Sync {
    async fn run(&self, username: &str, action: RefreshAction) -> AppResult<()>;
}

/// Runs the external recommender as a child process
///
/// The command line is `<program> <leading args..> <action> <username> [tmdb_id]`;
/// only the exit status is interpreted.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

const STDERR_TAIL_CHARS: usize = 500;

impl ScriptRunner {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.recommender_program.clone(),
            vec![config.recommender_script.clone()],
            Duration::from_secs(config.recommender_timeout_secs),
        )
    }
}

#[async_trait::async_trait]
impl RecommenderRunner for ScriptRunner {
    /// Runs the recommender once for `username`
    ///
    /// Stdout is discarded; the exit status alone decides success. On failure
    /// the tail of stderr is carried in the error so the worker log shows why.
    /// A run that outlives `timeout` is killed when its future is dropped.
    async fn run(&self, username: &str, action: RefreshAction) -> AppResult<()> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(action.command_args(username))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                AppError::ExternalProcess(format!(
                    "recommender timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| {
                AppError::ExternalProcess(format!("failed to start {}: {}", self.program, e))
            })?;

        if output.status.success() {
            return Ok(());
        }

        // Char-based cut so a multi-byte tail is never split
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = {
            let chars: Vec<char> = stderr.trim().chars().collect();
            chars[chars.len().saturating_sub(STDERR_TAIL_CHARS)..]
                .iter()
                .collect()
        };

        Err(AppError::ExternalProcess(format!(
            "recommender {} for {} exited with {}: {}",
            action.name(),
            username,
            output.status,
            tail
        )))
    }
}
