use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Narrow seam over the version-control tool, so pipeline tests can swap in a
/// fake and stay decoupled from real repository state.
pub trait Publisher: Send + Sync {
    /// Porcelain status of the working tree; empty means clean.
    fn status(&self) -> Result<String, PublishError>;
    fn stage_all(&self) -> Result<(), PublishError>;
    fn commit(&self, message: &str) -> Result<(), PublishError>;
    fn push(&self) -> Result<(), PublishError>;
}

/// Publisher backed by the ambient `git` binary, using whatever credentials
/// the execution environment carries.
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| PublishError::Spawn {
                program: "git".to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(PublishError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Publisher for GitCli {
    fn status(&self) -> Result<String, PublishError> {
        self.run(&["status", "--porcelain"])
    }

    fn stage_all(&self) -> Result<(), PublishError> {
        self.run(&["add", "."]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<(), PublishError> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    fn push(&self) -> Result<(), PublishError> {
        self.run(&["push"]).map(|_| ())
    }
}

/// Publisher that does nothing and always reports a clean tree.
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn status(&self) -> Result<String, PublishError> {
        Ok(String::new())
    }

    fn stage_all(&self) -> Result<(), PublishError> {
        Ok(())
    }

    fn commit(&self, _message: &str) -> Result<(), PublishError> {
        Ok(())
    }

    fn push(&self) -> Result<(), PublishError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Status,
    Stage,
    Commit,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Working tree was clean; nothing to do.
    NoChanges,
    Pushed,
    /// A step failed. The run still counts as successful; artifact generation,
    /// not propagation, defines success.
    Failed { step: PublishStep },
}

/// Best-effort publish: if the working tree has changes, stage everything,
/// commit with the given message, and push. Failures are logged and absorbed.
pub fn publish_if_changed(publisher: &dyn Publisher, message: &str) -> PublishOutcome {
    log::info!("checking for changes to commit");
    let status = match publisher.status() {
        Ok(status) => status,
        Err(err) => {
            log::warn!("could not query working tree status: {err}");
            return PublishOutcome::Failed {
                step: PublishStep::Status,
            };
        }
    };
    if status.trim().is_empty() {
        log::info!("no changes to commit");
        return PublishOutcome::NoChanges;
    }

    if let Err(err) = publisher.stage_all() {
        log::warn!("failed to stage changes: {err}");
        return PublishOutcome::Failed {
            step: PublishStep::Stage,
        };
    }

    log::info!("committing: {message}");
    if let Err(err) = publisher.commit(message) {
        log::warn!("failed to commit: {err}");
        return PublishOutcome::Failed {
            step: PublishStep::Commit,
        };
    }

    if let Err(err) = publisher.push() {
        log::error!("failed to push to remote: {err}");
        return PublishOutcome::Failed {
            step: PublishStep::Push,
        };
    }

    log::info!("pushed to remote");
    PublishOutcome::Pushed
}
