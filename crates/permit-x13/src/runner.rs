//! Engine subprocess and its transient work directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, X13Error};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// File stem of the spec and every artifact inside a work directory.
pub const SPEC_STEM: &str = "series";

/// A per-invocation directory, removed when dropped.
///
/// Removal failures are reported as a `ResourceCleanupWarning` and never
/// propagated.
pub(crate) struct WorkDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl WorkDir {
    pub(crate) fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("x13-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| X13Error::io(parent.unwrap_or_else(|| Path::new("<temp>")), e))?;
        let path = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Path prefix handed to the engine; artifacts are `<prefix>.<ext>`.
    pub(crate) fn prefix(&self) -> PathBuf {
        self.path.join(SPEC_STEM)
    }

    pub(crate) fn artifact(&self, extension: &str) -> PathBuf {
        self.prefix().with_extension(extension)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take()
            && let Err(error) = dir.close()
        {
            warn!(
                path = %self.path.display(),
                %error,
                "ResourceCleanupWarning: failed to remove engine work directory"
            );
        }
    }
}

/// What the engine printed and how it exited.
#[derive(Debug)]
pub(crate) struct EngineOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Runs `binary <prefix> <prefix>` and waits for it.
///
/// Output pipes are drained on their own threads so a chatty engine never
/// blocks on a full pipe.
pub(crate) fn run_engine(
    binary: &Path,
    prefix: &Path,
    timeout: Option<Duration>,
) -> Result<EngineOutput> {
    debug!(binary = %binary.display(), prefix = %prefix.display(), "starting engine");
    let mut child = Command::new(binary)
        .arg(prefix)
        .arg(prefix)
        .current_dir(prefix.parent().unwrap_or_else(|| Path::new(".")))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| X13Error::Spawn {
            binary: binary.to_path_buf(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let status = wait(&mut child, timeout).map_err(|e| X13Error::io(binary, e))?;

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    match (status, timeout) {
        (Some(status), _) => {
            debug!(%status, "engine finished");
            Ok(EngineOutput {
                status,
                stdout,
                stderr,
            })
        }
        (None, Some(timeout)) => Err(X13Error::Timeout(timeout)),
        (None, None) => Err(X13Error::EngineExit {
            status: "unknown".to_string(),
            stderr,
        }),
    }
}
