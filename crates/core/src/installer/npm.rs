// crates/core/src/installer/npm.rs
//! npm installer: spawns `npm install -g <spec>` and captures its output.

use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::{InstallFailure, PackageInstaller};
use crate::types::{PackageSpec, RegistryType};

/// Maximum combined output retained per install (10 MiB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

const TRUNCATED_MARKER: &str = "[output truncated]\n";

/// Installs packages globally with npm.
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    program: String,
}

impl NpmInstaller {
    /// Use `npm` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("npm")
    }

    /// Use a specific npm executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageInstaller for NpmInstaller {
    fn registry(&self) -> RegistryType {
        RegistryType::Npm
    }

    async fn install(&self, package: &PackageSpec) -> Result<String, InstallFailure> {
        let spec = package.to_string();
        let t0 = Instant::now();
        tracing::info!(program = %self.program, package = %spec, "npm: spawning install");

        let mut cmd = Command::new(&self.program);
        cmd.args(["install", "-g", &spec])
            // Null stdin so npm never blocks on a prompt
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            tracing::error!(program = %self.program, error = %e, "npm: failed to spawn");
            InstallFailure::new("", format!("failed to start {}: {e}", self.program))
        })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(InstallFailure::new("", "failed to capture npm output"));
        };

        // Interleave both streams line by line, in arrival order. Partial reads
        // stay in each buffer when the other branch wins the select.
        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);
        let (mut out_buf, mut err_buf) = (Vec::new(), Vec::new());
        let (mut out_open, mut err_open) = (true, true);
        let mut output = CombinedOutput::default();
        while out_open || err_open {
            tokio::select! {
                read = stdout.read_until(b'\n', &mut out_buf), if out_open => {
                    out_open = output.take_chunk(read, &mut out_buf);
                }
                read = stderr.read_until(b'\n', &mut err_buf), if err_open => {
                    err_open = output.take_chunk(read, &mut err_buf);
                }
            }
        }

        let status = child.wait().await.map_err(|e| {
            InstallFailure::new(output.as_str(), format!("failed to wait for {}: {e}", self.program))
        })?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;
        let output = output.into_string();

        if status.success() {
            tracing::info!(package = %spec, elapsed_ms, "npm: install finished");
            Ok(output)
        } else {
            let detail = describe_exit(status);
            tracing::warn!(package = %spec, elapsed_ms, exit = %detail, "npm: install failed");
            Err(InstallFailure::new(output, detail))
        }
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => status.to_string(),
    }
}

/// Output buffer capped at [`MAX_OUTPUT_BYTES`].
#[derive(Default)]
struct CombinedOutput {
    buf: String,
    truncated: bool,
}

impl CombinedOutput {
    /// Move a completed read from `buf` into the output. Returns whether the
    /// stream is still open.
    fn take_chunk(&mut self, read: std::io::Result<usize>, buf: &mut Vec<u8>) -> bool {
        let open = match read {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "npm: error reading output");
                false
            }
        };
        if !buf.is_empty() {
            self.push_chunk(buf);
            buf.clear();
        }
        open
    }

    /// Append bytes as written by the process, delimiters included.
    fn push_chunk(&mut self, chunk: &[u8]) {
        if self.truncated {
            return;
        }
        let chunk = String::from_utf8_lossy(chunk);
        if self.buf.len() + chunk.len() > MAX_OUTPUT_BYTES {
            self.buf.push_str(TRUNCATED_MARKER);
            self.truncated = true;
            return;
        }
        self.buf.push_str(&chunk);
    }

    fn as_str(&self) -> &str {
        &self.buf
    }

    fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, version: Option<&str>) -> PackageSpec {
        PackageSpec {
            name: name.to_string(),
            version: version.map(str::to_string),
        }
    }

    #[test]
    fn test_combined_output_truncates() {
        let mut out = CombinedOutput::default();
        let big = vec![b'a'; MAX_OUTPUT_BYTES - 10];
        out.push_chunk(b"first\n");
        out.push_chunk(&big);
        out.push_chunk(b"dropped\n");

        let s = out.into_string();
        assert!(s.starts_with("first\n"));
        assert!(s.ends_with(TRUNCATED_MARKER));
        assert!(!s.contains("dropped"));
    }

    #[test]
    fn test_combined_output_lossy_utf8() {
        let mut out = CombinedOutput::default();
        out.push_chunk(&[0x66, 0x6f, 0xff, 0x6f, b'\n']);
        assert_eq!(out.into_string(), "fo\u{fffd}o\n");
    }

    #[test]
    fn test_take_chunk_keeps_bytes_verbatim() {
        let mut out = CombinedOutput::default();
        let mut buf = b"added 1 package\n".to_vec();
        assert!(out.take_chunk(Ok(buf.len()), &mut buf));
        assert!(buf.is_empty());

        // Final chunk without a trailing newline, then EOF.
        let mut buf = b"done".to_vec();
        assert!(out.take_chunk(Ok(4), &mut buf));
        assert!(!out.take_chunk(Ok(0), &mut buf));
        assert_eq!(out.into_string(), "added 1 package\ndone");
    }

    #[test]
    fn test_take_chunk_flushes_partial_read_on_eof() {
        let mut out = CombinedOutput::default();
        let mut buf = b"partial".to_vec();
        assert!(!out.take_chunk(Ok(0), &mut buf));
        assert_eq!(out.into_string(), "partial");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_success_captures_output() {
        // `echo` stands in for npm and prints the arguments it was given.
        let installer = NpmInstaller::with_program("echo");
        let output = installer
            .install(&spec("left-pad", Some("1.3.0")))
            .await
            .unwrap();
        assert_eq!(output, "install -g left-pad@1.3.0\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_output_without_trailing_newline() {
        // `printf` uses its first argument as the format and prints no newline.
        let installer = NpmInstaller::with_program("printf");
        let output = installer.install(&spec("left-pad", None)).await.unwrap();
        assert_eq!(output, "install");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_nonzero_exit_fails() {
        let installer = NpmInstaller::with_program("false");
        let err = installer.install(&spec("left-pad", None)).await.unwrap_err();
        assert_eq!(err.detail, "exit status 1");
        assert_eq!(err.output, "");
    }

    #[tokio::test]
    async fn test_install_missing_program_fails() {
        let installer = NpmInstaller::with_program("definitely-not-a-real-npm-binary");
        let err = installer.install(&spec("left-pad", None)).await.unwrap_err();
        assert!(err.detail.starts_with("failed to start definitely-not-a-real-npm-binary"));
    }

    #[test]
    fn test_registry_is_npm() {
        assert_eq!(NpmInstaller::new().registry(), RegistryType::Npm);
        assert_eq!(NpmInstaller::default().program(), "npm");
    }
}
