// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vocal/instrumental stem separation (spec.md §4.6).
//!
//! The reference implementation calls Demucs in-process via torch; that's
//! not a reasonable dependency for this workspace, so separation is done by
//! shelling out to a `demucs`-compatible CLI and parsing its line-oriented
//! progress output.

use async_trait::async_trait;
use oks_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Output of a completed separation: absolute paths to both stems.
#[derive(Debug, Clone)]
pub struct SeparationOutput {
    pub vocals_path: PathBuf,
    pub instrumental_path: PathBuf,
}

/// Progress callback invoked as the separator reports completion percentage.
pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// Separates a mixed audio file into vocal and instrumental stems.
#[async_trait]
pub trait StemSeparator: Send + Sync {
    /// `cancel` is polled between stems and while waiting on progress output
    /// (spec.md §4.6); on cancellation this returns `Err(Error::Cancelled)`
    /// without leaving partial output files behind.
    async fn separate(
        &self,
        input_path: &Path,
        output_dir: &Path,
        output_extension: &str,
        on_progress: &ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<SeparationOutput>;
}

/// Runs an external demucs-compatible binary as a subprocess.
///
/// Invokes `<binary> --two-stems vocals -n <model> -d <device> -o <output_dir>
/// <input_path>` and expects it to write `<output_dir>/<model>/<stem>/{vocals,no_vocals}.<ext>`,
/// mirroring demucs' own `--two-stems` output layout. Progress lines of the
/// form `progress: NN%` are parsed and forwarded to the caller; anything else
/// on stdout/stderr is logged at debug level and otherwise ignored.
pub struct SubprocessSeparator {
    binary: String,
    model: String,
    device: String,
}

impl SubprocessSeparator {
    pub fn new(binary: impl Into<String>, model: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            device: device.into(),
        }
    }
}

#[async_trait]
impl StemSeparator for SubprocessSeparator {
    async fn separate(
        &self,
        input_path: &Path,
        output_dir: &Path,
        output_extension: &str,
        on_progress: &ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<SeparationOutput> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::StorageFailure(format!("create separation output dir: {e}")))?;

        // GPU if available and initializable, else CPU; reported through
        // on_progress before any separation work begins (spec.md §4.6).
        let device = self.resolve_device().await;
        on_progress_message(on_progress, 0.0, &format!("device: {device}"));

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--two-stems")
            .arg("vocals")
            .arg("-n")
            .arg(&self.model)
            .arg("-d")
            .arg(&device)
            .arg("--mp3")
            .arg("-o")
            .arg(output_dir)
            .arg(input_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::SeparationError(format!("failed to spawn {}: {e}", self.binary)))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.start_kill();
            return Err(Error::SeparationError("separator child has no stdout pipe".to_string()));
        };
        let mut lines = BufReader::new(stdout).lines();

        loop {
            let next_line = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Err(Error::Cancelled("separation cancelled".to_string()));
                }
                line = lines.next_line() => line,
            };
            match next_line.map_err(|e| Error::SeparationError(format!("reading separator stdout: {e}")))? {
                Some(line) => {
                    if let Some(pct) = parse_progress_line(&line) {
                        on_progress(pct);
                    } else {
                        info!(%line, "separator output");
                    }
                }
                None => break,
            }
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(Error::Cancelled("separation cancelled".to_string()));
            }
            status = child.wait() => status.map_err(|e| Error::SeparationError(format!("waiting for separator: {e}")))?,
        };

        if !status.success() {
            return Err(Error::SeparationError(format!("separator exited with {status}")));
        }

        let model_dir = output_dir.join(&self.model).join(stem_name(input_path));
        let raw_vocals_path = model_dir.join(format!("vocals.{output_extension}"));
        let raw_instrumental_path = model_dir.join(format!("no_vocals.{output_extension}"));

        if !raw_vocals_path.exists() || !raw_instrumental_path.exists() {
            return Err(Error::SeparationError(
                "separator finished but expected output files are missing".to_string(),
            ));
        }

        // demucs writes into its own `<model>/<stem>/{vocals,no_vocals}.<ext>`
        // subtree; move both stems up into the canonical `<song_dir>/
        // {vocals,instrumental}.<ext>` layout (spec.md §4.3) before anyone
        // else looks at `output_dir`.
        let vocals_path = output_dir.join(format!("vocals.{output_extension}"));
        let instrumental_path = output_dir.join(format!("instrumental.{output_extension}"));
        tokio::fs::rename(&raw_vocals_path, &vocals_path)
            .await
            .map_err(|e| Error::StorageFailure(format!("move separated vocals into place: {e}")))?;
        tokio::fs::rename(&raw_instrumental_path, &instrumental_path)
            .await
            .map_err(|e| Error::StorageFailure(format!("move separated instrumental into place: {e}")))?;
        let _ = tokio::fs::remove_dir_all(output_dir.join(&self.model)).await;

        on_progress(1.0);
        Ok(SeparationOutput { vocals_path, instrumental_path })
    }
}

fn on_progress_message(on_progress: &ProgressCallback, fraction: f32, message: &str) {
    info!("{message}");
    on_progress(fraction);
}

impl SubprocessSeparator {
    /// Probes for a usable GPU by checking for an NVIDIA driver; falls back
    /// to CPU. `self.device` overrides this when set to anything other than
    /// `"auto"` (spec.md §4.6).
    async fn resolve_device(&self) -> String {
        if self.device != "auto" {
            return self.device.clone();
        }
        let has_gpu = Command::new("nvidia-smi")
            .arg("-L")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);
        if has_gpu {
            "cuda".to_string()
        } else {
            "cpu".to_string()
        }
    }
}

fn stem_name(input_path: &Path) -> String {
    input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("original")
        .to_string()
}

/// Parse a `progress: NN%`-shaped line into a `0.0..=1.0` fraction.
fn parse_progress_line(line: &str) -> Option<f32> {
    let rest = line.strip_prefix("progress:")?.trim();
    let pct = rest.strip_suffix('%')?.trim();
    let value: f32 = pct.parse().ok()?;
    Some((value / 100.0).clamp(0.0, 1.0))
}

/// Test double that copies the input file to both stem paths without
/// shelling out, so worker-pipeline tests run without a demucs binary.
#[cfg(any(test, feature = "test-support"))]
pub struct NullSeparator;

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl StemSeparator for NullSeparator {
    async fn separate(
        &self,
        input_path: &Path,
        output_dir: &Path,
        output_extension: &str,
        on_progress: &ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<SeparationOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled("separation cancelled".to_string()));
        }
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::StorageFailure(e.to_string()))?;
        let vocals_path = output_dir.join(format!("vocals.{output_extension}"));
        let instrumental_path = output_dir.join(format!("instrumental.{output_extension}"));
        let bytes = tokio::fs::read(input_path).await.unwrap_or_default();
        tokio::fs::write(&vocals_path, &bytes).await.map_err(|e| Error::StorageFailure(e.to_string()))?;
        tokio::fs::write(&instrumental_path, &bytes).await.map_err(|e| Error::StorageFailure(e.to_string()))?;
        on_progress(1.0);
        warn!("NullSeparator used — no real stem separation performed");
        Ok(SeparationOutput { vocals_path, instrumental_path })
    }
}

#[cfg(test)]
#[path = "separator_tests.rs"]
mod tests;
