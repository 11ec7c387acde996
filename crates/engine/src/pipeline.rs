// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job pipeline: download (if URL-sourced) → enrich → separate →
//! finalize (spec.md §4.8).

use oks_adapters::{LyricsProvider, MetadataProvider, ProgressCallback, StemSeparator, VideoDownloader};
use oks_artifacts::ArtifactLayout;
use oks_core::{Clock, Error, Job, JobId, JobStatus, Result, Song, SongSource};
use oks_storage::{JobStore, SongStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Progress bands from spec.md §4.8. Each phase's own 0-100 progress is
/// linearly remapped into its band before being persisted.
mod bands {
    pub const DISPATCHED: u8 = 5;
    pub const DOWNLOAD_START: u8 = 5;
    pub const DOWNLOAD_END: u8 = 30;
    pub const SEPARATE_START: u8 = 30;
    pub const SEPARATE_END: u8 = 90;
    pub const FINALIZE_START: u8 = 90;
    pub const FINALIZE_END: u8 = 99;
    pub const DONE: u8 = 100;
}

fn remap(fraction: f32, start: u8, end: u8) -> u8 {
    let span = (end - start) as f32;
    (start as f32 + fraction.clamp(0.0, 1.0) * span).round() as u8
}

/// Everything the pipeline needs to process one job, independent of the
/// scheduler that dispatches it.
pub struct JobWorker<C: Clock> {
    pub jobs: Arc<JobStore>,
    pub songs: Arc<SongStore>,
    pub layout: ArtifactLayout,
    pub downloader: Arc<dyn VideoDownloader>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub lyrics: Arc<dyn LyricsProvider>,
    pub separator: Arc<dyn StemSeparator>,
    pub clock: C,
}

/// Outcome the dispatcher logs; carries no data beyond success/failure since
/// the job row itself is the durable record of what happened.
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed,
}

impl<C: Clock> JobWorker<C> {
    /// Run one job end to end. Never panics on adapter failure: every error
    /// path is caught and turned into `job.fail(...)` (spec.md §7).
    pub async fn run_job(&self, job_id: JobId, cancel: CancellationToken) -> RunOutcome {
        let mut job = match self.fetch_job_with_retry(&job_id).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "could not fetch job row after retries, giving up");
                return RunOutcome::Failed;
            }
        };

        let song = match self.songs.get(&job.song_id).await {
            Ok(song) => song,
            Err(e) => {
                self.finish_failed(&mut job, format!("song lookup failed: {e}")).await;
                return RunOutcome::Failed;
            }
        };

        match self.run_phases(&mut job, song, &cancel).await {
            Ok(()) => RunOutcome::Completed,
            Err(PipelineStop::Cancelled) => {
                self.finish_cancelled(&mut job).await;
                RunOutcome::Cancelled
            }
            Err(PipelineStop::Failed(msg)) => {
                self.finish_failed(&mut job, msg).await;
                RunOutcome::Failed
            }
        }
    }

    /// spec.md §4.8: only the "fetch the job row" step is retried, up to 3
    /// times with 2s/4s/8s backoff, to tolerate writer-vs-reader commit
    /// races against the store that just persisted this job.
    async fn fetch_job_with_retry(&self, job_id: &JobId) -> Result<Job> {
        let delays = [Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)];
        let mut last_err = None;
        for (attempt, delay) in std::iter::once(Duration::ZERO).chain(delays).enumerate() {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
            }
            match self.jobs.get(job_id).await {
                Ok(job) => return Ok(job),
                Err(e) => {
                    warn!(job_id = %job_id, attempt, error = %e, "fetch job row failed, retrying");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::NotFound(format!("job {job_id}"))))
    }

    async fn run_phases(&self, job: &mut Job, mut song: Song, cancel: &CancellationToken) -> std::result::Result<(), PipelineStop> {
        self.advance(job, job.status, bands::DISPATCHED, None).await?;
        check_cancel(cancel)?;

        if matches!(song.source, SongSource::Youtube) {
            self.advance(job, JobStatus::Downloading, bands::DOWNLOAD_START, Some("downloading".into())).await?;
            self.run_download(job, &mut song, cancel).await?;
        }

        self.run_enrich(&song).await;
        check_cancel(cancel)?;

        self.advance(job, JobStatus::Processing, bands::SEPARATE_START, Some("separating stems".into())).await?;
        self.run_separate(job, &mut song, cancel).await?;

        self.advance(job, JobStatus::Finalizing, bands::FINALIZE_START, Some("finalizing".into())).await?;
        self.run_finalize(job, &mut song).await?;

        self.advance(job, JobStatus::Completed, bands::DONE, Some("completed".into())).await?;
        Ok(())
    }

    async fn run_download(&self, job: &mut Job, song: &mut Song, cancel: &CancellationToken) -> std::result::Result<(), PipelineStop> {
        let Some(video_id) = song.video_id.clone() else {
            return Err(PipelineStop::Failed("youtube-sourced song has no video_id".to_string()));
        };
        let song_dir = self.layout.song_dir(&song.id).await.map_err(to_stop)?;

        let downloaded = self
            .downloader
            .download(&video_id, &song_dir)
            .await
            .map_err(to_stop)?;

        song.original_path = Some("original.mp3".to_string());
        if song.title.is_empty() || song.title == "Unknown Title" {
            song.title = downloaded.title.clone();
        }
        if song.uploader.is_none() {
            song.uploader = downloaded.uploader.clone();
        }
        song.channel_id = downloaded.channel_id.clone();
        song.upload_date = downloaded.upload_date.clone();
        if song.duration_ms.is_none() {
            song.duration_ms = downloaded.duration_ms;
        }
        self.songs.update(song).await.map_err(to_stop)?;

        check_cancel(cancel)?;
        self.advance(job, JobStatus::Downloading, bands::DOWNLOAD_END, Some("download complete".into())).await?;
        Ok(())
    }

    /// Attempt iTunes metadata/cover-art enrichment. Failures here are
    /// non-fatal: a missing cover or a 404 from the provider never fails the
    /// job (spec.md §4.4).
    async fn run_enrich(&self, song: &Song) {
        match self.metadata.search(&song.artist, &song.title, song.album.as_deref(), 1).await {
            Ok(matches) if !matches.is_empty() => {
                let m = &matches[0];
                if let Err(e) = self.metadata.download_cover_art(&song.id, m).await {
                    warn!(song_id = %song.id, error = %e, "cover art download failed, continuing without it");
                }
            }
            Ok(_) => info!(song_id = %song.id, "no itunes match found"),
            Err(e) => warn!(song_id = %song.id, error = %e, "itunes enrichment failed, continuing"),
        }
    }

    async fn run_separate(&self, job: &mut Job, song: &mut Song, cancel: &CancellationToken) -> std::result::Result<(), PipelineStop> {
        let song_dir = self.layout.song_dir(&song.id).await.map_err(to_stop)?;
        let ext = song
            .original_path
            .as_deref()
            .and_then(|p| p.rsplit('.').next())
            .unwrap_or("mp3")
            .to_string();
        let input_path = song_dir.join(song.original_path.clone().unwrap_or_else(|| format!("original.{ext}")));

        if cancel.is_cancelled() {
            return Err(PipelineStop::Cancelled);
        }

        // The separator reports 0.0..=1.0 progress from its own thread; remap
        // it into the separation band and hand it to a reporter task so the
        // persisted job row gets periodic updates without racing the phase
        // transitions this function makes itself.
        let last_fraction = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let callback: ProgressCallback = {
            let last_fraction = last_fraction.clone();
            Box::new(move |fraction: f32| {
                last_fraction.store(fraction.clamp(0.0, 1.0).to_bits(), std::sync::atomic::Ordering::Relaxed);
            })
        };
        let reporter = self.spawn_progress_reporter(job.id, last_fraction.clone());

        let output = self.separator.separate(&input_path, &song_dir, &ext, &callback, cancel).await;
        reporter.abort();
        let output = match output {
            Ok(output) => output,
            Err(Error::Cancelled(_)) => return Err(PipelineStop::Cancelled),
            Err(e) => return Err(to_stop(e)),
        };
        song.vocals_path = output.vocals_path.file_name().and_then(|n| n.to_str()).map(|s| s.to_string());
        song.instrumental_path = output.instrumental_path.file_name().and_then(|n| n.to_str()).map(|s| s.to_string());
        song.refresh_has_audio_files();
        self.songs.update(song).await.map_err(to_stop)?;

        check_cancel(cancel)?;
        self.advance(job, JobStatus::Processing, bands::SEPARATE_END, Some("stems written".into())).await?;
        Ok(())
    }

    async fn run_finalize(&self, job: &mut Job, song: &mut Song) -> std::result::Result<(), PipelineStop> {
        if song.plain_lyrics.is_none() && song.synced_lyrics.is_none() {
            match self.lyrics.search(&song.artist, &song.title, song.album.as_deref(), song.duration_ms).await {
                Ok(result) if !result.is_empty() => {
                    song.plain_lyrics = result.plain_lyrics;
                    song.synced_lyrics = result.synced_lyrics;
                }
                Ok(_) => {}
                Err(e) => warn!(song_id = %song.id, error = %e, "lyrics lookup failed, continuing"),
            }
        }

        if let Some(cover) = self.layout.cover_path(&song.id).await {
            song.cover_path = cover.file_name().and_then(|n| n.to_str()).map(|s| s.to_string());
        }
        if let Some(thumb) = self.layout.thumbnail_path(&song.id).await {
            song.thumbnail_path = thumb.file_name().and_then(|n| n.to_str()).map(|s| s.to_string());
        }
        song.refresh_has_audio_files();
        self.songs.update(song).await.map_err(to_stop)?;

        self.advance(job, JobStatus::Finalizing, bands::FINALIZE_END, Some("finalized".into())).await?;
        Ok(())
    }

    /// Poll `last_fraction` every 500ms and persist its remapped progress,
    /// stopping when the returned handle is aborted.
    fn spawn_progress_reporter(&self, job_id: JobId, last_fraction: Arc<std::sync::atomic::AtomicU32>) -> tokio::task::JoinHandle<()> {
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            let mut last_reported = 0u8;
            loop {
                tokio::time::sleep(Duration::from_millis(500)).await;
                let fraction = f32::from_bits(last_fraction.load(std::sync::atomic::Ordering::Relaxed));
                let pct = remap(fraction, bands::SEPARATE_START, bands::SEPARATE_END);
                if pct <= last_reported {
                    continue;
                }
                last_reported = pct;
                if let Ok(mut j) = jobs.get(&job_id).await {
                    if j.status == JobStatus::Processing && pct > j.progress {
                        j.progress = pct;
                        j.status_message = Some("separating stems".into());
                        let _ = jobs.update(&j).await;
                    }
                }
            }
        })
    }

    async fn advance(&self, job: &mut Job, next: JobStatus, progress: u8, message: Option<String>) -> std::result::Result<(), PipelineStop> {
        if job.status != next {
            job.advance(next, progress, message, &self.clock).map_err(to_stop)?;
        } else {
            job.progress = job.progress.max(progress);
            job.status_message = message;
        }
        self.jobs.update(job).await.map_err(to_stop)?;
        Ok(())
    }

    async fn finish_cancelled(&self, job: &mut Job) {
        if let Err(e) = self.layout.delete_song(&job.song_id).await {
            warn!(job_id = %job.id, error = %e, "failed to delete song directory after cancel");
        }
        job.cancel(&self.clock);
        if let Err(e) = self.jobs.update(job).await {
            warn!(job_id = %job.id, error = %e, "failed to persist cancelled job");
        }
    }

    async fn finish_failed(&self, job: &mut Job, message: String) {
        job.fail(message, &self.clock);
        if let Err(e) = self.jobs.update(job).await {
            warn!(job_id = %job.id, error = %e, "failed to persist failed job");
        }
    }
}

enum PipelineStop {
    Cancelled,
    Failed(String),
}

fn to_stop(e: Error) -> PipelineStop {
    PipelineStop::Failed(e.to_string())
}

fn check_cancel(cancel: &CancellationToken) -> std::result::Result<(), PipelineStop> {
    if cancel.is_cancelled() {
        Err(PipelineStop::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
