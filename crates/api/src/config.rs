// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-driven configuration (spec.md §6 "Environment/config").

use std::path::PathBuf;
use std::time::Duration;

/// Resolved server configuration. Every field has a default so the server
/// boots with no environment at all, matching `original_source`'s
/// `BaseConfig` defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub library_root: PathBuf,
    pub database_url: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub worker_pool_size: usize,
    pub separator_binary: String,
    pub separator_model: String,
    pub separator_device: String,
    pub mp3_bitrate: String,
    pub ytdlp_binary: String,
    pub provider_contact_email: Option<String>,
    pub stuck_job_threshold: Duration,
}

impl Config {
    /// Load from environment, falling back to development-friendly
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            library_root: library_root(),
            database_url: database_url(),
            bind_addr: bind_addr(),
            cors_origins: cors_origins(),
            worker_pool_size: worker_pool_size(),
            separator_binary: env_or("OKS_SEPARATOR_BINARY", "demucs"),
            separator_model: env_or("OKS_SEPARATOR_MODEL", "htdemucs_ft"),
            separator_device: env_or("OKS_SEPARATOR_DEVICE", "auto"),
            mp3_bitrate: env_or("OKS_MP3_BITRATE", "320"),
            ytdlp_binary: env_or("OKS_YTDLP_BINARY", "yt-dlp"),
            provider_contact_email: std::env::var("OKS_PROVIDER_CONTACT_EMAIL").ok().filter(|s| !s.is_empty()),
            stuck_job_threshold: stuck_job_threshold(),
        }
    }

    /// Env-independent defaults for tests, so parallel test threads never
    /// race `config_tests`'s environment mutations.
    #[cfg(any(test, feature = "test-support"))]
    pub fn for_tests(library_root: PathBuf) -> Self {
        Self {
            library_root,
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            cors_origins: vec!["*".to_string()],
            worker_pool_size: 1,
            separator_binary: "demucs".to_string(),
            separator_model: "htdemucs_ft".to_string(),
            separator_device: "cpu".to_string(),
            mp3_bitrate: "320".to_string(),
            ytdlp_binary: "yt-dlp".to_string(),
            provider_contact_email: None,
            stuck_job_threshold: Duration::from_secs(300),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|s| !s.is_empty()).unwrap_or_else(|| default.to_string())
}

/// `OKS_LIBRARY_ROOT`, defaulting to `./karaoke_library` (matches
/// `original_source`'s `BASE_LIBRARY_DIR`).
fn library_root() -> PathBuf {
    std::env::var("OKS_LIBRARY_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./karaoke_library"))
}

/// `OKS_DATABASE_URL`, defaulting to a sibling `karaoke.db` file.
fn database_url() -> String {
    env_or("OKS_DATABASE_URL", "sqlite://karaoke.db")
}

/// `OKS_BIND_ADDR`, defaulting to `0.0.0.0:5123` (port matches
/// `original_source`'s Flask `PORT` default).
fn bind_addr() -> String {
    env_or("OKS_BIND_ADDR", "0.0.0.0:5123")
}

/// `OKS_CORS_ORIGINS` as a comma-separated list; empty/unset means
/// wildcard, matching `original_source`'s `DEFAULT_CORS_ORIGINS`.
fn cors_origins() -> Vec<String> {
    std::env::var("OKS_CORS_ORIGINS")
        .ok()
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect::<Vec<_>>())
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| vec!["*".to_string()])
}

/// `OKS_WORKER_POOL_SIZE`, defaulting to 1 (spec.md §4.9: "default 1 for
/// CPU-only hosts").
fn worker_pool_size() -> usize {
    std::env::var("OKS_WORKER_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// `OKS_STUCK_JOB_THRESHOLD_SECS`, defaulting to 300s (spec.md §4.9 restart
/// reconciliation).
fn stuck_job_threshold() -> Duration {
    std::env::var("OKS_STUCK_JOB_THRESHOLD_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(300))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
