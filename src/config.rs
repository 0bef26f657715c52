//! Runtime configuration for the two GC-affecting knobs callers must set explicitly, plus the
//! cache directory path.
//!
//! A full admin-editable section-config parser exists to handle a whole datacenter of `.cfg`
//! files; this crate only has two numeric knobs and a path, supplied per invocation, so it is
//! loaded from the environment directly instead (noted as a dropped dependency in DESIGN.md).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Error};

pub struct GcConfig {
    pub batch_size: usize,
    pub min_gc_mark_age: Duration,
    pub cache_dir: PathBuf,
}

impl GcConfig {
    pub fn new(batch_size: usize, min_gc_mark_age: Duration, cache_dir: PathBuf) -> Result<Self, Error> {
        if batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        Ok(GcConfig {
            batch_size,
            min_gc_mark_age,
            cache_dir,
        })
    }

    /// `REPOGC_BATCH_SIZE` defaults to 1000 if unset; the cache directory defaults to
    /// [`repogc_buildcfg::REPOGC_CACHE_DIR`]. `REPOGC_MIN_GC_MARK_AGE_SECS` is safety-critical
    /// (it gates how long marked content is quarantined before repair may purge it) and has no
    /// default — callers must set it explicitly.
    pub fn from_env() -> Result<Self, Error> {
        let batch_size = match std::env::var("REPOGC_BATCH_SIZE") {
            Ok(val) => val.parse().context("invalid REPOGC_BATCH_SIZE")?,
            Err(_) => 1000,
        };
        let min_gc_mark_age_secs: u64 = std::env::var("REPOGC_MIN_GC_MARK_AGE_SECS")
            .context("REPOGC_MIN_GC_MARK_AGE_SECS must be set explicitly")?
            .parse()
            .context("invalid REPOGC_MIN_GC_MARK_AGE_SECS")?;
        let cache_dir = std::env::var("REPOGC_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(repogc_buildcfg::REPOGC_CACHE_DIR));

        GcConfig::new(batch_size, Duration::from_secs(min_gc_mark_age_secs), cache_dir)
    }
}
