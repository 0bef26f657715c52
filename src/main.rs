//! `repogc` — standalone driver for the committed-content index cache and GC mark/repair core.
//!
//! This binary is deliberately thin: it parses a handful of subcommands by hand, sets up logging,
//! and calls straight into `repogc-store`. The `demo mark`/`demo repair` subcommands run against
//! the in-memory reference store (`repogc_store::MemStore`), since this crate does not ship a
//! production blob/content/manifest backend — that integration is the deploying application's
//! job.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Error};
use log::info;

use repogc::{CliWorker, GcConfig};
use repogc_api_types::{BlobId, ContentId};
use repogc_store::{run_mark, run_repair, DiskIndexCache, MemStore};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    CliWorker::install_sigint_handler();

    if let Err(err) = run() {
        eprintln!("repogc: error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let subcommand = args.next().context("usage: repogc <cache|demo> ...")?;

    match subcommand.as_str() {
        "cache" => run_cache(args),
        "demo" => run_demo(args),
        other => bail!("unknown subcommand '{}' (expected 'cache' or 'demo')", other),
    }
}

fn run_cache(mut args: impl Iterator<Item = String>) -> Result<(), Error> {
    let action = args.next().context("usage: repogc cache <has|add|expire> ...")?;
    let config = GcConfig::from_env()?;
    let cache = DiskIndexCache::new(config.cache_dir.clone());

    match action.as_str() {
        "has" => {
            let blob_id = BlobId::from(args.next().context("usage: repogc cache has <blob-id>")?);
            println!("{}", cache.has(&blob_id)?);
        }
        "add" => {
            let blob_id = BlobId::from(args.next().context("usage: repogc cache add <blob-id> <file>")?);
            let path = PathBuf::from(args.next().context("usage: repogc cache add <blob-id> <file>")?);
            let bytes = std::fs::read(&path).with_context(|| format!("reading {:?}", path))?;
            cache.add(&blob_id, &bytes)?;
            info!("added {} to cache at {:?}", blob_id, cache.dir());
        }
        "expire" => {
            let in_use: std::collections::HashSet<BlobId> = args.map(BlobId::from).collect();
            let removed = cache.expire_unused(&in_use)?;
            info!("expired {} stale cache entries", removed);
        }
        other => bail!("unknown cache action '{}' (expected 'has', 'add', or 'expire')", other),
    }
    Ok(())
}

fn run_demo(mut args: impl Iterator<Item = String>) -> Result<(), Error> {
    let action = args.next().context("usage: repogc demo <mark|repair>")?;
    let config = GcConfig::from_env()?;

    match action.as_str() {
        "mark" => {
            let count: usize = args
                .next()
                .context("usage: repogc demo mark <content-count>")?
                .parse()
                .context("content-count must be a number")?;

            let store = MemStore::new();
            let to_delete: Vec<ContentId> = (0..count)
                .map(|i| {
                    let id = ContentId::from(format!("demo-{:06}", i));
                    store.seed_content(id.clone(), format!("payload {}", i).into_bytes());
                    id
                })
                .collect();

            let status = run_mark(&store, &store, &CliWorker, to_delete.into_iter(), vec![], config.batch_size)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        "repair" => {
            let store = MemStore::new();
            let status = run_repair(&store, &store, &store, &CliWorker, config.min_gc_mark_age)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        other => bail!("unknown demo action '{}' (expected 'mark' or 'repair')", other),
    }
    Ok(())
}
