//! Thin CLI-facing wiring around [`repogc_store`]: configuration and a standalone-process
//! [`GcWorker`](repogc_store::GcWorker) implementation. The GC core itself lives entirely in
//! `repogc-store`; everything here is glue a real deployment would replace with its own
//! config loader and task-tracking context.

pub mod config;
pub mod worker;

pub use config::GcConfig;
pub use worker::CliWorker;
