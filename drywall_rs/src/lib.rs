//! # drywall
//!
//! Core logic for DRYwall, a code-duplication detection tool built on top of
//! [jscpd](https://jscpd.dev). DRYwall does not detect clones itself - it
//! merges project configuration with per-call options into jscpd CLI flags,
//! runs jscpd as a subprocess, and distills its JSON report into a compact,
//! impact-ranked summary.
//!
//! ## Pipeline
//!
//! ```rust,no_run
//! use std::path::Path;
//! use drywall::{args, config, report, runner};
//!
//! # async fn detect() -> anyhow::Result<()> {
//! let config = config::DrywallConfig::load(Path::new("."));
//! let report_dir = tempfile::tempdir()?;
//!
//! let mut cli_args = args::build_args(&config, &serde_json::Map::new(), report_dir.path());
//! cli_args.push(".".to_string());
//!
//! let version = config.jscpd_version().unwrap_or(runner::DEFAULT_JSCPD_VERSION);
//! runner::run_jscpd(version, &cli_args, runner::DEFAULT_TIMEOUT).await?;
//!
//! let raw = std::fs::read_to_string(report_dir.path().join(runner::REPORT_FILE_NAME))?;
//! let result = report::reduce_report(&raw, report::ReduceLimits::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! `args` and `report` are pure; `config` and `runner` do the I/O.

pub mod args;
pub mod config;
pub mod report;
pub mod runner;
