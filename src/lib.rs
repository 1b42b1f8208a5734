//! dogctl — a fast CLI for the Datadog API.
//!
//! Subcommands map onto REST API calls; responses render as tables or JSON,
//! and failures map to semantic exit codes. Every outbound call goes through
//! the retrying executor in [`api::executor`], and every `--from`/`--to`
//! flag resolves through [`timerange`].
//!
//! # Quick start
//!
//! ```no_run
//! use dogctl::api::{execute, DatadogClient};
//! use dogctl::config::load_config;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let client = DatadogClient::new(&config);
//! let monitors = execute(|| client.list_monitors(None), &config.retry_policy())
//!     .await
//!     .unwrap();
//! println!("{} monitors", monitors.len());
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod input;
pub mod output;
pub mod textutil;
pub mod timerange;
pub mod watch;
