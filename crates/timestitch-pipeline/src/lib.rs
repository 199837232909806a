//! Orchestration of the comment-timestamp compilation pipeline.
//!
//! This crate wires the pure stages (parsing, filtering) and the media
//! stages (extraction, assembly) into a per-video pipeline, guarded by a
//! durable ledger so each source video is compiled at most once. The
//! hosting platform is reached only through the collaborator traits in
//! [`collab`]; the embedding application supplies real implementations
//! and decides when passes run.

pub mod collab;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod retry;
pub mod run;
pub mod schedule;
pub mod shutdown;
pub mod skiplist;

pub use collab::{CollaboratorError, MediaProvider, Publisher, UploadRequest, VideoSource};
pub use config::{AppConfig, ConfigError, Privacy};
pub use error::{PipelineError, PipelineResult};
pub use paths::VideoWorkspace;
pub use retry::{with_backoff, RetryConfig};
pub use run::{Pipeline, PublishedCompilation, RunSummary};
pub use schedule::{Schedule, ScheduleError};
pub use shutdown::{shutdown_channel, Shutdown, ShutdownHandle};
pub use skiplist::SkipList;
