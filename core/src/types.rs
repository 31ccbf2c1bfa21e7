use std::io;
use thiserror::Error;

/// One transaction amount flowing through the pipeline.
pub type Event = i64;

/// Unified pipeline error covering config, I/O, and stage lifecycle failures.
/// - `From<T>` impls enable `?` across config loading.
/// - Shutdown problems are reported here rather than by panicking.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error (config file access).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid JSON for `PipelineConfig`.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A stage thread could not be started.
    #[error("failed to spawn stage `{stage}`: {source}")]
    Spawn {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    /// A stage thread panicked instead of reporting.
    #[error("stage `{0}` panicked")]
    StagePanicked(&'static str),

    /// Stages that did not exit within the grace period after cancellation.
    #[error("stages still running after grace period: {}", .stalled.join(", "))]
    ShutdownTimeout { stalled: Vec<&'static str> },
}
