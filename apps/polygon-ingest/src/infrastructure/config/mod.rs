//! Configuration module.

mod settings;

pub use settings::{
    ApiKey, Cluster, ConfigError, IngestConfig, PipelineSettings, WebSocketSettings,
};
