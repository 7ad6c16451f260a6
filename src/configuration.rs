pub mod config;
pub mod types;

pub use config::{Args, Config};
pub use types::{
    EgressConfig, ExtractionConfig, OutputConfig, RotationConfig, RunConfig, SessionConfig,
    TargetConfig,
};
