//! Read-only disk analysis: plugins name the places worth looking at, a walker
//! streams what is there, and a scorer classifies how safe each file is to remove.

pub mod config;
pub mod disk_info;
pub mod engine;
pub mod error;
pub mod plugin;
pub mod plugins;
pub mod protected;
pub mod record;
pub mod registry;
pub mod report;
pub mod scorer;
pub mod topn;
pub mod utils;
pub mod validator;
pub mod walker;

pub use config::{EngineConfig, ScoringConfig};
pub use engine::{
    AnalysisEngine, AnalysisObserver, AnalysisRequest, CancelToken, ChannelObserver, ProgressEvent,
};
pub use error::{EngineError, Rejection, Result};
pub use plugin::{Plugin, PluginDescriptor};
pub use protected::ProtectedPathSet;
pub use record::{AnalysisResult, PathRecord, Recommendation, SafetyLevel};
pub use registry::PluginRegistry;
pub use report::{CategorySummary, PluginError, Report};
pub use scorer::SafetyScorer;
pub use validator::PathValidator;
pub use walker::{DirectoryWalker, WalkSummary};
