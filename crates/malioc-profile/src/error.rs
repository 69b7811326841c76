//! 报告生成过程中的错误类型

use std::path::PathBuf;

/// 除 `UnrecognizedProperty` (非严格模式下) 以外，都会中止整个批次
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unsupported shader kind: {0:?}")]
    UnsupportedShaderKind(PathBuf),

    #[error("failed to launch offline compiler {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 退出码不在 {0, 1} 之内，说明是工具或环境的问题，而不是 shader 的问题
    #[error("offline compiler failed on {file:?} (exit code {code:?}):\n{output}")]
    ToolHardFailure {
        file: PathBuf,
        code: Option<i32>,
        output: String,
    },

    #[error("malformed compiler output for {file:?}: {reason}")]
    MalformedToolOutput { file: PathBuf, reason: String },

    #[error("invalid json from offline compiler for {file:?}: {source}")]
    Json {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized pipeline \"{pipeline}\" in {shader}")]
    UnrecognizedPipeline { shader: String, pipeline: String },

    #[error("unrecognized property \"{property}\" in {shader}")]
    UnrecognizedProperty { shader: String, property: String },

    #[error("row has {found} columns, report expects {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type ProfileResult<T> = Result<T, ProfileError>;
