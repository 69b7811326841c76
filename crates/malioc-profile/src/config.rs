//! 运行参数
//!
//! 优先级：命令行 > `--config` 指定的 TOML 文件 > 默认值

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProfileError, ProfileResult};
use crate::invoker::{CompileOptions, DEFAULT_MALIOC};
use crate::report::DEFAULT_REPORT_PREFIX;

/// 默认的并行编译数
pub const DEFAULT_JOB_COUNT: usize = 4;

/// TOML 配置文件，所有字段都可以省略
///
/// ```toml
/// job_count = 8
/// output = "reports"
/// core = "Mali-G78"
/// vulkan = true
/// malioc = "C:/Arm/malioc.exe"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub job_count: Option<usize>,
    pub output: Option<PathBuf>,
    pub core: Option<String>,
    pub vulkan: Option<bool>,
    pub spirv: Option<bool>,
    pub malioc: Option<PathBuf>,
    pub strict: Option<bool>,
    pub report_prefix: Option<String>,
}

impl ProfileConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProfileResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ProfileError::Config(format!("failed to read {}: {e}", path.display())))?;

        toml::from_str(&content).map_err(|e| ProfileError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// 没有指定配置文件时使用空配置
    pub fn load(path: Option<&Path>) -> ProfileResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 用 `other` 中存在的字段覆盖自身
    pub fn merge(self, other: ProfileConfig) -> Self {
        Self {
            job_count: other.job_count.or(self.job_count),
            output: other.output.or(self.output),
            core: other.core.or(self.core),
            vulkan: other.vulkan.or(self.vulkan),
            spirv: other.spirv.or(self.spirv),
            malioc: other.malioc.or(self.malioc),
            strict: other.strict.or(self.strict),
            report_prefix: other.report_prefix.or(self.report_prefix),
        }
    }

    /// 补齐默认值并校验
    pub fn resolve(self, shader_dir: impl Into<PathBuf>) -> ProfileResult<ProfileSettings> {
        let job_count = self.job_count.unwrap_or(DEFAULT_JOB_COUNT);
        if job_count == 0 {
            return Err(ProfileError::Config("job count must be at least 1".to_string()));
        }

        let report_prefix = self.report_prefix.unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string());
        if report_prefix.is_empty() || report_prefix.contains(['/', '\\']) {
            return Err(ProfileError::Config(format!("invalid report prefix {report_prefix:?}")));
        }

        Ok(ProfileSettings {
            shader_dir: shader_dir.into(),
            output_dir: self.output.unwrap_or_else(|| PathBuf::from(".")),
            job_count,
            compile: CompileOptions {
                core: self.core.filter(|core| !core.is_empty()),
                vulkan: self.vulkan.unwrap_or(false),
                spirv: self.spirv.unwrap_or(false),
            },
            malioc: self.malioc.unwrap_or_else(|| PathBuf::from(DEFAULT_MALIOC)),
            strict_properties: self.strict.unwrap_or(false),
            report_prefix,
        })
    }
}

/// 一次运行的完整参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings {
    pub shader_dir: PathBuf,
    pub output_dir: PathBuf,
    pub job_count: usize,
    pub compile: CompileOptions,
    pub malioc: PathBuf,
    pub strict_properties: bool,
    pub report_prefix: String,
}

impl ProfileSettings {
    /// 源码 + `--vulkan` 时 malioc 不支持多进程同时运行
    pub fn needs_single_job(&self) -> bool {
        self.compile.vulkan && !self.compile.spirv
    }

    /// 实际使用的并行数
    pub fn effective_job_count(&self) -> usize {
        if self.needs_single_job() { 1 } else { self.job_count }
    }
}
