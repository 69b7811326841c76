//! 命令行参数

use std::path::PathBuf;

use clap::Parser;
use malioc_profile::ProfileConfig;

/// Generate shader static profile from Mali offline compiler
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Directory of shader files
    pub shader_path: PathBuf,

    /// Number of compiling jobs [default: 4]
    #[arg(short, long)]
    pub job_count: Option<usize>,

    /// Output directory [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target Mali GPU, e.g. Mali-G78
    #[arg(short, long)]
    pub core: Option<String>,

    /// Target the Vulkan API
    #[arg(long)]
    pub vulkan: bool,

    /// Compile SPIR-V binary modules (*.spv) instead of GLSL sources
    #[arg(long)]
    pub spirv: bool,

    /// TOML file with default values for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path of the malioc executable [default: malioc]
    #[arg(long)]
    pub malioc: Option<PathBuf>,

    /// Abort on properties that have no report column instead of dropping them
    #[arg(long)]
    pub strict: bool,
}

impl Args {
    /// 命令行中显式给出的参数；未给出的开关不覆盖配置文件
    pub fn overrides(&self) -> ProfileConfig {
        ProfileConfig {
            job_count: self.job_count,
            output: self.output.clone(),
            core: self.core.clone(),
            vulkan: self.vulkan.then_some(true),
            spirv: self.spirv.then_some(true),
            malioc: self.malioc.clone(),
            strict: self.strict.then_some(true),
            report_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let args = Args::parse_from(["malioc-profile", "shaders", "-j", "2", "-o", "out", "-c", "Mali-G78", "--vulkan"]);
        let config = args.overrides();

        assert_eq!(args.shader_path, PathBuf::from("shaders"));
        assert_eq!(config.job_count, Some(2));
        assert_eq!(config.output, Some(PathBuf::from("out")));
        assert_eq!(config.core.as_deref(), Some("Mali-G78"));
        assert_eq!(config.vulkan, Some(true));
        assert_eq!(config.spirv, None);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
