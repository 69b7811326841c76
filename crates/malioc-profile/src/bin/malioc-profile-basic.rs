//! Shader 静态性能报告 (basic)
//!
//! 只处理 GLSL 源码，报告中只包含周期数与寄存器信息。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use malioc_crate_tools::init_log::init_log;
use malioc_profile::{ProfileConfig, ReportSchema, generate_shader_profile};

/// Generate shader static profile from Mali offline compiler
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Directory of shader files
    shader_path: PathBuf,

    /// Number of compiling jobs [default: 4]
    #[arg(short, long)]
    job_count: Option<usize>,

    /// Output directory [default: .]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with default values for the options above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path of the malioc executable [default: malioc]
    #[arg(long)]
    malioc: Option<PathBuf>,
}

fn main() {
    init_log();

    if let Err(e) = run(Args::parse()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let file_config = ProfileConfig::load(args.config.as_deref())?;

    // basic 版本不支持这些选项，配置文件里也忽略
    let config = ProfileConfig {
        core: None,
        vulkan: None,
        spirv: None,
        ..file_config
    }
    .merge(ProfileConfig {
        job_count: args.job_count,
        output: args.output,
        malioc: args.malioc,
        ..Default::default()
    });
    let settings = config.resolve(&args.shader_path).context("invalid arguments")?;

    let summary = generate_shader_profile(&settings, ReportSchema::basic())
        .with_context(|| format!("failed to profile shaders in {}", settings.shader_dir.display()))?;

    if let Some(path) = summary.report_path {
        log::info!("Report generated: {}", path.display());
    }

    Ok(())
}
