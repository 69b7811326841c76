//! Shader 静态性能报告 (完整版)
//!
//! 对目录下所有 shader 调用 malioc，输出 `malioc_report_<时间>.csv`。
//! 相比 basic 版本，额外支持指定 GPU、Vulkan 与 SPIR-V，并记录驱动与编译器版本。

mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use malioc_crate_tools::init_log::init_log;
use malioc_profile::{ProfileConfig, ReportSchema, generate_shader_profile};

fn main() {
    init_log();

    if let Err(e) = run(Args::parse()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = ProfileConfig::load(args.config.as_deref())?
        .merge(args.overrides())
        .resolve(&args.shader_path)
        .context("invalid arguments")?;

    log::info!("Shader path: {}", settings.shader_dir.display());
    log::info!("Output path: {}", settings.output_dir.display());
    if let Some(core) = &settings.compile.core {
        log::info!("Target core: {core}");
    }

    let summary = generate_shader_profile(&settings, ReportSchema::extended())
        .with_context(|| format!("failed to profile shaders in {}", settings.shader_dir.display()))?;

    if let Some(path) = summary.report_path {
        log::info!("Report generated: {}", path.display());
    }

    Ok(())
}
