//! 生成报告的主流程
//!
//! 收集文件 -> 并行调用 malioc -> 按完成顺序解码、展开、写入。
//! 遇到致命错误时立即停止，已写入的行保留在文件中。

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::config::ProfileSettings;
use crate::decoder::DecodedResult;
use crate::error::{ProfileError, ProfileResult};
use crate::invoker::{CompileOutcome, MaliocCompiler, OfflineCompiler};
use crate::pool::{CompilePool, CompileResult};
use crate::report::{ReportWriter, report_path};
use crate::row::{RowFlattener, TargetInfo};
use crate::schema::ReportSchema;
use crate::shader_file::collect_shader_files;

/// 一次运行的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    /// 没有找到 shader 时为 None，不会创建报告
    pub report_path: Option<PathBuf>,
    pub files_found: usize,
    pub files_processed: usize,
    pub rows_written: usize,
}

/// 使用 malioc 生成报告
pub fn generate_shader_profile(settings: &ProfileSettings, schema: &ReportSchema) -> ProfileResult<ProfileSummary> {
    let compiler = Arc::new(MaliocCompiler::new(&settings.malioc, settings.compile.clone()));
    generate_shader_profile_with(settings, schema, compiler)
}

/// 使用指定的编译器生成报告
pub fn generate_shader_profile_with(
    settings: &ProfileSettings,
    schema: &ReportSchema,
    compiler: Arc<dyn OfflineCompiler>,
) -> ProfileResult<ProfileSummary> {
    let files = collect_shader_files(&settings.shader_dir, settings.compile.spirv)?;
    if files.is_empty() {
        log::info!("Can not find any shaders in {}", settings.shader_dir.display());
        return Ok(ProfileSummary::default());
    }

    let mut summary = ProfileSummary {
        files_found: files.len(),
        ..Default::default()
    };

    if settings.needs_single_job() && settings.job_count > 1 {
        log::warn!("malioc does not support multi-process compilation with --vulkan, fall back to a single job");
    }
    let pool = CompilePool::new(settings.effective_job_count())?;

    let path = report_path(&settings.output_dir, &settings.report_prefix, &chrono::Local::now());
    let mut writer = ReportWriter::create(&path, schema)?;
    summary.report_path = Some(path);

    log::info!(
        "Profiling {} shaders with {} jobs, report: {}",
        files.len(),
        pool.job_count(),
        writer.path().display()
    );

    let flattener = RowFlattener::new(schema).strict_properties(settings.strict_properties);
    let results = pool.dispatch(compiler, files);
    let consumed = consume(&results, settings, &flattener, &mut writer, &mut summary.files_processed);

    // 不论成功与否，都把已写入的行刷到磁盘
    if consumed.is_err() {
        pool.cancel();
    }
    summary.rows_written = writer.rows_written();
    let finished = writer.finish();

    match settle(consumed, finished) {
        Ok(rows) => {
            summary.rows_written = rows;
            log::info!("Wrote {} rows for {} shaders", summary.rows_written, summary.files_processed);
            Ok(summary)
        }
        Err(e) => {
            log::error!(
                "Aborted after {} of {} shaders, partial report kept ({} rows)",
                summary.files_processed,
                summary.files_found,
                summary.rows_written
            );
            Err(e)
        }
    }
}

fn consume(
    results: &Receiver<CompileResult>,
    settings: &ProfileSettings,
    flattener: &RowFlattener<'_>,
    writer: &mut ReportWriter<'_>,
    processed: &mut usize,
) -> ProfileResult<()> {
    for CompileResult { file, outcome } in results.iter() {
        let text = match outcome? {
            CompileOutcome::Success(text) | CompileOutcome::CompileErrors(text) => text,
            CompileOutcome::HardFailure { code, output } => {
                return Err(ProfileError::ToolHardFailure {
                    file: file.path().to_path_buf(),
                    code,
                    output,
                });
            }
        };

        let mut decoded = DecodedResult::parse(&file, &text)?;
        let target = TargetInfo {
            core: settings.compile.core.clone(),
            compiler_version: decoded.compiler_version(),
        };
        let shader = decoded.pop_shader(&file)?;
        log::info!("Processing {}", shader.filename().map(str::to_string).unwrap_or_else(|| file.file_name()));

        let rows = flattener.flatten(&file, &shader, &target)?;
        if rows.is_empty() {
            log::warn!("{}: compiler output has no variants, nothing written", file.file_name());
        }
        for row in &rows {
            writer.write_row(row)?;
        }
        *processed += 1;
    }

    Ok(())
}

/// 合并处理结果与关闭报告的结果，返回写入的行数
///
/// 两者都失败时返回导致中止的错误，刷新失败只记录日志
fn settle(consumed: ProfileResult<()>, finished: ProfileResult<usize>) -> ProfileResult<usize> {
    match (consumed, finished) {
        (Ok(()), finished) => finished,
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(flush)) => {
            log::error!("Failed to flush partial report: {flush}");
            Err(e)
        }
    }
}
