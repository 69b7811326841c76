//! csv 报告输出

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{ProfileError, ProfileResult};
use crate::row::ReportRow;
use crate::schema::ReportSchema;

/// 报告文件名的默认前缀
pub const DEFAULT_REPORT_PREFIX: &str = "malioc_report";

/// 时间戳，精确到秒
pub fn time_token(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// 生成 `<prefix>_<YYYYMMDD_HHMMSS>.csv`
///
/// 同一秒内重复运行时追加 `_1`、`_2` ...，不覆盖已有的报告
pub fn report_path(output_dir: &Path, prefix: &str, now: &DateTime<Local>) -> PathBuf {
    let stem = format!("{prefix}_{}", time_token(now));
    let mut path = output_dir.join(format!("{stem}.csv"));

    let mut suffix = 1;
    while path.exists() {
        path = output_dir.join(format!("{stem}_{suffix}.csv"));
        suffix += 1;
    }
    path
}

/// 唯一的报告写入者，整个批次内持有文件
pub struct ReportWriter<'s> {
    schema: &'s ReportSchema,
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl<'s> ReportWriter<'s> {
    /// 创建文件 (以及不存在的父目录)，并写入表头
    pub fn create(path: impl Into<PathBuf>, schema: &'s ReportSchema) -> ProfileResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(schema.labels())?;

        Ok(Self {
            schema,
            path,
            writer,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// 追加一行，列顺序与表头一致
    pub fn write_row(&mut self, row: &ReportRow<'_>) -> ProfileResult<()> {
        if row.values().len() != self.schema.len() {
            return Err(ProfileError::SchemaMismatch {
                expected: self.schema.len(),
                found: row.values().len(),
            });
        }

        self.writer.write_record(row.values().iter().map(|value| value.to_string()))?;
        self.rows_written += 1;
        Ok(())
    }

    /// 刷新并关闭文件，返回写入的行数
    pub fn finish(mut self) -> ProfileResult<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}
