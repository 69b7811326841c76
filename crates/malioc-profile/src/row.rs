//! 把一个 shader 的编译结果展开为报告中的若干行
//!
//! 每个 (变体 × 执行路径) 一行；编译失败时只有一行错误记录。

use crate::decoder::{Property, ShaderEntry, Variant};
use crate::error::{ProfileError, ProfileResult};
use crate::schema::{CellValue, ColumnGroup, ReportSchema, SchemaKind};
use crate::shader_file::ShaderFile;

/// malioc 给出的三条执行路径
pub const EXEC_PATHS: [&str; 3] = ["total_cycles", "longest_path_cycles", "shortest_path_cycles"];

/// 报告中的一行，与 schema 的列一一对应
#[derive(Debug, Clone)]
pub struct ReportRow<'s> {
    schema: &'s ReportSchema,
    values: Vec<CellValue>,
}

impl<'s> ReportRow<'s> {
    /// 所有列均为默认值
    pub fn new(schema: &'s ReportSchema) -> Self {
        Self {
            schema,
            values: schema.columns().map(|column| column.default.value()).collect(),
        }
    }

    /// 设置某一列；schema 中没有这一列时返回 false
    pub fn set(&mut self, key: &str, value: CellValue) -> bool {
        match self.schema.column(key) {
            Some((idx, _)) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.schema.column(key).map(|(idx, _)| &self.values[idx])
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// 按列顺序遍历 (key, value)
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CellValue)> + '_ {
        self.schema.keys().zip(self.values.iter())
    }
}

/// 报告中与目标相关、不来自 shader 本身的信息
#[derive(Debug, Clone, Default)]
pub struct TargetInfo {
    /// 命令行指定的 GPU，json 中没有 `hardware.core` 时使用
    pub core: Option<String>,
    pub compiler_version: Option<String>,
}

/// 行展开器
#[derive(Debug, Clone, Copy)]
pub struct RowFlattener<'s> {
    schema: &'s ReportSchema,
    strict_properties: bool,
}

impl<'s> RowFlattener<'s> {
    pub fn new(schema: &'s ReportSchema) -> Self {
        Self {
            schema,
            strict_properties: false,
        }
    }

    /// 严格模式下，无法识别的属性会中止批次而不是被丢弃
    pub fn strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    pub fn flatten(&self, file: &ShaderFile, shader: &ShaderEntry, target: &TargetInfo) -> ProfileResult<Vec<ReportRow<'s>>> {
        let base = self.identity_row(file, shader, target);
        let shader_name = base.get("shader_name").and_then(CellValue::as_text).unwrap_or_default().to_string();

        if let Some(errors) = shader.errors() {
            let mut row = base;
            row.set("error_log", CellValue::text(errors.join("\n")));
            return Ok(vec![row]);
        }

        let shader_properties = shader.properties();
        let mut rows = Vec::new();

        // 顶点 shader 有 position 与 varying 两个变体，其他类型通常只有一个
        for variant in shader.variants() {
            let mut merged = shader_properties.clone();
            merged.extend(variant.properties());
            let properties = self.resolve_properties(&shader_name, &merged)?;

            for exec_path in EXEC_PATHS {
                let mut row = base.clone();
                if let Some(name) = variant.name() {
                    row.set("shader_variant", CellValue::text(name));
                }
                row.set("shader_exec_path", CellValue::text(exec_path));

                self.fill_cycles(&mut row, &shader_name, &variant, exec_path)?;

                for (key, value) in &properties {
                    row.set(key, value.clone());
                }
                rows.push(row);
            }
        }

        Ok(rows)
    }

    fn identity_row(&self, file: &ShaderFile, shader: &ShaderEntry, target: &TargetInfo) -> ReportRow<'s> {
        let mut row = ReportRow::new(self.schema);

        // malioc 回报的是传入的路径，只保留文件名
        let reported = shader.filename().map(ShaderFile::new).unwrap_or_else(|| file.clone());
        row.set("shader_name", CellValue::text(reported.file_name()));
        if let Some(kind) = file.kind() {
            row.set("shader_type", CellValue::text(kind.name()));
        }

        if self.schema.kind() == SchemaKind::Extended {
            if let Some(id) = file.id() {
                let id = i64::try_from(id).map(CellValue::Int).unwrap_or_else(|_| CellValue::text(id.to_string()));
                row.set("shader_id", id);
            }
            if let Some(core) = shader.hardware_core().or(target.core.as_deref()).filter(|core| !core.is_empty()) {
                row.set("target_core", CellValue::text(core));
            }
            if let Some(driver) = shader.driver() {
                row.set("target_driver", CellValue::text(driver));
            }
            if let Some(version) = &target.compiler_version {
                row.set("compiler_version", CellValue::text(version.as_str()));
            }
        }

        row
    }

    /// 按下标把 pipelines 与 cycle_count 对齐写入
    fn fill_cycles(&self, row: &mut ReportRow<'s>, shader_name: &str, variant: &Variant<'_>, exec_path: &str) -> ProfileResult<()> {
        let Some(perf) = variant.exec_path(exec_path) else {
            log::warn!("{shader_name}: variant {:?} has no \"{exec_path}\"", variant.name().unwrap_or("N/A"));
            return Ok(());
        };

        let pipelines = perf.pipelines();
        let cycles = perf.cycle_count();
        if pipelines.len() != cycles.len() {
            return Err(ProfileError::MalformedToolOutput {
                file: shader_name.into(),
                reason: format!(
                    "{exec_path}: {} pipelines but {} cycle counts",
                    pipelines.len(),
                    cycles.len()
                ),
            });
        }

        for (pipeline, count) in pipelines.iter().zip(&cycles) {
            self.cycle_column(shader_name, pipeline)?;
            row.set(pipeline, CellValue::from_json(count));
        }

        let bounds = perf
            .bound_pipelines()
            .iter()
            .filter(|pipeline| !pipeline.is_empty())
            .map(|pipeline| self.cycle_column(shader_name, pipeline))
            .collect::<ProfileResult<Vec<_>>>()?;
        row.set("shader_bounds", CellValue::text(bounds.join(",")));

        Ok(())
    }

    /// 流水线对应的列，返回表头文字
    fn cycle_column(&self, shader_name: &str, pipeline: &str) -> ProfileResult<&'static str> {
        match self.schema.column(pipeline) {
            Some((_, column)) if column.group == ColumnGroup::Cycles => Ok(column.label),
            _ => Err(ProfileError::UnrecognizedPipeline {
                shader: shader_name.to_string(),
                pipeline: pipeline.to_string(),
            }),
        }
    }

    /// 过滤出 schema 中存在的属性；后出现的同名属性覆盖先出现的
    fn resolve_properties(&self, shader_name: &str, properties: &[Property<'_>]) -> ProfileResult<Vec<(&'static str, CellValue)>> {
        let mut resolved = Vec::new();

        for property in properties {
            match self.schema.column(property.name) {
                Some((_, column)) if column.group == ColumnGroup::Property => {
                    resolved.push((column.key, CellValue::from_json(property.value)));
                }
                _ if self.strict_properties => {
                    return Err(ProfileError::UnrecognizedProperty {
                        shader: shader_name.to_string(),
                        property: property.name.to_string(),
                    });
                }
                _ => log::warn!("Unrecognized property \"{}\" in {shader_name}", property.name),
            }
        }

        Ok(resolved)
    }
}
