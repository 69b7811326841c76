#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use malioc_profile::invoker::{CompileOutcome, OfflineCompiler};
use malioc_profile::shader_file::ShaderFile;
use malioc_profile::{ProfileConfig, ProfileResult, ProfileSettings};
use serde_json::{Value, json};

pub const EXTENDED_PIPELINES: [&str; 7] =
    ["arith_total", "arith_fma", "arith_cvt", "arith_sfu", "load_store", "varying", "texture"];
pub const BASIC_PIPELINES: [&str; 6] = ["arith_fma", "arith_cvt", "arith_sfu", "load_store", "varying", "texture"];

fn exec_path(pipelines: &[&str], base: f64) -> Value {
    let cycles: Vec<f64> = (0..pipelines.len()).map(|idx| base + idx as f64).collect();
    json!({ "cycle_count": cycles, "bound_pipelines": [pipelines[0], ""] })
}

/// 与 malioc `--format json` 输出结构一致的成功结果
pub fn success_json(filename: &str, pipelines: &[&str]) -> String {
    json!({
        "producer": { "name": "malioc", "version": [8, 7, 0], "build": "7f8ac4" },
        "shaders": [ {
            "filename": filename,
            "driver": "r45p0-00eac0",
            "hardware": { "core": "Mali-G78", "revision": "r1p1" },
            "properties": [ { "name": "has_uniform_computation", "value": true } ],
            "variants": [ {
                "name": "Main",
                "properties": [
                    { "name": "work_registers_used", "value": 20 },
                    { "name": "uniform_registers_used", "value": 12 },
                    { "name": "has_stack_spilling", "value": false }
                ],
                "performance": {
                    "pipelines": pipelines,
                    "total_cycles": exec_path(pipelines, 3.0),
                    "longest_path_cycles": exec_path(pipelines, 2.0),
                    "shortest_path_cycles": exec_path(pipelines, 1.0)
                }
            } ]
        } ]
    })
    .to_string()
}

/// 编译失败时 malioc 的输出，退出码为 1
pub fn errors_json(filename: &str, errors: &[&str]) -> String {
    json!({
        "producer": { "name": "malioc", "version": [8, 7, 0], "build": "7f8ac4" },
        "shaders": [ { "filename": filename, "errors": errors } ]
    })
    .to_string()
}

/// 进程内的假编译器，按文件名返回预设结果，其余文件返回成功
pub struct FakeCompiler {
    pipelines: &'static [&'static str],
    outcomes: HashMap<String, CompileOutcome>,
}

impl FakeCompiler {
    pub fn new(pipelines: &'static [&'static str]) -> Self {
        Self {
            pipelines,
            outcomes: HashMap::new(),
        }
    }

    pub fn with(mut self, file_name: &str, outcome: CompileOutcome) -> Self {
        self.outcomes.insert(file_name.to_string(), outcome);
        self
    }
}

impl OfflineCompiler for FakeCompiler {
    fn compile(&self, file: &ShaderFile) -> ProfileResult<CompileOutcome> {
        let name = file.file_name();
        Ok(self
            .outcomes
            .get(&name)
            .cloned()
            .unwrap_or_else(|| CompileOutcome::Success(success_json(&file.path().to_string_lossy(), self.pipelines))))
    }
}

pub fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), "void main() {}\n").unwrap();
    }
}

pub fn settings(shader_dir: &Path, output_dir: &Path, job_count: usize) -> ProfileSettings {
    ProfileConfig {
        job_count: Some(job_count),
        output: Some(output_dir.to_path_buf()),
        ..Default::default()
    }
    .resolve(shader_dir)
    .unwrap()
}

/// 读取报告，返回 (表头, 数据行)
pub fn read_report(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
