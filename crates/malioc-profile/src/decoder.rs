//! 解析 malioc 的 json 输出
//!
//! 不绑定固定的 schema，只按点分路径取字段，字段缺失时返回 None。

use serde_json::Value;

use crate::error::{ProfileError, ProfileResult};
use crate::shader_file::ShaderFile;

/// 按点分路径在 json 树中查找，数组下标也作为路径的一段，例如 `shaders.0.filename`
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').filter(|segment| !segment.is_empty()).try_fold(value, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    })
}

/// 取字符串列表，非字符串元素转为 json 文本；`null` 元素保留为空字符串
pub fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// 一次 malioc 调用解码后的结果
#[derive(Debug, Clone)]
pub struct DecodedResult {
    root: Value,
}

impl DecodedResult {
    pub fn parse(file: &ShaderFile, text: &str) -> ProfileResult<Self> {
        let root = serde_json::from_str(text).map_err(|source| ProfileError::Json {
            file: file.path().to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// 编译器版本，形如 `8.7.0 (7f8ac4)`
    pub fn compiler_version(&self) -> Option<String> {
        let version = self
            .get("producer.version")?
            .as_array()?
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");

        match self.get("producer.build") {
            Some(Value::String(build)) => Some(format!("{version} ({build})")),
            Some(Value::Null) | None => Some(version),
            Some(build) => Some(format!("{version} ({build})")),
        }
    }

    /// 取出唯一的 shader 结果
    ///
    /// 每次只编译一个文件，`shaders` 必须恰好有一个元素
    pub fn pop_shader(&mut self, file: &ShaderFile) -> ProfileResult<ShaderEntry> {
        let malformed = |reason: String| ProfileError::MalformedToolOutput {
            file: file.path().to_path_buf(),
            reason,
        };

        let shaders = self
            .root
            .get_mut("shaders")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| malformed("missing \"shaders\" array".to_string()))?;

        if shaders.len() != 1 {
            return Err(malformed(format!("expected exactly one shader entry, found {}", shaders.len())));
        }

        let value = shaders.pop().ok_or_else(|| malformed("empty \"shaders\" array".to_string()))?;
        Ok(ShaderEntry { value })
    }
}

/// `shaders[0]`
#[derive(Debug, Clone)]
pub struct ShaderEntry {
    value: Value,
}

impl ShaderEntry {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.value, path)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get("filename")?.as_str()
    }

    /// 编译失败时的错误信息；字段存在即视为失败
    pub fn errors(&self) -> Option<Vec<String>> {
        self.get("errors").map(|errors| match errors {
            Value::Array(_) => string_list(errors),
            Value::String(s) => vec![s.clone()],
            other => vec![other.to_string()],
        })
    }

    pub fn hardware_core(&self) -> Option<&str> {
        self.get("hardware.core")?.as_str()
    }

    pub fn driver(&self) -> Option<&str> {
        self.get("driver")?.as_str()
    }

    /// shader 级别的属性
    pub fn properties(&self) -> Vec<Property<'_>> {
        self.get("properties").map(Property::list).unwrap_or_default()
    }

    pub fn variants(&self) -> Vec<Variant<'_>> {
        self.get("variants")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|value| Variant { value }).collect())
            .unwrap_or_default()
    }
}

/// 一个编译变体，例如顶点 shader 的 `position` 与 `varying`
#[derive(Debug, Clone, Copy)]
pub struct Variant<'a> {
    value: &'a Value,
}

impl<'a> Variant<'a> {
    pub fn name(&self) -> Option<&'a str> {
        lookup(self.value, "name")?.as_str()
    }

    pub fn properties(&self) -> Vec<Property<'a>> {
        lookup(self.value, "properties").map(Property::list).unwrap_or_default()
    }

    /// 某个执行路径的周期数据，`path` 为 `total_cycles` 等
    pub fn exec_path(&self, path: &str) -> Option<ExecPath<'a>> {
        let performance = lookup(self.value, "performance")?;
        let value = lookup(performance, path)?;
        Some(ExecPath { performance, value })
    }
}

/// 一个执行路径上各流水线的周期数
#[derive(Debug, Clone, Copy)]
pub struct ExecPath<'a> {
    performance: &'a Value,
    value: &'a Value,
}

impl ExecPath<'_> {
    /// 流水线名字，优先取路径自身的 `pipelines`，否则取 `performance.pipelines`
    pub fn pipelines(&self) -> Vec<String> {
        lookup(self.value, "pipelines")
            .or_else(|| lookup(self.performance, "pipelines"))
            .map(string_list)
            .unwrap_or_default()
    }

    /// 与 `pipelines` 按下标对齐
    pub fn cycle_count(&self) -> Vec<Value> {
        lookup(self.value, "cycle_count").and_then(Value::as_array).cloned().unwrap_or_default()
    }

    /// 瓶颈流水线，可能含有空位
    pub fn bound_pipelines(&self) -> Vec<String> {
        lookup(self.value, "bound_pipelines").map(string_list).unwrap_or_default()
    }
}

/// `{ "name": ..., "value": ... }`
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    pub name: &'a str,
    pub value: &'a Value,
}

static NULL: Value = Value::Null;

impl<'a> Property<'a> {
    fn list(value: &'a Value) -> Vec<Self> {
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(Property {
                            name: lookup(item, "name")?.as_str()?,
                            value: lookup(item, "value").unwrap_or(&NULL),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
