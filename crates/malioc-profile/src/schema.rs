//! 报告的列定义
//!
//! 列的顺序、表头文字、默认值都在这里声明，运行期间只读。
//! 两种报告：
//! - [`ReportSchema::basic`]：只有周期数与寄存器信息
//! - [`ReportSchema::extended`]：额外记录 shader id、GPU、驱动、编译器版本、光追相关属性

use std::sync::OnceLock;

use indexmap::IndexMap;

/// 报告中的单元格
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// 从 json 转换，数组与对象按 json 文本保存
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or_else(|| Self::Text(n.to_string())),
            },
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            // 与已有报告保持一致，表格软件可以直接识别
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// 列的分组，决定哪些数据可以写入这一列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGroup {
    /// 文件、变体、执行路径、目标硬件等标识信息
    Identity,
    /// 流水线周期数，名字与 malioc 的 pipeline 名一致
    Cycles,
    /// 瓶颈流水线
    Bounds,
    /// malioc 报告的属性
    Property,
    /// 编译错误
    ErrorLog,
}

/// 列的默认值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    Null,
    Bool(bool),
    Int(i64),
    Text(&'static str),
}

impl ColumnDefault {
    pub fn value(self) -> CellValue {
        match self {
            Self::Null => CellValue::Null,
            Self::Bool(b) => CellValue::Bool(b),
            Self::Int(i) => CellValue::Int(i),
            Self::Text(s) => CellValue::text(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub group: ColumnGroup,
    pub default: ColumnDefault,
}

const fn column(key: &'static str, label: &'static str, group: ColumnGroup, default: ColumnDefault) -> Column {
    Column {
        key,
        label,
        group,
        default,
    }
}

use ColumnDefault as D;
use ColumnGroup as G;

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN: &str = "unknown";

const EXTENDED_COLUMNS: &[Column] = &[
    column("shader_name", "Name", G::Identity, D::Text("")),
    column("shader_id", "Id", G::Identity, D::Int(0)),
    column("shader_type", "Type", G::Identity, D::Text(UNKNOWN)),
    column("shader_variant", "Variant", G::Identity, D::Text(NOT_AVAILABLE)),
    column("shader_exec_path", "Exec Path", G::Identity, D::Text(UNKNOWN)),
    column("target_core", "GPU Core", G::Identity, D::Text(NOT_AVAILABLE)),
    column("target_driver", "Driver", G::Identity, D::Text(NOT_AVAILABLE)),
    column("arith_fma", "FMA", G::Cycles, D::Int(0)),
    column("arith_cvt", "CVT", G::Cycles, D::Int(0)),
    column("arith_sfu", "SFU", G::Cycles, D::Int(0)),
    column("arith_total", "ALU", G::Cycles, D::Int(0)),
    column("load_store", "LS", G::Cycles, D::Int(0)),
    column("varying", "V", G::Cycles, D::Int(0)),
    column("texture", "T", G::Cycles, D::Int(0)),
    column("shader_bounds", "Bounds", G::Bounds, D::Text(NOT_AVAILABLE)),
    column("work_registers_used", "Work Registers", G::Property, D::Int(0)),
    column("thread_occupancy", "Thread Occupancy", G::Property, D::Int(0)),
    column("uniform_registers_used", "Uniform Registers", G::Property, D::Int(0)),
    column("has_stack_spilling", "Stack Spilling", G::Property, D::Bool(false)),
    column("stack_spill_bytes", "Spill Bytes", G::Property, D::Int(0)),
    column("fp16_arithmetic", "FP16 Arithmetic", G::Property, D::Int(0)),
    column("ray_traversal_contexts", "Ray Traversal Contexts", G::Property, D::Int(0)),
    column("has_uniform_computation", "Has uniform computation", G::Property, D::Bool(false)),
    column("has_side_effects", "Has side-effects", G::Property, D::Null),
    column("modifies_coverage", "Modifies coverage", G::Property, D::Null),
    column("uses_late_zs_test", "Uses late ZS test", G::Property, D::Null),
    column("uses_late_zs_update", "Uses late ZS update", G::Property, D::Null),
    column("reads_color_buffer", "Reads color buffer", G::Property, D::Null),
    column("has_slow_ray_traversal", "Has slow ray traversal", G::Property, D::Null),
    column("compiler_version", "Compiler Version", G::Identity, D::Text(NOT_AVAILABLE)),
    column("error_log", "Error", G::ErrorLog, D::Null),
];

const BASIC_KEYS: &[&str] = &[
    "shader_name",
    "shader_type",
    "shader_variant",
    "shader_exec_path",
    "arith_fma",
    "arith_cvt",
    "arith_sfu",
    "load_store",
    "varying",
    "texture",
    "shader_bounds",
    "work_registers_used",
    "uniform_registers_used",
    "has_stack_spilling",
    "stack_spill_bytes",
    "fp16_arithmetic",
    "error_log",
];

/// 报告的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Basic,
    Extended,
}

/// 有序的列集合
#[derive(Debug)]
pub struct ReportSchema {
    kind: SchemaKind,
    columns: IndexMap<&'static str, Column>,
}

impl ReportSchema {
    fn new(kind: SchemaKind, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            kind,
            columns: columns.into_iter().map(|column| (column.key, column)).collect(),
        }
    }

    pub fn basic() -> &'static Self {
        static SCHEMA: OnceLock<ReportSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Self::new(
                SchemaKind::Basic,
                BASIC_KEYS.iter().filter_map(|key| EXTENDED_COLUMNS.iter().find(|column| column.key == *key).copied()),
            )
        })
    }

    pub fn extended() -> &'static Self {
        static SCHEMA: OnceLock<ReportSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| Self::new(SchemaKind::Extended, EXTENDED_COLUMNS.iter().copied()))
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.values().map(|column| column.label)
    }

    /// 返回列的下标与定义
    pub fn column(&self, key: &str) -> Option<(usize, &Column)> {
        self.columns.get_full(key).map(|(idx, _, column)| (idx, column))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_layout() {
        let schema = ReportSchema::extended();

        assert_eq!(schema.len(), EXTENDED_COLUMNS.len());
        assert_eq!(schema.keys().next(), Some("shader_name"));
        assert_eq!(schema.keys().last(), Some("error_log"));
        assert_eq!(schema.column("load_store").map(|(_, c)| c.label), Some("LS"));
    }

    #[test]
    fn test_basic_is_ordered_subset() {
        let basic = ReportSchema::basic();

        assert_eq!(basic.keys().collect::<Vec<_>>(), BASIC_KEYS);
        assert!(!basic.contains("shader_id"));
        assert!(!basic.contains("arith_total"));
        assert!(basic.keys().all(|key| ReportSchema::extended().contains(key)));
    }

    #[test]
    fn test_keys_are_unique() {
        assert_eq!(ReportSchema::extended().len(), EXTENDED_COLUMNS.len());
        assert_eq!(ReportSchema::basic().len(), BASIC_KEYS.len());
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::from_json(&serde_json::json!(12)).to_string(), "12");
        assert_eq!(CellValue::from_json(&serde_json::json!(0.75)).to_string(), "0.75");
        assert_eq!(CellValue::from_json(&serde_json::json!("high")), CellValue::text("high"));
    }
}
