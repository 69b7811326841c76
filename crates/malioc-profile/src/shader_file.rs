//! 收集待分析的 shader 文件

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// SPIR-V 字节码的扩展名
pub const BYTECODE_EXTENSION: &str = "spv";

/// Shader 的执行阶段，只识别 malioc 支持的三种
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderKind {
    /// 根据源码扩展名 (不带 `.`) 推断
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "vert" => Some(Self::Vertex),
            "frag" => Some(Self::Fragment),
            "comp" => Some(Self::Compute),
            _ => None,
        }
    }

    /// 报告中使用的名字，同时也是 malioc 的 `--<kind>` 参数
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }
}

impl std::fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个待分析的 shader 文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFile {
    path: PathBuf,
}

impl ShaderFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }

    pub fn is_bytecode(&self) -> bool {
        self.extension() == Some(BYTECODE_EXTENSION)
    }

    /// 根据扩展名推断 shader 类型
    ///
    /// 字节码文件使用内层扩展名，例如 `foo.frag.spv` 为 fragment
    pub fn kind(&self) -> Option<ShaderKind> {
        if self.is_bytecode() {
            let stem = Path::new(self.path.file_stem()?);
            return ShaderKind::from_extension(stem.extension()?.to_str()?);
        }
        ShaderKind::from_extension(self.extension()?)
    }

    /// 按命名约定 `<prefix>-<id>.<ext>[.spv]` 解析出 shader id 与类型
    ///
    /// 不符合约定时返回 None
    pub fn naming(&self) -> Option<(u64, ShaderKind)> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^\w+-(?P<id>\d+)\.(?P<ext>vert|frag|comp)(\.spv)?$").expect("shader name pattern is valid")
        });

        let file_name = self.file_name();
        let captures = pattern.captures(&file_name)?;
        let id = captures["id"].parse().ok()?;
        let kind = ShaderKind::from_extension(&captures["ext"])?;
        Some((id, kind))
    }

    pub fn id(&self) -> Option<u64> {
        self.naming().map(|(id, _)| id)
    }
}

/// 列出目录下 (不递归) 所有可识别的 shader 文件
///
/// `bytecode_only` 时只保留 `.spv`，否则只保留 `.vert`/`.frag`/`.comp`。
/// 返回顺序即目录遍历顺序，不做排序。
pub fn collect_shader_files(folder: &Path, bytecode_only: bool) -> std::io::Result<Vec<ShaderFile>> {
    let mut result = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        // 跟随符号链接，只跳过目录等非文件
        if !path.is_file() {
            continue;
        }

        let file = ShaderFile::new(path);
        let keep = match file.extension() {
            Some(BYTECODE_EXTENSION) => bytecode_only,
            Some(ext) => !bytecode_only && ShaderKind::from_extension(ext).is_some(),
            None => false,
        };
        if keep {
            result.push(file);
        }
    }

    Ok(result)
}
