//! 调用 Mali Offline Compiler (malioc)
//!
//! 每个文件启动一个 malioc 进程，按退出码对结果分类：
//! - 0：编译成功
//! - 1：shader 有编译错误，输出中仍然是合法的 json
//! - 其他：工具或环境出错，需要中止整个批次

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProfileError, ProfileResult};
use crate::shader_file::{ShaderFile, ShaderKind};

/// 默认的编译器可执行文件，从 PATH 中查找
pub const DEFAULT_MALIOC: &str = "malioc";

/// malioc 约定的 "shader 有编译错误" 退出码
const COMPILE_ERRORS_EXIT_CODE: i32 = 1;

/// 所有文件共享的编译参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// 目标 GPU，对应 `-c <core>`
    pub core: Option<String>,
    /// 使用 Vulkan 语义编译源码，对应 `--vulkan`
    pub vulkan: bool,
    /// 输入为 SPIR-V 字节码，对应 `--spirv`
    pub spirv: bool,
}

/// 单个文件的一次调用
#[derive(Debug, Clone)]
pub struct CompileInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CompileInvocation {
    /// 构造命令行参数
    ///
    /// 源码的扩展名无法识别时返回 `UnsupportedShaderKind`
    pub fn new(program: &Path, file: &ShaderFile, options: &CompileOptions) -> ProfileResult<Self> {
        let mut args = Vec::new();

        if let Some(core) = options.core.as_deref().filter(|core| !core.is_empty()) {
            args.extend(["-c".to_string(), core.to_string()]);
        }

        if options.spirv || file.is_bytecode() {
            args.push("--spirv".to_string());
        } else {
            let kind = file
                .extension()
                .and_then(ShaderKind::from_extension)
                .ok_or_else(|| ProfileError::UnsupportedShaderKind(file.path().to_path_buf()))?;
            if options.vulkan {
                args.push("--vulkan".to_string());
            }
            args.push(format!("--{kind}"));
        }

        args.extend(["--format".to_string(), "json".to_string()]);
        args.push(file.path().to_string_lossy().into_owned());

        Ok(Self {
            program: program.to_path_buf(),
            args,
        })
    }

    /// 用于日志的完整命令行，文件路径加引号
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        let last = self.args.len().saturating_sub(1);
        for (idx, arg) in self.args.iter().enumerate() {
            line.push(' ');
            if idx == last {
                line.push_str(&format!("\"{arg}\""));
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    /// 启动进程并等待结束
    pub fn run(&self, file: &ShaderFile) -> ProfileResult<CompileOutcome> {
        log::debug!("{}", self.command_line());

        let output = Command::new(&self.program).args(&self.args).output().map_err(|source| ProfileError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        Ok(classify(file, output.status.code(), stdout, &stderr))
    }
}

/// 一次调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Success(String),
    CompileErrors(String),
    HardFailure { code: Option<i32>, output: String },
}

/// 根据退出码分类
///
/// json 只从 stdout 读取；stderr 仅在出错时并入输出，方便排查
pub fn classify(file: &ShaderFile, code: Option<i32>, stdout: String, stderr: &str) -> CompileOutcome {
    if !stderr.trim().is_empty() {
        log::debug!("{}: {}", file.file_name(), stderr.trim_end());
    }

    match code {
        Some(0) => CompileOutcome::Success(stdout),
        Some(COMPILE_ERRORS_EXIT_CODE) => CompileOutcome::CompileErrors(stdout),
        code => {
            let mut output = stdout;
            output.push_str(stderr);
            CompileOutcome::HardFailure { code, output }
        }
    }
}

/// 离线编译器
pub trait OfflineCompiler: Send + Sync {
    /// 编译单个文件，返回分类后的结果
    fn compile(&self, file: &ShaderFile) -> ProfileResult<CompileOutcome>;
}

/// 通过子进程调用 malioc
#[derive(Debug, Clone)]
pub struct MaliocCompiler {
    program: PathBuf,
    options: CompileOptions,
}

impl MaliocCompiler {
    pub fn new(program: impl Into<PathBuf>, options: CompileOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }
}

impl OfflineCompiler for MaliocCompiler {
    fn compile(&self, file: &ShaderFile) -> ProfileResult<CompileOutcome> {
        CompileInvocation::new(&self.program, file, &self.options)?.run(file)
    }
}
