//! 用 shell 脚本模拟 malioc，验证真实子进程下的退出码处理
#![cfg(unix)]

mod common;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use common::*;
use malioc_profile::invoker::{CompileInvocation, CompileOptions, CompileOutcome, MaliocCompiler, OfflineCompiler};
use malioc_profile::shader_file::ShaderFile;
use malioc_profile::{ProfileError, ReportSchema, generate_shader_profile};

/// 最后一个参数是文件路径；文件名含 broken 时退出码 1，含 crash 时退出码 2
fn write_fake_malioc(dir: &Path) -> PathBuf {
    let ok = success_json("__FILE__", &EXTENDED_PIPELINES);
    let errors = errors_json("__FILE__", &["syntax error at line 4"]);

    let script = format!(
        r#"#!/bin/sh
for last; do :; done
case "$last" in
    *broken*) echo '{errors}' | sed "s|__FILE__|$last|"; exit 1 ;;
    *crash*) echo "fatal: no license" >&2; exit 2 ;;
    *) echo '{ok}' | sed "s|__FILE__|$last|"; exit 0 ;;
esac
"#
    );

    let path = dir.join("fake-malioc");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_subprocess_exit_codes() {
    let tools = tempfile::tempdir().unwrap();
    let shaders = tempfile::tempdir().unwrap();
    let malioc = write_fake_malioc(tools.path());
    touch(shaders.path(), &["ok-1.frag", "broken-2.frag", "crash-3.frag"]);

    let compiler = MaliocCompiler::new(&malioc, CompileOptions::default());

    let ok = compiler.compile(&ShaderFile::new(shaders.path().join("ok-1.frag"))).unwrap();
    assert!(matches!(ok, CompileOutcome::Success(ref text) if text.contains("ok-1.frag")));

    let broken = compiler.compile(&ShaderFile::new(shaders.path().join("broken-2.frag"))).unwrap();
    assert!(matches!(broken, CompileOutcome::CompileErrors(ref text) if text.contains("syntax error at line 4")));

    let crash = compiler.compile(&ShaderFile::new(shaders.path().join("crash-3.frag"))).unwrap();
    match crash {
        CompileOutcome::HardFailure { code, output } => {
            assert_eq!(code, Some(2));
            assert!(output.contains("fatal: no license"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_compile_errors_do_not_stop_batch() {
    let tools = tempfile::tempdir().unwrap();
    let shaders = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let malioc = write_fake_malioc(tools.path());
    touch(shaders.path(), &["ok-1.frag", "broken-2.frag", "ok-3.vert"]);

    let mut settings = settings(shaders.path(), output.path(), 2);
    settings.malioc = malioc;
    let summary = generate_shader_profile(&settings, ReportSchema::extended()).unwrap();

    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.rows_written, 3 + 1 + 3);
}

#[test]
fn test_hard_failure_from_subprocess() {
    let tools = tempfile::tempdir().unwrap();
    let shaders = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let malioc = write_fake_malioc(tools.path());
    touch(shaders.path(), &["crash-1.frag"]);

    let mut settings = settings(shaders.path(), output.path(), 1);
    settings.malioc = malioc;
    let err = generate_shader_profile(&settings, ReportSchema::extended()).unwrap_err();

    assert!(matches!(err, ProfileError::ToolHardFailure { code: Some(2), .. }));
    // 表头已写入，报告保留
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_executable() {
    let shaders = tempfile::tempdir().unwrap();
    let compiler = MaliocCompiler::new(shaders.path().join("no-such-malioc"), CompileOptions::default());

    let err = compiler.compile(&ShaderFile::new(shaders.path().join("a.frag"))).unwrap_err();
    assert!(matches!(err, ProfileError::Spawn { .. }));
}

#[test]
fn test_command_line_for_vulkan_core() {
    let options = CompileOptions {
        core: Some("Mali-G710".to_string()),
        vulkan: true,
        spirv: false,
    };
    let invocation = CompileInvocation::new(Path::new("malioc"), &ShaderFile::new("dir/my shader.frag"), &options).unwrap();

    assert_eq!(invocation.command_line(), "malioc -c Mali-G710 --vulkan --fragment --format json \"dir/my shader.frag\"");
}
