//! 基于 Mali Offline Compiler (malioc) 的 shader 静态性能报告
//!
//! 对目录下的每个 shader 文件调用一次 malioc，解析其 json 输出，
//! 按 (文件 × 变体 × 执行路径) 展开为一行，汇总到带时间戳的 csv 报告中。
//!
//! # 流程
//! 1. [`shader_file::collect_shader_files`] 收集文件
//! 2. [`pool::CompilePool`] 并行调用 [`invoker::OfflineCompiler`]
//! 3. [`decoder::DecodedResult`] 解析 json
//! 4. [`row::RowFlattener`] 展开为 [`row::ReportRow`]
//! 5. [`report::ReportWriter`] 写入 csv
//!
//! [`profile::generate_shader_profile`] 串起以上步骤。

pub mod config;
pub mod decoder;
pub mod error;
pub mod invoker;
pub mod pool;
pub mod profile;
pub mod report;
pub mod row;
pub mod schema;
pub mod shader_file;

pub use config::{ProfileConfig, ProfileSettings};
pub use error::{ProfileError, ProfileResult};
pub use profile::{ProfileSummary, generate_shader_profile, generate_shader_profile_with};
pub use schema::{ReportSchema, SchemaKind};
