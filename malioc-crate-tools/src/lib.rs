//! malioc-profile 工具集
//!
//! 目前只提供日志初始化，供各个 binary 共享。

pub mod init_log;
