//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：修改标识符索引

mod observe_commands;

pub mod handlers;

pub use observe_commands::*;
