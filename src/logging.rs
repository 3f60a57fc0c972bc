//! # 日志系统模块
//!
//! 实现 `log` crate 的 [`Log`] 接口，按级别彩色输出到标准错误。
//! 日志级别由环境变量 `LOG` 控制（`ERROR`、`WARN`、`INFO`、`DEBUG`、`TRACE`），
//! 未设置时关闭日志。
//!
//! ```text
//! LEVEL [TH name] [module] message
//! ```

use log::{self, Level, LevelFilter, Log, Metadata, Record};
use std::thread;

/// 输出到标准错误的日志实现
struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // 红色
            Level::Warn => 93,  // 亮黄色
            Level::Info => 34,  // 蓝色
            Level::Debug => 32, // 绿色
            Level::Trace => 90, // 暗灰色
        };
        let current = thread::current();
        eprintln!(
            "\u{1B}[{}m{:>5} [TH {}] [{}] {}\u{1B}[0m",
            color,
            record.level(),
            current.name().unwrap_or("-"),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// 解析 `LOG` 环境变量的值
fn level_filter(value: Option<&str>) -> LevelFilter {
    match value {
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

/// 安装日志实现，重复调用时保持第一次的设置
pub fn init() {
    static LOGGER: SimpleLogger = SimpleLogger;
    if log::set_logger(&LOGGER).is_ok() {
        let level = std::env::var("LOG").ok();
        log::set_max_level(level_filter(level.as_deref()));
    }
}
