use std::io::Write;

/// 按默认级别 (Info) 初始化日志，`RUST_LOG` 可以覆盖
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

/// 初始化全局 logger
///
/// 输出格式：`[HH:MM:SS] LEVEL [file:line] message`，按等级着色。
/// 先设置 `default_level`，再读取 `RUST_LOG`，因此环境变量优先。
pub fn init_log_with_level(default_level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            let level_style = level_style(buf, record.level());
            let grey_style = anstyle::Style::new().fg_color(Some(anstyle::Color::Rgb(anstyle::RgbColor(110, 110, 110))));

            let line = record.line().unwrap_or(!0);
            // 同时兼容 windows 与 unix 的路径分隔符
            let file = record.file().unwrap_or("").rsplit(['\\', '/']).next().unwrap_or("");
            let time = chrono::Local::now().format("%H:%M:%S");
            let level = record.level();

            writeln!(
                buf,
                "{level_style}[{time}] {level:<5}{level_style:#} {grey_style}[{file}:{line}]{grey_style:#} {}",
                record.args()
            )
        })
        .filter(None, default_level)
        .parse_default_env();

    // 测试中可能被多次调用，忽略重复初始化
    let _ = builder.try_init();
}

fn level_style(buf: &env_logger::fmt::Formatter, level: log::Level) -> anstyle::Style {
    let color = match level {
        log::Level::Info => anstyle::AnsiColor::Green,
        log::Level::Warn => anstyle::AnsiColor::Yellow,
        log::Level::Error => anstyle::AnsiColor::Red,
        _ => return buf.default_level_style(level),
    };
    buf.default_level_style(level).fg_color(Some(anstyle::Color::Ansi(color)))
}
