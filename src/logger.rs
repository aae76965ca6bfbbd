use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

/// 標準エラー出力に `時刻 レベル メッセージ` の形式で書き出すロガー。
pub struct CliLogger {
    level: LevelFilter,
}

impl CliLogger {
    pub fn new(verbose: bool) -> Self {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        Self { level }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn format_line(timestamp: DateTime<Local>, level: Level, message: &str) -> String {
    format!("{} {:<5} {}", timestamp.format("%H:%M:%S%.3f"), level, message)
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(Local::now(), record.level(), &record.args().to_string());
            // 出力先が閉じられていても処理は続ける
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
