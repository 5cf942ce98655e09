//! Event handling: per-channel log files and terminal feedback

use chrono::Utc;
use console::{Style, Term};
use devboot_events::{AppEvent, EventMessage, GeneralEvent, LogEvent, LogSeverity};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receiving end of the log sink
///
/// Appends every log line to `<log_dir>/<channel>.log` and echoes
/// significant lines to stderr.
pub struct EventHandler {
    log_dir: PathBuf,
    /// Open log files by channel; `None` once opening failed
    files: HashMap<String, Option<File>>,
    colors_enabled: bool,
    /// Echo raw subprocess output as well
    debug_enabled: bool,
    /// Nothing goes to the terminal
    quiet: bool,
    term: Term,
}

impl EventHandler {
    pub fn new(log_dir: impl Into<PathBuf>, colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            log_dir: log_dir.into(),
            files: HashMap::new(),
            colors_enabled,
            debug_enabled,
            quiet: false,
            term: Term::stderr(),
        }
    }

    /// Keep the terminal clean, e.g. for JSON output
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);

        match message.event {
            AppEvent::Log(log) => {
                self.persist(&log);
                if log.significant || self.debug_enabled {
                    self.echo(&log);
                }
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.show(&message, LogSeverity::Warn);
            }
            AppEvent::General(GeneralEvent::Error { message, .. }) => {
                self.show(&message, LogSeverity::Error);
            }
            _ => {}
        }
    }

    fn persist(&mut self, log: &LogEvent) {
        let Some(file) = self.file_for(&log.channel) else {
            return;
        };
        let result = if log.severity == LogSeverity::Log && !log.significant {
            file.write_all(log.text.as_bytes())
        } else {
            writeln!(
                file,
                "{} [{}] {}",
                Utc::now().to_rfc3339(),
                log.severity.as_str(),
                log.text.trim_end()
            )
        };
        if let Err(e) = result {
            tracing::warn!(channel = %log.channel, error = %e, "failed to write channel log");
        }
    }

    fn file_for(&mut self, channel: &str) -> Option<&mut File> {
        if !self.files.contains_key(channel) {
            let opened = open_channel_log(&self.log_dir, channel);
            if let Err(e) = &opened {
                tracing::warn!(channel, error = %e, "cannot open channel log");
            }
            self.files.insert(channel.to_string(), opened.ok());
        }
        self.files.get_mut(channel).and_then(Option::as_mut)
    }

    fn echo(&self, log: &LogEvent) {
        if log.significant {
            self.show(log.text.trim_end(), log.severity);
        } else if !self.quiet {
            let text = log.text.trim_end();
            if !text.is_empty() {
                let _ = self.term.write_line(&self.style(Style::new().dim(), text));
            }
        }
    }

    fn show(&self, text: &str, severity: LogSeverity) {
        if self.quiet {
            return;
        }
        let line = match severity {
            LogSeverity::Error => self.style(Style::new().red().bold(), &format!("error: {text}")),
            LogSeverity::Warn => self.style(Style::new().yellow(), &format!("warning: {text}")),
            LogSeverity::Info => self.style(Style::new().green(), text),
            LogSeverity::Log => text.to_string(),
        };
        let _ = self.term.write_line(&line);
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn open_channel_log(dir: &Path, channel: &str) -> std::io::Result<File> {
    std::fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{channel}.log")))
}
