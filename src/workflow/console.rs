//! Console capabilities used by the runner.

use colored::Colorize;
use is_terminal::IsTerminal;
use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Destination for the human-readable progress log.
pub trait OutputSink: Send {
    /// Write a section heading.
    fn heading(&mut self, text: &str) -> Result<()>;

    /// Write a detail line below a heading.
    fn line(&mut self, text: &str) -> Result<()>;

    /// Write an empty separator line.
    fn blank(&mut self) -> Result<()> {
        self.line("")
    }
}

/// Source of the confirmation line read before deletion.
pub trait InputSource: Send {
    /// Block until one line is available and return it without the line
    /// terminator. End of input yields an empty line.
    fn read_line(&mut self) -> Result<String>;
}

/// Writes progress to standard output.
#[derive(Debug)]
pub struct ConsoleSink {
    use_color: bool,
}

impl ConsoleSink {
    /// Create a sink. Headings are bold only when colour is requested,
    /// `NO_COLOR` is unset and stdout is a terminal.
    pub fn new(use_color: bool) -> Self {
        let use_color = color_enabled(
            use_color,
            std::env::var_os("NO_COLOR").is_some(),
            io::stdout().is_terminal(),
        );
        Self { use_color }
    }

    /// Whether headings are highlighted.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OutputSink for ConsoleSink {
    fn heading(&mut self, text: &str) -> Result<()> {
        if self.use_color {
            let styled = text.bold().to_string();
            self.write(&styled)
        } else {
            self.write(text)
        }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        self.write(text)
    }
}

/// Reads the confirmation line from standard input.
#[derive(Debug, Default)]
pub struct StdinSource;

impl InputSource for StdinSource {
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            tracing::debug!("stdin closed before confirmation; continuing");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Styling is applied only to an interactive stdout.
fn color_enabled(requested: bool, no_color_env: bool, stdout_is_tty: bool) -> bool {
    requested && !no_color_env && stdout_is_tty
}

/// Collects output in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferSink {
    lines: Vec<String>,
}

impl BufferSink {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line written so far, headings included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The captured output joined with newlines.
    pub fn contents(&self) -> String {
        let mut out = self.lines.join("\n");
        if !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl OutputSink for BufferSink {
    fn heading(&mut self, text: &str) -> Result<()> {
        self.lines.push(text.to_string());
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result<()> {
        self.lines.push(text.to_string());
        Ok(())
    }
}
