//! Console output abstraction for the shell.
//!
//! The `Console` trait lets the same shell drive a real terminal or a
//! `HeadlessConsole` that captures output for tests.

/// Console interface for shell output.
pub trait Console {
    /// Write text without a trailing newline (prompts).
    fn write(&mut self, text: &str);

    /// Write one line of output.
    fn write_line(&mut self, line: &str) {
        self.write(line);
        self.write("\n");
    }

    /// Clear the visible screen. No-op by default.
    fn clear(&mut self) {}
}

/// Headless console for testing - captures output in memory.
#[derive(Default)]
pub struct HeadlessConsole {
    output: String,
    clears: usize,
}

impl HeadlessConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Output split into lines.
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }

    /// Number of times the screen was cleared.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Clear output buffer.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Take the captured output, leaving the buffer empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Console for HeadlessConsole {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}
