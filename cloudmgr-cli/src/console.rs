//! Line-oriented console: prompts in, messages out.

use std::path::PathBuf;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Interactive input/output used by the menu and every prompt flow.
pub trait Console {
    /// Shows `prompt` and reads one line. `None` means end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Prints a plain line.
    fn say(&mut self, line: &str);

    /// Prints a section heading.
    fn heading(&mut self, line: &str) {
        self.say(line);
    }

    /// Prints a success confirmation.
    fn success(&mut self, line: &str) {
        self.say(line);
    }

    /// Prints an error or failure.
    fn failure(&mut self, line: &str) {
        self.say(line);
    }

    /// Clears the screen.
    fn clear(&mut self) {}
}

/// Reads a line, mapping end of input to an empty answer.
pub fn ask(console: &mut dyn Console, prompt: &str) -> String {
    console.read_line(prompt).unwrap_or_default()
}

/// `rustyline`-backed terminal with persistent history.
pub struct Terminal {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl Terminal {
    /// Opens the terminal and loads history from the platform data dir.
    pub fn open() -> rustyline::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = dirs::data_dir().map(|d| d.join("cloudmgr").join("history"));
        if let Some(ref path) = history
            && path.exists()
            && let Err(e) = editor.load_history(path)
        {
            tracing::warn!(path = %path.display(), error = %e, "could not load history");
        }
        Ok(Self { editor, history })
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            // Ctrl-C abandons the current answer.
            Err(ReadlineError::Interrupted) => Some(String::new()),
            Err(ReadlineError::Eof) => None,
            Err(e) => {
                tracing::warn!(error = %e, "readline failed");
                None
            }
        }
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn heading(&mut self, line: &str) {
        println!("{}", line.bold());
    }

    fn success(&mut self, line: &str) {
        println!("{}", line.green());
    }

    fn failure(&mut self, line: &str) {
        println!("{}", line.red());
    }

    fn clear(&mut self) {
        if let Err(e) = self.editor.clear_screen() {
            tracing::warn!(error = %e, "could not clear screen");
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let Some(ref path) = self.history else { return };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not save history");
        }
    }
}

/// Scripted console for tests: queued answers in, captured lines out.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Script {
    input: std::collections::VecDeque<String>,
    /// Every printed line, in order.
    pub output: Vec<String>,
    /// Number of `clear` calls.
    pub clears: usize,
}

#[cfg(test)]
impl Script {
    pub fn new<const N: usize>(answers: [&str; N]) -> Self {
        Self {
            input: answers.iter().map(|a| (*a).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// `true` if any printed line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|l| l.contains(needle))
    }

    /// Answers not consumed by the flow.
    pub fn unread(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
impl Console for Script {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.input.pop_front()
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_owned());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}
