use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented terminal the menus talk to.
pub trait Console {
    /// Next input line without its trailing newline; `None` at end of input.
    fn read_line(&mut self) -> Option<String>;

    fn print(&mut self, text: &str);

    fn eprintln(&mut self, line: &str);

    fn println(&mut self, line: &str) {
        self.print(line);
        self.print("\n");
    }

    fn prompt(&mut self, label: &str) -> Option<String> {
        self.print(label);
        self.read_line()
    }
}

/// Stdin/stdout console used by the binary.
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::error!("stdin read failed: {}", e);
                None
            }
        }
    }

    fn print(&mut self, text: &str) {
        let mut out = self.stdout.lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn eprintln(&mut self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Console fed from a fixed list of input lines, recording everything
/// printed. Used to replay sessions in tests.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: String,
    errors: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Input lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self) -> Option<String> {
        let line = self.input.pop_front()?;
        // echo so the transcript reads like a terminal session
        self.output.push_str(&line);
        self.output.push('\n');
        Some(line)
    }

    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn eprintln(&mut self, line: &str) {
        self.errors.push(line.to_string());
    }
}
