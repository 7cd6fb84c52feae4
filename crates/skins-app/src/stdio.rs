//! Terminal window: pickers and prompts answered on stdin.

use std::io::{BufRead, Write};

use skins_host::{QuickPanelItem, Window};

/// What the user typed at a picker prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Choose(usize),
    Preview(usize),
    Cancel,
}

/// A [`Window`] that prints to `out` and reads answers from `input`.
pub struct StdioWindow<R, W> {
    input: R,
    out: W,
    rows: usize,
}

impl<R: BufRead, W: Write> StdioWindow<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            rows: 0,
        }
    }

    /// Read the user's answer to the last picker.
    ///
    /// `N` picks row `N`, `?N` previews it. Anything else cancels.
    pub fn read_answer(&mut self) -> std::io::Result<Answer> {
        write!(
            self.out,
            "Select 1-{}, ?N to preview (empty to cancel): ",
            self.rows
        )?;
        self.out.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(Answer::Cancel);
        };
        let line = line.trim();
        let (preview, number) = match line.strip_prefix('?') {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        let row = number
            .parse::<usize>()
            .ok()
            .filter(|&n| (1..=self.rows).contains(&n))
            .map(|n| n - 1);
        Ok(match row {
            Some(i) if preview => Answer::Preview(i),
            Some(i) => Answer::Choose(i),
            None => Answer::Cancel,
        })
    }

    /// Read the answer to the last input panel. `None` means cancel (EOF).
    pub fn read_text(&mut self) -> std::io::Result<Option<String>> {
        self.read_line()
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Print one line of command output.
    pub fn print_line(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "{text}")
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }
}

impl<R: BufRead, W: Write> Window for StdioWindow<R, W> {
    fn show_quick_panel(&mut self, items: Vec<QuickPanelItem>, selected_index: Option<usize>) {
        self.rows = items.len();
        for (i, item) in items.iter().enumerate() {
            let marker = if Some(i) == selected_index { '*' } else { ' ' };
            if let Err(e) = writeln!(
                self.out,
                "{marker}{:>3}  {}  ({})",
                i + 1,
                item.trigger,
                item.details
            ) {
                log::error!("Could not print picker: {e}");
                return;
            }
        }
    }

    fn show_input_panel(&mut self, caption: &str, initial_text: &str) {
        let shown = if initial_text.is_empty() {
            format!("{caption} ")
        } else {
            format!("{caption} [{initial_text}] ")
        };
        if let Err(e) = write!(self.out, "{shown}").and_then(|()| self.out.flush()) {
            log::error!("Could not print prompt: {e}");
        }
    }

    fn status_message(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            log::error!("Could not print status: {e}");
        }
    }
}
