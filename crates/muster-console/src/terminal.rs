//! Raw-mode terminal console.
//!
//! Owns the terminal for the lifetime of the program: raw mode is enabled in
//! the constructor and released in [`TerminalConsole::close`] (or on drop).
//! All intake is a zero-timeout event poll so the caller's tick loop is
//! never stalled by the keyboard.

use std::{
    io::{self, Stdout, Write, stdout},
    time::Duration,
};

use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};

use crate::editor::{EditKey, LineEditor};

/// Result of one console poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolePoll {
    /// The user pressed return; the completed line is available via
    /// [`TerminalConsole::current_line`].
    LineReady,
    /// No completed line this tick.
    Pending,
    /// Ctrl-C was pressed. Raw mode swallows SIGINT, so the interrupt is
    /// reported through the poll result instead.
    Interrupted,
}

/// Interactive line console on a raw-mode terminal.
///
/// The displayed line is either fully shown (prompt plus buffered input,
/// cursor at the edit position) or fully hidden; `erase_displayed_line` and
/// `restore_displayed_line` switch between the two so asynchronous output
/// can be written above the prompt without corrupting the input.
#[derive(Debug)]
pub struct TerminalConsole {
    out: Stdout,
    editor: LineEditor,
    prompt: String,
    line_ready: bool,
    closed: bool,
}

impl TerminalConsole {
    /// Take over the terminal and enable raw mode.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            out: stdout(),
            editor: LineEditor::new(),
            prompt: String::new(),
            line_ready: false,
            closed: false,
        })
    }

    /// Set the prompt text drawn before the input line.
    pub fn set_prompt(&mut self, text: &str) {
        self.prompt = text.to_string();
    }

    /// Poll pending key events without blocking.
    ///
    /// Edit keys are applied to the line buffer and echoed. Return marks the
    /// line ready and stops consuming further keys until the caller clears
    /// the editing state.
    pub fn poll(&mut self) -> io::Result<ConsolePoll> {
        while !self.line_ready && event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if is_interrupt(&key) {
                        return Ok(ConsolePoll::Interrupted);
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL) {
                        continue;
                    }
                    if key.code == KeyCode::Enter {
                        // Leave the typed line on screen and move below it;
                        // dispatch output lands on the fresh line.
                        queue!(self.out, Print("\r\n"))?;
                        self.out.flush()?;
                        self.line_ready = true;
                        break;
                    }
                    if let Some(edit) = convert_key(key.code)
                        && self.editor.apply(edit)
                    {
                        self.redraw()?;
                    }
                },
                _ => {},
            }
        }

        Ok(if self.line_ready { ConsolePoll::LineReady } else { ConsolePoll::Pending })
    }

    /// The line as the user has typed it so far.
    pub fn current_line(&self) -> &str {
        self.editor.buffer()
    }

    /// Discard the buffered line and the line-ready marker.
    pub fn clear_editing(&mut self) {
        self.editor.clear();
        self.line_ready = false;
    }

    /// Draw a fresh prompt for the next line of input.
    pub fn reset_for_next_line(&mut self) -> io::Result<()> {
        self.redraw()
    }

    /// Erase the displayed prompt and input line from the terminal.
    ///
    /// The buffered contents are preserved; only the display is cleared so
    /// other output can be written in its place.
    pub fn erase_displayed_line(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        self.out.flush()
    }

    /// Redraw the prompt and the previously erased input line exactly as the
    /// user left it.
    pub fn restore_displayed_line(&mut self) -> io::Result<()> {
        self.redraw()
    }

    /// Write a block of output above the prompt area.
    ///
    /// Raw mode disables output post-processing, so line feeds are expanded
    /// to carriage-return/line-feed pairs here.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        for line in text.lines() {
            queue!(self.out, Print(line), Print("\r\n"))?;
        }
        self.out.flush()
    }

    /// Release the terminal. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = disable_raw_mode();
        }
    }

    fn redraw(&mut self) -> io::Result<()> {
        let column = self
            .prompt
            .chars()
            .count()
            .saturating_add(self.editor.cursor());
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(&self.prompt),
            Print(self.editor.buffer()),
            MoveToColumn(column as u16),
        )?;
        self.out.flush()
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        self.close();
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn convert_key(code: KeyCode) -> Option<EditKey> {
    match code {
        KeyCode::Char(c) => Some(EditKey::Char(c)),
        KeyCode::Backspace => Some(EditKey::Backspace),
        KeyCode::Delete => Some(EditKey::Delete),
        KeyCode::Left => Some(EditKey::Left),
        KeyCode::Right => Some(EditKey::Right),
        KeyCode::Home => Some(EditKey::Home),
        KeyCode::End => Some(EditKey::End),
        _ => None,
    }
}
