//! Non-blocking line console.
//!
//! A single editable input line on a raw-mode terminal, polled once per tick
//! by the hosting loop. The console never blocks: key intake uses a
//! zero-timeout event poll, and the displayed line can be temporarily erased
//! so other output can be written above it, then restored exactly as the
//! user left it.
//!
//! # Architecture
//!
//! [`LineEditor`] is the pure buffer+cursor state machine, completely
//! decoupled from I/O. [`TerminalConsole`] owns the terminal (raw mode,
//! prompt drawing, erase/restore) and feeds key events into the editor.

mod editor;
mod terminal;

pub use editor::{EditKey, LineEditor};
pub use terminal::{ConsolePoll, TerminalConsole};
