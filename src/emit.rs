use std::fmt::Arguments;
use std::io::{self, Write};

/// An indentation-tracking writer for wasm text output.
///
/// Instead of three free functions closing over process-global state,
/// the indent level and the output stream are carried together in one
/// value that gets threaded through every generator function — no
/// thread-locals, no statics.
pub struct Emitter<'w> {
    out: &'w mut dyn Write,
    indent: usize,
}

impl<'w> Emitter<'w> {
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self { out, indent: 0 }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes one line, prefixed with the current indentation and
    /// suffixed with a newline.
    pub fn line(&mut self, args: Arguments<'_>) -> io::Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(b"  ")?;
        }
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    /// Runs `body` with the indent level raised by one, then restores it.
    /// Every structured-block open in this crate's generators is written
    /// as `emitter.line(...open...)?; emitter.block(|e| ...)?; ...close...`
    /// so the open/close pair can never drift out of sync with the
    /// indent level.
    pub fn block<F>(&mut self, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Emitter<'_>) -> io::Result<()>,
    {
        self.indent();
        let result = body(self);
        self.dedent();
        result
    }
}

/// Writes one line to an [`Emitter`], in the style of `println!`.
macro_rules! wline {
    ($emitter:expr, $($arg:tt)*) => {
        $emitter.line(format_args!($($arg)*))
    };
}

pub(crate) use wline;
