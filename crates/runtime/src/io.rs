use crate::{ErrorKind, Result};
use std::{cell::RefCell, io::Write, rc::Rc};

/// A trait for the output streams written to by the Tama runtime
///
/// The `print` builtin and the bytecode VM's instruction trace write through
/// this trait, allowing embedders and tests to capture or redirect output.
pub trait ScriptOutput {
    /// Writes text to the output
    fn write(&self, text: &str) -> Result<()>;

    /// Writes text to the output, and appends a newline
    fn write_line(&self, text: &str) -> Result<()>;
}

/// A shared handle to a [ScriptOutput] implementation
pub type OutputHandle = Rc<dyn ScriptOutput>;

/// The process's stdout stream
#[derive(Default)]
pub struct DefaultStdout;

impl ScriptOutput for DefaultStdout {
    fn write(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|error| ErrorKind::IoError(error.to_string()).into())
    }

    fn write_line(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.write_all(b"\n"))
            .map_err(|error| ErrorKind::IoError(error.to_string()).into())
    }
}

/// An output stream that collects everything written to it
///
/// Useful in tests and in embedders that want to present script output
/// themselves.
#[derive(Clone, Default)]
pub struct CaptureOutput {
    captured: Rc<RefCell<String>>,
}

impl CaptureOutput {
    /// Returns the text that has been written to the stream so far
    pub fn captured(&self) -> String {
        self.captured.borrow().clone()
    }

    /// Clears the captured text
    pub fn clear(&self) {
        self.captured.borrow_mut().clear();
    }
}

impl ScriptOutput for CaptureOutput {
    fn write(&self, text: &str) -> Result<()> {
        self.captured.borrow_mut().push_str(text);
        Ok(())
    }

    fn write_line(&self, text: &str) -> Result<()> {
        let mut captured = self.captured.borrow_mut();
        captured.push_str(text);
        captured.push('\n');
        Ok(())
    }
}
