use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for the human-readable report. Stdout in the binary, an
/// in-memory buffer in tests.
pub struct Console {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Console writing into a buffer that can be read back.
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(Box::new(captured.clone())), captured)
    }

    pub fn line(&self, text: impl AsRef<str>) {
        let mut sink = self.lock();
        // A closed stdout must not take the run down with it.
        let _ = writeln!(sink, "{}", text.as_ref());
        let _ = sink.flush();
    }

    pub fn lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sink = self.lock();
        for line in lines {
            let _ = writeln!(sink, "{}", line.as_ref());
        }
        let _ = sink.flush();
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared buffer behind `Console::capture`.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_lines_are_newline_terminated() {
        let (console, captured) = Console::capture();
        console.line("one");
        console.lines(["two", "three"]);
        assert_eq!(captured.text(), "one\ntwo\nthree\n");
    }
}
