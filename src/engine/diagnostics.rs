use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Plain-text trace of raw ephemeris traffic, truncated on every run.
///
/// Write failures are reported once through `tracing` and then the log goes
/// quiet; they never affect the report.
pub struct DiagnosticLog {
    sink: Option<Box<dyn Write>>,
}

impl DiagnosticLog {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            sink: Some(Box::new(BufWriter::new(file))),
        })
    }

    /// Open `path` if given; fall back to a disabled log on failure.
    pub fn open_or_disabled(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::create(path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "diagnostic log unavailable: {e}");
                Self::disabled()
            }),
            None => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn record(&mut self, line: impl AsRef<str>) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(sink, "{}", line.as_ref()) {
            tracing::warn!("diagnostic log write failed, disabling: {e}");
            self.sink = None;
        }
    }
}

impl Drop for DiagnosticLog {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.flush();
        }
    }
}
