//! Report sinks.
//!
//! The decoder pushes each completed report into a [`Sink`] and never looks
//! back. [`VecSink`] keeps owned reports for tests and embedding;
//! [`JsonLinesSink`] serialises reports and lets a single background thread
//! do the writing so the decode loop is not stalled by the output device.

use std::io::Write;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::JoinHandle;

use tracing::warn;

use crate::decode::report::Report;

/// Consumer of decoded reports. Must not block the producer in the common
/// case; ordering is preserved.
pub trait Sink {
    fn emit(&mut self, report: Report);
}

/// Collects reports in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub reports: Vec<Report>,
}

impl Sink for VecSink {
    fn emit(&mut self, report: Report) {
        self.reports.push(report);
    }
}

/// Number of serialised lines handed to the writer thread at once.
const BATCH_SIZE: usize = 1000;

/// Writes one JSON object per line through a background writer thread.
///
/// Reports are serialised on the decoding thread (serialisation is cheap and
/// keeps ordering trivial); full batches travel over a bounded channel of
/// depth one, so the producer only waits when the writer is a whole batch
/// behind. `finish` flushes the tail batch and joins the writer.
pub struct JsonLinesSink {
    batch: Vec<String>,
    tx: Option<SyncSender<Vec<String>>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
}

impl JsonLinesSink {
    pub fn new<W: Write + Send + 'static>(mut out: W) -> Self {
        let (tx, rx): (SyncSender<Vec<String>>, Receiver<Vec<String>>) =
            std::sync::mpsc::sync_channel(1);
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            for batch in rx {
                for line in &batch {
                    out.write_all(line.as_bytes())?;
                    out.write_all(b"\n")?;
                }
            }
            out.flush()
        });
        JsonLinesSink {
            batch: Vec::with_capacity(BATCH_SIZE),
            tx: Some(tx),
            writer: Some(writer),
        }
    }

    fn push_batch(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let full = std::mem::replace(&mut self.batch, Vec::with_capacity(BATCH_SIZE));
        if let Some(tx) = &self.tx {
            // Blocks only while the previous batch is still being written.
            if tx.send(full).is_err() {
                warn!("json writer thread is gone, dropping batch");
            }
        }
    }

    /// Flush pending reports and wait for the writer to drain.
    pub fn finish(mut self) -> std::io::Result<()> {
        self.push_batch();
        drop(self.tx.take());
        match self.writer.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(std::io::Error::other("json writer thread panicked"))
            }),
            None => Ok(()),
        }
    }
}

impl Sink for JsonLinesSink {
    fn emit(&mut self, report: Report) {
        match serde_json::to_string(&report) {
            Ok(line) => self.batch.push(line),
            Err(e) => warn!("failed to serialise report: {e}"),
        }
        if self.batch.len() >= BATCH_SIZE {
            self.push_batch();
        }
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        self.push_batch();
        drop(self.tx.take());
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::report::{Plot, ReportHeader};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn plot(category: u8) -> Report {
        Report::Plot(Plot {
            header: ReportHeader { category, ..ReportHeader::default() },
            ..Plot::default()
        })
    }

    #[test]
    fn lines_are_written_in_order() {
        let buf = SharedBuf::default();
        let mut sink = JsonLinesSink::new(buf.clone());
        for cat in [1u8, 48, 48] {
            sink.emit(plot(cat));
        }
        sink.finish().unwrap();

        let bytes = buf.0.lock().unwrap().clone();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"category\":1"));
        assert!(lines[1].contains("\"category\":48"));
        assert!(lines[0].contains("\"report\":\"plot\""));
    }

    #[test]
    fn batches_spill_when_full() {
        let buf = SharedBuf::default();
        let mut sink = JsonLinesSink::new(buf.clone());
        for _ in 0..(BATCH_SIZE + 5) {
            sink.emit(plot(48));
        }
        sink.finish().unwrap();
        let bytes = buf.0.lock().unwrap().clone();
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), BATCH_SIZE + 5);
    }
}
