//! Logging initialization: logs go to `LOG_FILE` or are dropped, never to the console.
//!
//! The console belongs to the conversation (stdin prompts, `AI:` lines), so tracing
//! output only ever lands in a file.

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::log_format::SpanScopedText;

/// Installs the global subscriber.
///
/// - **RUST_LOG**: filter, e.g. `info`, `weft=debug`. Default: `info`.
/// - **LOG_FILE**: when set, logs are appended there as plain text; otherwise dropped.
pub fn init() -> std::io::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let writer = std::sync::Mutex::new(StripAnsiWriter::new(file));
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(SpanScopedText::new())
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(file_layer).init();
        tracing::info!(path = %path, "weft logging to file");
    } else {
        let sink_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::sink)
            .with_filter(filter);
        tracing_subscriber::registry().with(sink_layer).init();
    }
    Ok(())
}

/// Drops CSI escape sequences (`ESC [ params final`) on the way to `inner`.
///
/// Other escapes pass through. Sequences split across writes are handled.
struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(16),
        }
    }
}

const ESC: u8 = 0x1b;
const MAX_SEQUENCE: usize = 64;

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut out = Vec::with_capacity(buf.len());
        for &b in buf {
            match self.pending.len() {
                0 if b == ESC => self.pending.push(b),
                0 => out.push(b),
                1 if b == b'[' => self.pending.push(b),
                1 => {
                    out.append(&mut self.pending);
                    out.push(b);
                }
                _ if (0x40..=0x7e).contains(&b) => self.pending.clear(),
                _ if b.is_ascii_digit() || matches!(b, b';' | b'?' | b':') => {
                    self.pending.push(b);
                    if self.pending.len() > MAX_SEQUENCE {
                        out.append(&mut self.pending);
                    }
                }
                _ => {
                    out.append(&mut self.pending);
                    out.push(b);
                }
            }
        }
        self.inner.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            self.pending.clear();
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(chunks: &[&[u8]]) -> String {
        let mut w = StripAnsiWriter::new(Vec::new());
        for chunk in chunks {
            w.write_all(chunk).unwrap();
        }
        w.flush().unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn removes_color_codes() {
        assert_eq!(strip(&[b"\x1b[2mts\x1b[0m \x1b[32mINFO\x1b[0m done"]), "ts INFO done");
    }

    #[test]
    fn sequence_split_across_writes() {
        assert_eq!(strip(&[b"a\x1b[3", b"1mb\x1b", b"[0mc"]), "abc");
    }

    #[test]
    fn other_escapes_pass_through() {
        assert_eq!(strip(&[b"x\x1b(Bz"]), "x\x1b(Bz");
    }
}
