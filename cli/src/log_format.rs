//! Plain-text event format that prefixes each line with its span scope.
//!
//! Graph runs open a `graph{run_id=..}` span and each node step a `node{id=..}` span,
//! so a file line reads
//! `2026-01-01T00:00:00Z DEBUG graph{run_id=..}:node{id=agent}: weft::agent: ...`
//! and all lines of one conversation can be grepped by run id.

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// `TIMESTAMP LEVEL span{fields}:span{fields}: target: fields`.
pub struct SpanScopedText {
    timer: SystemTime,
    with_target: bool,
}

impl Default for SpanScopedText {
    fn default() -> Self {
        Self {
            timer: SystemTime,
            with_target: true,
        }
    }
}

impl SpanScopedText {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_target(mut self, on: bool) -> Self {
        self.with_target = on;
        self
    }
}

impl<S, N> FormatEvent<S, N> for SpanScopedText
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " {:>5} ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ":")?;
            }
            write!(writer, " ")?;
        }

        if self.with_target {
            write!(writer, "{}: ", event.metadata().target())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone)]
    struct VecWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for VecWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce(), formatter: SpanScopedText) -> String {
        let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
        let writer = {
            let sink = Arc::clone(&sink);
            move || VecWriter(Arc::clone(&sink))
        };
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(formatter)
                .with_writer(writer)
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, f);
        let bytes = sink.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn lines_carry_run_and_node_spans() {
        let out = capture(
            || {
                let graph = tracing::info_span!("graph", run_id = "r1");
                let _g = graph.enter();
                let node = tracing::info_span!("node", id = "agent");
                let _n = node.enter();
                tracing::info!(calls = 2, "model replied");
            },
            SpanScopedText::new(),
        );
        assert!(out.contains("graph{run_id=\"r1\"}:node{id=\"agent\"}:"), "{}", out);
        assert!(out.contains("INFO"));
        assert!(out.contains("model replied"));
        assert!(out.contains("calls=2"));
    }

    #[test]
    fn no_scope_and_no_target() {
        let out = capture(
            || tracing::warn!("outside"),
            SpanScopedText::new().with_target(false),
        );
        assert!(out.contains(" WARN outside"), "{}", out);
        assert!(!out.contains("log_format"));
    }
}
