//! Logging and tracing setup for clusterplot hosts.
//!
//! `log` macros from the engine are bridged into `tracing`, filtered through
//! an `EnvFilter`, and forwarded to optional host hooks as serializable
//! records. Span timings can be collected as Chrome-trace complete events.

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Environment variable consulted after `RUST_LOG`.
pub const LOG_ENV: &str = "CLUSTERPLOT_LOG";

#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub ts: String,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<JsonValue>,
}

/// Chrome trace-event format entry.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub name: String,
    pub cat: String,
    /// `X` for a completed span, `i` for an instant event.
    pub ph: String,
    /// Microseconds since the Unix epoch.
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dur: Option<i64>,
    pub pid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<JsonValue>,
}

type LogHook = Arc<dyn Fn(&LogRecord) + Send + Sync>;
type TraceHook = Arc<dyn Fn(&[TraceEvent]) + Send + Sync>;

static LOG_HOOK: OnceCell<LogHook> = OnceCell::new();
static TRACE_HOOK: OnceCell<TraceHook> = OnceCell::new();

/// Keeps a thread-local subscriber alive when a global one already exists.
pub struct LoggingGuard {
    _guard: Option<DefaultGuard>,
}

#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter used when neither `RUST_LOG` nor `CLUSTERPLOT_LOG` is set.
    pub default_level: String,
    pub enable_traces: bool,
    pub pid: i64,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            enable_traces: false,
            pid: std::process::id() as i64,
        }
    }
}

/// Install the log hook. Only the first call takes effect.
pub fn set_log_hook<F>(hook: F)
where
    F: Fn(&LogRecord) + Send + Sync + 'static,
{
    let _ = LOG_HOOK.set(Arc::new(hook));
}

/// Install the trace hook. Only the first call takes effect.
pub fn set_trace_hook<F>(hook: F)
where
    F: Fn(&[TraceEvent]) + Send + Sync + 'static,
{
    let _ = TRACE_HOOK.set(Arc::new(hook));
}

pub fn init_logging(opts: LoggingOptions) -> LoggingGuard {
    let _ = LogTracer::init();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .or_else(|_| EnvFilter::try_new(&opts.default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let build_subscriber = || {
        let trace_layer = opts
            .enable_traces
            .then_some(SpanTimingLayer { pid: opts.pid });
        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(LogBridgeLayer)
            .with(trace_layer)
    };

    let guard = match tracing::subscriber::set_global_default(build_subscriber()) {
        Ok(()) => None,
        Err(_) => Some(tracing::subscriber::set_default(build_subscriber())),
    };

    LoggingGuard { _guard: guard }
}

/// Run `f` inside an `info` span named `name`.
pub fn with_build_span<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let span = tracing::info_span!("scene_build", build = %name);
    let _enter = span.enter();
    f()
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_timestamp_micros() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

struct LogBridgeLayer;

impl<S> Layer<S> for LogBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let hook = match LOG_HOOK.get() {
            Some(h) => h,
            None => return,
        };

        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        // log records arrive through LogTracer with their real target in a field
        let target = visitor
            .take_field("log.target")
            .unwrap_or_else(|| event.metadata().target().to_string());
        for bookkeeping in ["log.module_path", "log.file", "log.line"] {
            visitor.take_field(bookkeeping);
        }

        let record = LogRecord {
            ts: now_rfc3339(),
            level: event.metadata().level().to_string(),
            target,
            message: visitor
                .message
                .unwrap_or_else(|| event.metadata().name().to_string()),
            span: ctx.event_span(event).map(|s| s.name().to_string()),
            fields: visitor.fields.filter(|v| {
                v.as_object().map(|m| !m.is_empty()).unwrap_or(false)
            }),
        };

        hook(&record);
    }
}

/// Start time and recorded fields for an open span.
struct SpanTiming {
    start: i64,
    args: Option<JsonValue>,
}

#[derive(Clone)]
struct SpanTimingLayer {
    pid: i64,
}

impl<S> Layer<S> for SpanTimingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if TRACE_HOOK.get().is_none() {
            return;
        }
        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanTiming {
                start: now_timestamp_micros(),
                args: visitor.fields,
            });
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let hook = match TRACE_HOOK.get() {
            Some(h) => h,
            None => return,
        };
        // only events inside a span belong on the timeline
        if ctx.event_span(event).is_none() {
            return;
        }
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let ev = TraceEvent {
            name: visitor
                .message
                .unwrap_or_else(|| event.metadata().name().to_string()),
            cat: event.metadata().target().to_string(),
            ph: "i".to_string(),
            ts: now_timestamp_micros(),
            dur: None,
            pid: self.pid,
            args: None,
        };
        hook(&[ev]);
    }

    fn on_close(&self, id: tracing::span::Id, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let hook = match TRACE_HOOK.get() {
            Some(h) => h,
            None => return,
        };
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let ext = span.extensions();
        let Some(timing) = ext.get::<SpanTiming>() else {
            return;
        };
        let ev = TraceEvent {
            name: span.name().to_string(),
            cat: span.metadata().target().to_string(),
            ph: "X".to_string(),
            ts: timing.start,
            dur: Some((now_timestamp_micros() - timing.start).max(0)),
            pid: self.pid,
            args: timing.args.clone(),
        };
        hook(&[ev]);
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Option<JsonValue>,
}

impl JsonVisitor {
    fn insert(&mut self, name: &str, value: JsonValue) {
        let obj = self
            .fields
            .get_or_insert_with(|| JsonValue::Object(Default::default()));
        if let JsonValue::Object(map) = obj {
            map.insert(name.to_string(), value);
        }
    }

    fn take_field(&mut self, name: &str) -> Option<String> {
        let map = self.fields.as_mut()?.as_object_mut()?;
        match map.remove(name)? {
            JsonValue::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let text = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.insert(field.name(), JsonValue::String(text));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field.name(), JsonValue::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field.name(), JsonValue::from(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field.name(), JsonValue::from(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field.name(), JsonValue::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn log_macros_reach_the_hook() {
        let captured: Arc<Mutex<Vec<LogRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let hook = {
            let c = captured.clone();
            move |rec: &LogRecord| {
                c.lock().unwrap().push(rec.clone());
            }
        };
        set_log_hook(hook);
        let _guard = init_logging(LoggingOptions {
            default_level: "debug".to_string(),
            ..LoggingOptions::default()
        });

        log::warn!(target: "clusterplot", "skipping point 'p1'");
        tracing::info!(points = 3u64, "scene built");

        let items = captured.lock().unwrap();
        assert!(items
            .iter()
            .any(|r| r.message.contains("skipping point") && r.target == "clusterplot"));
        let built = items
            .iter()
            .find(|r| r.message == "scene built")
            .expect("tracing event captured");
        assert_eq!(
            built.fields.as_ref().and_then(|f| f.get("points")),
            Some(&JsonValue::from(3u64))
        );
    }

    #[test]
    fn visitor_separates_message_from_fields() {
        let mut visitor = JsonVisitor::default();
        visitor.insert("log.target", JsonValue::String("clusterplot".into()));
        visitor.insert("count", JsonValue::from(2u64));
        assert_eq!(visitor.take_field("log.target").as_deref(), Some("clusterplot"));
        assert_eq!(visitor.take_field("count").as_deref(), Some("2"));
        assert!(visitor.take_field("missing").is_none());
    }
}
