//! Tracing initialization and the rolling diagnostic log buffer

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;

/// How many entries the diagnostic buffer retains.
pub const LOG_BUFFER_CAPACITY: usize = 256;

/// One buffered log entry.
#[derive(Debug, Clone)]
pub struct BufferedLog {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// A rolling buffer of the last N log entries, surfaced through
/// `/api/status` diagnostics.
///
/// Writers use `try_lock` and drop the entry on contention — losing a
/// diagnostic line is preferable to blocking a request path on the logger.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<BufferedLog>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, entry: BufferedLog) {
        if let Ok(mut buf) = self.inner.try_lock() {
            if buf.len() == self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(LOG_BUFFER_CAPACITY)
    }
}

/// Tracing layer feeding the rolling buffer.
pub struct LogBufferLayer {
    buffer: LogBuffer,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

impl<S: Subscriber> Layer<S> for LogBufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        self.buffer.push(BufferedLog {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: event.metadata().level().to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
        });
    }
}

/// Initialize JSON tracing with the configured verbosity and attach the
/// diagnostic buffer. Returns the buffer handle for `AppState`.
pub fn init_tracing(config: &Config) -> Result<LogBuffer> {
    let buffer = LogBuffer::default();
    let filter = EnvFilter::try_new(&config.service.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .with(LogBufferLayer::new(buffer.clone()))
        .init();

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(buffer)
}
