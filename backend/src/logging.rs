use tracing::{Event, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,spindare_backend=info,spindare_shared=info";

#[derive(Default)]
struct MessageVisitor {
    message: String,
    /// Set for records bridged from the `log` facade.
    log_target: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message.push_str(&format!("{:?}", value)),
            name if name.starts_with("log.") => {}
            name => self.message.push_str(&format!(" {}={:?}", name, value)),
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message.push_str(value),
            "log.target" => self.log_target = Some(value.to_string()),
            name if name.starts_with("log.") => {}
            name => self.message.push_str(&format!(" {}={}", name, value)),
        }
    }
}

/// `glyph target - message`, or `None` for events with nothing to say.
fn render(event: &Event<'_>) -> Option<String> {
    let metadata = event.metadata();

    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    if visitor.message.is_empty() {
        return None;
    }

    let target = visitor.log_target.as_deref().unwrap_or(metadata.target());
    let glyph = match metadata.level().as_str() {
        "ERROR" => "❌ Error:",
        "WARN" => "⚠️ Warning:",
        "INFO" => "ℹ️",
        "DEBUG" => "🔄",
        _ => return None,
    };
    Some(format!("{} {} - {}", glyph, target, visitor.message))
}

struct GameLogLayer;

impl<S: Subscriber> Layer<S> for GameLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Some(line) = render(event) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            eprintln!("[{}] {}", timestamp, line);
        }
    }
}

/// Installs the global subscriber. Engine `log` records are bridged in too.
pub fn setup() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    Registry::default()
        .with(env_filter)
        .with(GameLogLayer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Capture(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if let Some(line) = render(event) {
                self.0.lock().unwrap().push(line);
            }
        }
    }

    #[test]
    fn test_bridged_records_keep_their_target() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Registry::default().with(Capture(lines.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                log.target = "spindare_shared::shared_wheel_game",
                log.module_path = "spindare_shared::shared_wheel_game",
                "spin 1 started"
            );
            tracing::warn!(spin = 2, "late timer");
            tracing::trace!("too quiet");
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ℹ️ spindare_shared::shared_wheel_game - spin 1 started");
        assert_eq!(
            lines[1],
            "⚠️ Warning: spindare_backend::logging::tests - late timer spin=2"
        );
    }
}
