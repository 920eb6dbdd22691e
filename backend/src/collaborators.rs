use serde::Serialize;
use spindare_shared::constants::{REVEAL_PULSE_MS, SPIN_START_WAVEFORM_MS};
use spindare_shared::SpinEvent;
use std::io::Write;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::HostError;

/// Something that reacts to spin events. Failures are logged and never stop
/// the wheel.
pub trait Collaborator: Send + 'static {
    fn name(&self) -> &'static str;
    fn handle(&mut self, event: &SpinEvent) -> Result<(), HostError>;
}

pub fn spawn_collaborator<C: Collaborator>(
    mut collaborator: C,
    mut events: broadcast::Receiver<SpinEvent>,
) -> JoinHandle<C> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = collaborator.handle(&event) {
                        tracing::warn!("{} failed to handle event: {}", collaborator.name(), e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("{} lagged, {} events dropped", collaborator.name(), n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        collaborator
    })
}

#[derive(Serialize)]
struct Frame<'a> {
    session: Uuid,
    color_hex: Option<String>,
    event: &'a SpinEvent,
}

/// Writes one JSON line per event for whatever renders the wheel.
pub struct Presentation<W> {
    session: Uuid,
    out: W,
}

impl<W: Write + Send + 'static> Presentation<W> {
    pub fn new(session: Uuid, out: W) -> Self {
        Self { session, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> Collaborator for Presentation<W> {
    fn name(&self) -> &'static str {
        "presentation"
    }

    fn handle(&mut self, event: &SpinEvent) -> Result<(), HostError> {
        let color = match event {
            SpinEvent::Started(plan) => plan.committed_color,
            SpinEvent::RevealSweepStarted { color, .. } => Some(*color),
            SpinEvent::Outcome(outcome) => Some(outcome.color),
            SpinEvent::Cancelled { .. } => None,
        };
        let frame = Frame {
            session: self.session,
            color_hex: color.map(|c| c.hex()),
            event,
        };
        serde_json::to_writer(&mut self.out, &frame)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

static START_PATTERN: [u64; 6] = SPIN_START_WAVEFORM_MS;
static REVEAL_PATTERN: [u64; 1] = [REVEAL_PULSE_MS];

/// Vibration pattern in milliseconds, alternating on and off.
pub fn haptic_pattern(event: &SpinEvent) -> Option<&'static [u64]> {
    match event {
        SpinEvent::Started(_) => Some(&START_PATTERN[..]),
        SpinEvent::Outcome(_) => Some(&REVEAL_PATTERN[..]),
        _ => None,
    }
}

#[derive(Default)]
pub struct Haptics {
    /// Vibration patterns played, one per started spin or reveal.
    pub patterns_played: usize,
}

impl Collaborator for Haptics {
    fn name(&self) -> &'static str {
        "haptics"
    }

    fn handle(&mut self, event: &SpinEvent) -> Result<(), HostError> {
        if let Some(pattern) = haptic_pattern(event) {
            self.patterns_played += 1;
            tracing::debug!("📳 Vibrate {:?}", pattern);
        }
        Ok(())
    }
}

pub fn notification_text(event: &SpinEvent) -> Option<String> {
    match event {
        SpinEvent::Outcome(outcome) => Some(format!(
            "🎉 {} CHALLENGE! 🎉",
            outcome.color.display_name()
        )),
        _ => None,
    }
}

#[derive(Default)]
pub struct Notifier {
    pub shown: Vec<String>,
}

impl Collaborator for Notifier {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn handle(&mut self, event: &SpinEvent) -> Result<(), HostError> {
        if let Some(text) = notification_text(event) {
            tracing::info!("{}", text);
            self.shown.push(text);
        }
        Ok(())
    }
}
