use rand::rngs::StdRng;
use spindare_shared::{
    ChallengePool, RngSource, SpinConfig, SpinError, SpinEvent, SpinPlan, SpinState,
    SpinStateMachine,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::HostError;

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub type SessionMachine = SpinStateMachine<RngSource<StdRng>>;

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// One wheel instance: the state machine plus the timers that drive it.
///
/// Events go out on a broadcast channel so presentation, haptics and
/// notification can each follow along independently.
pub struct GameSession {
    id: Uuid,
    machine: Arc<Mutex<SessionMachine>>,
    events: broadcast::Sender<SpinEvent>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl GameSession {
    pub fn new(
        pool: Arc<ChallengePool>,
        config: SpinConfig,
        seed: Option<u64>,
    ) -> Result<Self, HostError> {
        let machine = match seed {
            Some(seed) => SessionMachine::seeded(pool, config, seed)?,
            None => SessionMachine::from_entropy(pool, config)?,
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            id: Uuid::new_v4(),
            machine: Arc::new(Mutex::new(machine)),
            events,
            timer: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpinEvent> {
        self.events.subscribe()
    }

    pub async fn current_state(&self) -> SpinState {
        self.machine.lock().await.current_state().clone()
    }

    pub async fn resting_angle(&self) -> f64 {
        self.machine.lock().await.resting_angle()
    }

    pub async fn start_free_spin(&self) -> Result<SpinPlan, SpinError> {
        let mut machine = self.machine.lock().await;
        let plan = machine.start_free_spin(now())?;
        tracing::info!(
            "🎡 WHEEL SPIN: session {} spin {} heading for {:.2}",
            self.id,
            plan.spin_id,
            plan.target_angle
        );
        self.launch(&plan).await;
        Ok(plan)
    }

    pub async fn start_drag(&self, pointer_delta: f64) -> Result<(), SpinError> {
        self.machine.lock().await.start_drag(pointer_delta, now())
    }

    pub async fn continue_drag(&self, pointer_delta: f64) -> Result<f64, SpinError> {
        self.machine.lock().await.continue_drag(pointer_delta)
    }

    pub async fn end_drag(&self) -> Result<SpinPlan, SpinError> {
        let mut machine = self.machine.lock().await;
        let plan = machine.end_drag(now())?;
        tracing::info!(
            "🎡 WHEEL SPIN: session {} drag {} released toward {:.2}",
            self.id,
            plan.spin_id,
            plan.target_angle
        );
        self.launch(&plan).await;
        Ok(plan)
    }

    /// The presentation finished the rotation before the reveal timer did.
    pub async fn report_settled(&self) -> Result<(), SpinError> {
        let mut machine = self.machine.lock().await;
        let outcome = machine.on_settle()?;
        machine.finish_reveal()?;
        self.abort_timer().await;
        let _ = self.events.send(SpinEvent::Outcome(outcome));
        Ok(())
    }

    /// Stops the spin in flight without an outcome.
    pub async fn cancel(&self) -> bool {
        let mut machine = self.machine.lock().await;
        self.abort_timer().await;
        let spin_id = machine.active_spin_id();
        if !machine.cancel() {
            return false;
        }
        if let Some(spin_id) = spin_id {
            tracing::info!("🛑 WHEEL SPIN: session {} spin {} cancelled", self.id, spin_id);
            let _ = self.events.send(SpinEvent::Cancelled { spin_id });
        }
        true
    }

    /// Cancels anything in flight and waits for the timer task to wind down.
    pub async fn shutdown(&self) {
        self.cancel().await;
        if let Some(handle) = self.timer.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Announces `plan` and arms its timers. Callers hold the machine lock so
    /// no other event can slip in ahead of `Started`.
    async fn launch(&self, plan: &SpinPlan) {
        let _ = self.events.send(SpinEvent::Started(plan.clone()));

        let handle = tokio::spawn(drive_timers(
            self.id,
            plan.spin_id,
            self.machine.clone(),
            self.events.clone(),
        ));
        if let Some(previous) = self.timer.lock().await.replace(handle) {
            previous.abort();
        }
    }

    async fn abort_timer(&self) {
        if let Some(handle) = self.timer.lock().await.as_ref() {
            handle.abort();
        }
    }
}

/// Sleeps until each deadline of `spin_id`, fires it, and returns the wheel
/// to idle once the outcome is out. Stops quietly if the spin is replaced.
async fn drive_timers(
    session_id: Uuid,
    spin_id: u64,
    machine: Arc<Mutex<SessionMachine>>,
    events: broadcast::Sender<SpinEvent>,
) {
    loop {
        let deadline = {
            let machine = machine.lock().await;
            if machine.active_spin_id() != Some(spin_id) {
                return;
            }
            match machine.next_deadline() {
                Some(deadline) => deadline,
                None => return,
            }
        };

        tokio::time::sleep_until(Instant::from_std(deadline)).await;

        let mut machine = machine.lock().await;
        if machine.active_spin_id() != Some(spin_id) {
            return;
        }
        let fired = match machine.poll(now()) {
            Ok(fired) => fired,
            Err(e) => {
                tracing::error!("Session {} spin {} failed to resolve: {}", session_id, spin_id, e);
                machine.cancel();
                return;
            }
        };

        for event in fired {
            let revealed = matches!(event, SpinEvent::Outcome(_));
            if let SpinEvent::Outcome(outcome) = &event {
                tracing::info!(
                    "🎡 WHEEL SPIN: session {} landed on {} -> challenge #{}",
                    session_id,
                    outcome.color.display_name(),
                    outcome.challenge.id
                );
            }
            let _ = events.send(event);
            if revealed {
                if let Err(e) = machine.finish_reveal() {
                    tracing::warn!("Session {} could not leave reveal: {}", session_id, e);
                }
                return;
            }
        }
    }
}

/// Every running wheel, sharing one challenge pool.
#[derive(Clone)]
pub struct WheelGameState {
    pub pool: Arc<ChallengePool>,
    pub config: SpinConfig,
    seed: Option<u64>,
    /// Number of sessions ever created. Never decreases.
    created: Arc<AtomicU64>,
    pub sessions: Arc<Mutex<HashMap<Uuid, Arc<GameSession>>>>,
}

impl WheelGameState {
    pub fn new(pool: Arc<ChallengePool>, config: SpinConfig, seed: Option<u64>) -> Self {
        Self {
            pool,
            config,
            seed,
            created: Arc::new(AtomicU64::new(0)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn create_session(&self) -> Result<Arc<GameSession>, HostError> {
        let mut sessions = self.sessions.lock().await;
        let ordinal = self.created.fetch_add(1, Ordering::Relaxed);
        let seed = self.seed.map(|seed| seed.wrapping_add(ordinal));
        let session = Arc::new(GameSession::new(self.pool.clone(), self.config.clone(), seed)?);
        sessions.insert(session.id(), session.clone());
        tracing::info!("Created wheel session {} ({} running)", session.id(), sessions.len());
        Ok(session)
    }

    pub async fn get_session(&self, id: Uuid) -> Option<Arc<GameSession>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    pub async fn close_session(&self, id: Uuid) -> bool {
        let session = self.sessions.lock().await.remove(&id);
        match session {
            Some(session) => {
                session.shutdown().await;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindare_shared::{sector_of, ColorSector, SpinOutcome};
    use std::time::Duration;

    fn pool() -> Arc<ChallengePool> {
        Arc::new(ChallengePool::builtin().unwrap())
    }

    fn session(config: SpinConfig, seed: u64) -> GameSession {
        GameSession::new(pool(), config, Some(seed)).unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<SpinEvent>) -> Vec<SpinEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn outcomes(events: &[SpinEvent]) -> Vec<SpinOutcome> {
        events
            .iter()
            .filter_map(|event| match event {
                SpinEvent::Outcome(outcome) => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_commit_spin_reveals_once() {
        let session = session(SpinConfig::early_commit(), 7);
        let mut rx = session.subscribe();

        let plan = session.start_free_spin().await.unwrap();
        let committed = plan.committed_color.unwrap();

        advance(2600).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SpinEvent::Started(_)));
        assert!(matches!(
            events[1],
            SpinEvent::RevealSweepStarted { color, .. } if color == committed
        ));
        assert_eq!(session.current_state().await.name(), "spinning");

        advance(1000).await;
        let events = drain(&mut rx);
        let revealed = outcomes(&events);
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].color, committed);
        assert_eq!(revealed[0].challenge.color, committed);
        assert_eq!(sector_of(session.resting_angle().await), committed);
        assert!(session.current_state().await.is_idle());

        advance(10_000).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_commit_spin_reveals_at_spin_end() {
        let session = session(SpinConfig::late_commit(), 9);
        let mut rx = session.subscribe();

        let plan = session.start_free_spin().await.unwrap();
        assert!(plan.committed_color.is_none());

        advance(2900).await;
        assert!(outcomes(&drain(&mut rx)).is_empty());

        advance(200).await;
        let revealed = outcomes(&drain(&mut rx));
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].color, sector_of(plan.target_angle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_never_produces_an_outcome() {
        let session = session(SpinConfig::early_commit(), 3);
        let mut rx = session.subscribe();

        let plan = session.start_free_spin().await.unwrap();
        advance(1000).await;
        assert!(session.cancel().await);
        assert!(!session.cancel().await);

        advance(10_000).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SpinEvent::Cancelled { spin_id } if spin_id == plan.spin_id));
        assert!(outcomes(&events).is_empty());
        assert!(session.current_state().await.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_spin_rejected_while_spinning() {
        let session = session(SpinConfig::early_commit(), 5);
        let mut rx = session.subscribe();

        session.start_free_spin().await.unwrap();
        let err = session.start_free_spin().await.unwrap_err();
        assert!(err.is_invalid_transition());
        assert!(session.start_drag(10.0).await.is_err());

        advance(5000).await;
        assert_eq!(outcomes(&drain(&mut rx)).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_release_resolves_from_resting_sector() {
        let session = session(SpinConfig::early_commit(), 1);
        let mut rx = session.subscribe();

        session.start_drag(30.0).await.unwrap();
        assert_eq!(session.continue_drag(10.0).await.unwrap(), 40.0);
        assert_eq!(session.current_state().await.name(), "dragging");

        advance(500).await;
        assert!(drain(&mut rx).is_empty());

        let plan = session.end_drag().await.unwrap();
        assert_eq!(plan.target_angle, 80.0);
        assert!(plan.committed_color.is_none());

        advance(4100).await;
        let revealed = outcomes(&drain(&mut rx));
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].color, ColorSector::Red);
        assert_eq!(revealed[0].final_angle, 80.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_report_wins_over_timer() {
        let session = session(SpinConfig::late_commit(), 11);
        let mut rx = session.subscribe();

        session.start_free_spin().await.unwrap();
        advance(1500).await;
        session.report_settled().await.unwrap();
        assert!(session.current_state().await.is_idle());
        assert!(session.report_settled().await.is_err());

        advance(5000).await;
        assert_eq!(outcomes(&drain(&mut rx)).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_share_one_pool() {
        let state = WheelGameState::new(pool(), SpinConfig::early_commit(), Some(21));
        let first = state.create_session().await.unwrap();
        let second = state.create_session().await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(Arc::strong_count(&state.pool), 3);

        let mut first_rx = first.subscribe();
        let mut second_rx = second.subscribe();
        first.start_free_spin().await.unwrap();
        advance(1000).await;
        second.start_free_spin().await.unwrap();

        advance(2600).await;
        assert_eq!(outcomes(&drain(&mut first_rx)).len(), 1);
        assert!(outcomes(&drain(&mut second_rx)).is_empty());

        advance(1000).await;
        assert_eq!(outcomes(&drain(&mut second_rx)).len(), 1);

        assert!(state.get_session(first.id()).await.is_some());
        assert!(state.close_session(first.id()).await);
        assert!(!state.close_session(first.id()).await);
        assert!(state.get_session(first.id()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopened_slot_gets_a_fresh_seed() {
        let state = WheelGameState::new(pool(), SpinConfig::late_commit(), Some(100));
        let a = state.create_session().await.unwrap();
        let b = state.create_session().await.unwrap();
        assert!(state.close_session(a.id()).await);
        let c = state.create_session().await.unwrap();

        let mut identical = 0;
        for _ in 0..20 {
            let from_b = b.start_free_spin().await.unwrap();
            let from_c = c.start_free_spin().await.unwrap();
            if from_b.target_angle == from_c.target_angle {
                identical += 1;
            }
            b.report_settled().await.unwrap();
            c.report_settled().await.unwrap();
        }
        assert!(identical < 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_outcome_precedes_next_start() {
        let session = session(SpinConfig::late_commit(), 13);
        let mut rx = session.subscribe();

        for _ in 0..5 {
            session.start_free_spin().await.unwrap();
            let (settled, restarted) =
                tokio::join!(session.report_settled(), session.start_free_spin());
            settled.unwrap();
            if restarted.is_ok() {
                session.report_settled().await.unwrap();
            }
        }
        session.cancel().await;

        let mut in_flight = false;
        for event in drain(&mut rx) {
            match event {
                SpinEvent::Started(_) => {
                    assert!(!in_flight, "spin started before the previous one revealed");
                    in_flight = true;
                }
                SpinEvent::Outcome(_) | SpinEvent::Cancelled { .. } => {
                    assert!(in_flight, "outcome without a spin in flight");
                    in_flight = false;
                }
                SpinEvent::RevealSweepStarted { .. } => {}
            }
        }
        assert!(!in_flight);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_follows_started() {
        let session = session(SpinConfig::early_commit(), 17);
        let mut rx = session.subscribe();

        let (started, cancelled) = tokio::join!(session.start_free_spin(), session.cancel());
        let events = drain(&mut rx);
        if cancelled {
            assert!(started.is_ok());
            assert!(matches!(events[0], SpinEvent::Started(_)));
            assert!(matches!(events[1], SpinEvent::Cancelled { .. }));
        } else {
            assert!(matches!(events.as_slice(), [SpinEvent::Started(_)]));
            session.cancel().await;
        }
        advance(10_000).await;
        assert!(outcomes(&drain(&mut rx)).is_empty());
    }
}
