//! The agent façade.
//!
//! An [`Agent`] is what the simulation talks to. Once per tick it calls
//! [`Agent::update`]; reinforcement goes through [`Agent::praise`] and
//! [`Agent::punish`]; motor output is read back from the operation flags.
//! Everything that would block (pipe I/O) happens on the bridge tasks.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::agent::policy::{DefaultPolicy, OperationPolicy};
use crate::agent::sensor::{NullSensor, Sensor};
use crate::agent::state::OperationState;
use crate::bridge::{
    CommandQueue, OperationHandler, ProcessState, ProcessStreams, ReaderLoop, ReaderStats,
    ReasoningProcess,
};
use crate::dialect::DialectProfile;
use crate::types::operation::Operation;
use crate::types::perception::{Perception, PerceptionContext};
use crate::utilities::config::BridgeConfig;
use crate::utilities::errors::{BridgeError, Result};

// ---------------------------------------------------------------------------
// Shared state (reader task + simulation thread)
// ---------------------------------------------------------------------------

struct AgentShared {
    id: Uuid,
    operations: OperationState,
    control_enabled: AtomicBool,
    operations_received: AtomicU64,
    policy: RwLock<Arc<dyn OperationPolicy>>,
}

impl AgentShared {
    fn store_operation(&self, operation: &Operation) {
        let policy = self.policy.read().clone();
        self.operations
            .transact(|table| policy.store(table, operation));
    }

    fn handle_program_operation(&self, operation: Operation) {
        if !self.control_enabled.load(Ordering::SeqCst) {
            log::trace!("[{}] control disabled, ignoring {}", self.id, operation);
            return;
        }
        self.store_operation(&operation);
        self.operations_received.fetch_add(1, Ordering::SeqCst);
        log::debug!("[{}] backend executed {}", self.id, operation);
    }
}

// ---------------------------------------------------------------------------
// Brain: process + queue + loops
// ---------------------------------------------------------------------------

struct Brain {
    profile: Arc<DialectProfile>,
    queue: CommandQueue,
    process: Option<ReasoningProcess>,
    writer: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<ReaderStats>>,
    reader_shutdown: Option<oneshot::Sender<()>>,
}

impl Brain {
    fn put(&self, line: String) {
        self.queue.write_line(line);
    }

    /// Ask both loops to stop and kill the process. Idempotent.
    fn signal_stop(&mut self) {
        self.queue.clear();
        self.queue.close();
        if let Some(tx) = self.reader_shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(process) = self.process.as_mut() {
            process.terminate();
        }
    }
}

impl Drop for Brain {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A simulated agent whose decisions come from an external reasoner.
pub struct Agent {
    /// Identifier used in log lines.
    pub id: Uuid,
    config: BridgeConfig,
    goal: String,
    negative_goal: Option<String>,
    sense_enabled: bool,
    perceptions_sent: u64,
    sensor: Box<dyn Sensor>,
    shared: Arc<AgentShared>,
    brain: Option<Brain>,
}

impl Agent {
    /// An unequipped agent pursuing `goal`.
    pub fn new(goal: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            config: BridgeConfig::default(),
            goal: goal.into(),
            negative_goal: None,
            sense_enabled: true,
            perceptions_sent: 0,
            sensor: Box::new(NullSensor),
            shared: Arc::new(AgentShared {
                id,
                operations: OperationState::new(),
                control_enabled: AtomicBool::new(true),
                operations_received: AtomicU64::new(0),
                policy: RwLock::new(Arc::new(DefaultPolicy)),
            }),
            brain: None,
        }
    }

    /// Create and equip in one step. No agent is returned if launching fails.
    pub fn launch(
        goal: impl Into<String>,
        config: BridgeConfig,
        profile: Arc<DialectProfile>,
    ) -> Result<Self> {
        let mut agent = Self::new(goal).with_config(config);
        agent.equip(profile)?;
        Ok(agent)
    }

    /// Use `config` for the next [`equip`](Self::equip).
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Goal whose praise counts as punishment.
    pub fn with_negative_goal(mut self, goal: impl Into<String>) -> Self {
        self.negative_goal = Some(goal.into());
        self
    }

    /// Replace the sensing step used by [`update`](Self::update).
    pub fn with_sensor(mut self, sensor: impl Sensor + 'static) -> Self {
        self.sensor = Box::new(sensor);
        self
    }

    /// Replace the storage step for received and forced operations.
    pub fn with_policy(self, policy: impl OperationPolicy + 'static) -> Self {
        self.set_policy(policy);
        self
    }

    /// Swap the storage policy. Takes effect for the next stored operation,
    /// including ones arriving on the reader task.
    pub fn set_policy(&self, policy: impl OperationPolicy + 'static) {
        *self.shared.policy.write() = Arc::new(policy);
    }

    /// Swap the sensing step.
    pub fn set_sensor(&mut self, sensor: impl Sensor + 'static) {
        self.sensor = Box::new(sensor);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a reasoning process for `profile` and the loops around it.
    ///
    /// Requires a tokio runtime. The profile's startup lines and quiet
    /// directive are the first lines queued.
    pub fn equip(&mut self, profile: Arc<DialectProfile>) -> Result<()> {
        if self.brain.is_some() {
            return Err(BridgeError::AlreadyEquipped);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BridgeError::NoRuntime)?;
        let (process, streams) = ReasoningProcess::launch(&profile, &self.config.shell)?;

        let queue = CommandQueue::new(self.config.queue_soft_limit);
        for line in profile.startup_commands() {
            queue.write_line(line.as_str());
        }
        if let Some(directive) = profile.quiet_directive() {
            queue.write_line(directive);
        }

        let ProcessStreams { stdin, stdout } = streams;
        let writer_queue = queue.clone();
        let writer = runtime.spawn(async move {
            writer_queue.drain_into(stdin).await;
        });

        let shared = Arc::clone(&self.shared);
        let handler: OperationHandler = Arc::new(move |op| shared.handle_program_operation(op));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let reader = runtime.spawn(
            ReaderLoop::new(Arc::clone(&profile), handler).run(stdout, shutdown_rx),
        );

        log::info!("[{}] equipped with {} backend", self.id, profile.name());
        self.brain = Some(Brain {
            profile,
            queue,
            process: Some(process),
            writer: Some(writer),
            reader: Some(reader),
            reader_shutdown: Some(shutdown_tx),
        });
        Ok(())
    }

    /// Whether a reasoning process is attached.
    pub fn has_brain_equipped(&self) -> bool {
        self.brain.is_some()
    }

    /// Stop the loops, terminate the process and release the queue.
    ///
    /// Never fails and may be called any number of times. The agent can be
    /// equipped again afterwards.
    pub fn disconnect(&mut self) {
        match self.brain.take() {
            Some(mut brain) => {
                brain.signal_stop();
                log::info!("[{}] disconnected from {} backend", self.id, brain.profile.name());
            }
            None => log::debug!("[{}] disconnect: nothing equipped", self.id),
        }
    }

    /// [`disconnect`](Self::disconnect), then wait for both loops to finish
    /// and the process to be reaped.
    pub async fn shutdown(&mut self) {
        let Some(mut brain) = self.brain.take() else {
            return;
        };
        brain.signal_stop();
        if let Some(writer) = brain.writer.take() {
            let _ = writer.await;
        }
        if let Some(reader) = brain.reader.take() {
            match reader.await {
                Ok(stats) => log::debug!(
                    "[{}] reader finished after {} lines, {} operations",
                    self.id,
                    stats.lines,
                    stats.operations
                ),
                Err(e) => log::warn!("[{}] reader task failed: {}", self.id, e),
            }
        }
        if let Some(process) = brain.process.as_ref() {
            process.wait_terminated().await;
        }
    }

    /// Profile of the equipped backend.
    pub fn profile(&self) -> Option<&Arc<DialectProfile>> {
        self.brain.as_ref().map(|b| &b.profile)
    }

    /// Outbound queue of the equipped process.
    pub fn command_queue(&self) -> Option<&CommandQueue> {
        self.brain.as_ref().map(|b| &b.queue)
    }

    /// Lifecycle state of the equipped process.
    pub fn process_state(&self) -> Option<ProcessState> {
        self.brain
            .as_ref()
            .and_then(|b| b.process.as_ref())
            .map(|p| p.state())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Per-tick cadence: sense, remind the goal, step the reasoner.
    pub fn update(&mut self, context: &PerceptionContext) {
        for perception in self.sensor.sense(context) {
            self.add_perception(&perception);
        }
        let goal = self.goal.clone();
        self.put_goal(&goal, false);
        self.inference_step();
    }

    /// Request the profile's cycles, if it needs explicit stepping.
    pub fn inference_step(&self) {
        if let Some(brain) = &self.brain {
            if let Some(step) = brain.profile.render_step() {
                brain.put(step);
            }
        }
    }

    fn put_sentence(&self, render: impl FnOnce(&DialectProfile) -> Option<String>) -> bool {
        let Some(brain) = &self.brain else {
            log::debug!("[{}] no reasoning process equipped, sentence dropped", self.id);
            return false;
        };
        match render(&brain.profile) {
            Some(line) => {
                brain.put(line);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Perception
    // -----------------------------------------------------------------------

    /// Assert `perception` as an event happening now.
    ///
    /// No-op while sensing is disabled or no process is equipped; only
    /// forwarded perceptions are counted.
    pub fn add_perception(&mut self, perception: &Perception) {
        if !self.sense_enabled {
            return;
        }
        let sent = self.put_sentence(|p| Some(p.render_sense(&perception.object, &perception.state)));
        if sent {
            self.perceptions_sent += 1;
        }
    }

    /// Assert a property of the agent itself.
    pub fn add_self_perception(&mut self, state: &str) {
        self.add_perception(&Perception::of_self(state));
    }

    /// Perceptions forwarded to the backend so far.
    pub fn total_senses(&self) -> u64 {
        self.perceptions_sent
    }

    /// Whether perceptions are forwarded.
    pub fn sense_enabled(&self) -> bool {
        self.sense_enabled
    }

    /// Enable or disable forwarding perceptions.
    pub fn set_sense_enabled(&mut self, enabled: bool) {
        self.sense_enabled = enabled;
    }

    // -----------------------------------------------------------------------
    // Goals and reinforcement
    // -----------------------------------------------------------------------

    /// Main goal reminded every tick.
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Goal praised by [`punish`](Self::punish).
    pub fn negative_goal(&self) -> Option<&str> {
        self.negative_goal.as_deref()
    }

    /// Send a goal sentence.
    ///
    /// # Arguments
    /// * `name` - Goal name.
    /// * `negative` - Ask the backend to avoid the goal instead.
    pub fn put_goal(&self, name: &str, negative: bool) {
        self.put_sentence(|p| Some(p.render_goal(name, negative)));
    }

    /// Reward: the main goal was reached.
    pub fn praise(&self) {
        self.praise_goal(&self.goal);
    }

    /// Penalty, expressed as praising the negative goal.
    ///
    /// Negative truth values are spelled differently by each backend and one
    /// of them does not handle them reliably, so the penalty is phrased as a
    /// positive sentence about the negative goal instead.
    pub fn punish(&self) {
        match &self.negative_goal {
            Some(goal) => self.praise_goal(goal),
            None => log::debug!("[{}] punish: no negative goal set", self.id),
        }
    }

    /// Tell the backend that `name` was reached.
    pub fn praise_goal(&self, name: &str) {
        self.put_sentence(|p| Some(p.render_praise(name)));
    }

    /// Send the dialect's literal "goal not reached" sentence.
    pub fn punish_goal(&self, name: &str) {
        self.put_sentence(|p| Some(p.render_punish(name)));
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// With probability `1/probability` (always when 0 or 1), force a random
    /// candidate. Returns the chosen operation.
    ///
    /// # Arguments
    /// * `probability` - Inverse firing chance per call.
    /// * `candidates` - Operations to choose from uniformly.
    pub fn babble(&self, probability: u32, candidates: &[Operation]) -> Option<Operation> {
        if candidates.is_empty() {
            return None;
        }
        let mut rng = rand::rng();
        if probability > 1 && rng.random_range(1..=probability) != 1 {
            return None;
        }
        let operation = candidates.choose(&mut rng)?.clone();
        self.force_unconscious_operation(&operation);
        Some(operation)
    }

    /// Perform `operation` and tell the backend "I did this", unless the
    /// dialect cannot take that sentence.
    pub fn force_unconscious_operation(&self, operation: &Operation) {
        self.put_sentence(|p| p.render_babble(operation));
        self.shared.store_operation(operation);
    }

    /// Announce an operation the backend may use.
    pub fn register_basic_operation(&self, operation: &Operation) {
        self.put_sentence(|p| p.render_register(operation));
    }

    /// Entry point for operations decoded from backend output.
    pub fn handle_program_operation(&self, operation: Operation) {
        self.shared.handle_program_operation(operation);
    }

    /// Operations received from the backend so far.
    pub fn total_operates(&self) -> u64 {
        self.shared.operations_received.load(Ordering::SeqCst)
    }

    /// Whether operations from the backend are stored.
    pub fn control_enabled(&self) -> bool {
        self.shared.control_enabled.load(Ordering::SeqCst)
    }

    /// Enable or disable storing operations from the backend.
    pub fn set_control_enabled(&self, enabled: bool) {
        self.shared.control_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Activation flags, shared with the reader loop.
    pub fn operations(&self) -> &OperationState {
        &self.shared.operations
    }

    /// Level-triggered read.
    pub fn is_active(&self, operation: &Operation) -> bool {
        self.shared.operations.is_active(operation)
    }

    /// Set a flag directly, bypassing the policy.
    pub fn set_active(&self, operation: &Operation, active: bool) {
        self.shared.operations.set(operation, active);
    }

    /// Edge-triggered read: returns the flag and clears it.
    pub fn take(&self, operation: &Operation) -> bool {
        self.shared.operations.take(operation)
    }

    /// Whether `operation` has ever been stored.
    pub fn contains(&self, operation: &Operation) -> bool {
        self.shared.operations.contains(operation)
    }

    /// Operations currently active, sorted by name.
    pub fn active_operations(&self) -> Vec<Operation> {
        self.shared.operations.active()
    }

    /// Every operation name ever stored, sorted.
    pub fn stored_operation_names(&self) -> Vec<String> {
        self.shared.operations.names()
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("goal", &self.goal)
            .field("negative_goal", &self.negative_goal)
            .field("backend", &self.profile().map(|p| p.name().to_string()))
            .field("sense_enabled", &self.sense_enabled)
            .field("control_enabled", &self.control_enabled())
            .field("total_senses", &self.perceptions_sent)
            .field("total_operates", &self.total_operates())
            .finish()
    }
}

#[cfg(test)]
impl Agent {
    /// Equip with a queue but no process or loops, so tests can inspect
    /// exactly what would be sent.
    fn equip_detached(&mut self, profile: Arc<DialectProfile>) {
        self.brain = Some(Brain {
            profile,
            queue: CommandQueue::default(),
            process: None,
            writer: None,
            reader: None,
            reader_shutdown: None,
        });
    }

    fn drain_sent(&self) -> Vec<String> {
        let queue = self.command_queue().expect("equipped");
        std::iter::from_fn(|| queue.pop_front()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::policy::ExclusivePolicy;
    use crate::agent::sensor::RelativePositionSensor;
    use crate::dialect::DialectKind;
    use crate::types::perception::Entity;

    fn profile(kind: DialectKind) -> Arc<DialectProfile> {
        Arc::new(kind.profile(&BridgeConfig::default()))
    }

    fn detached(kind: DialectKind) -> Agent {
        let mut agent = Agent::new("good").with_negative_goal("bad");
        agent.equip_detached(profile(kind));
        agent
    }

    #[test]
    fn test_update_senses_goal_and_step() {
        let mut agent = detached(DialectKind::OpenNars).with_sensor(RelativePositionSensor::default());
        let ctx = PerceptionContext::new(
            Entity::new(200.0, 600.0, 80.0, 60.0),
            vec![Entity::new(0.0, 0.0, 50.0, 40.0)],
        );
        agent.update(&ctx);
        assert_eq!(
            agent.drain_sent(),
            vec![
                "<{enemy} --> [left]>. :|:".to_string(),
                "<{SELF} --> [good]>! :|:".to_string(),
                "5".to_string(),
            ]
        );
        assert_eq!(agent.total_senses(), 1);
    }

    #[test]
    fn test_update_without_step_for_self_paced_backend() {
        let mut agent = detached(DialectKind::Ona);
        agent.update(&PerceptionContext::default());
        assert_eq!(agent.drain_sent(), vec!["<{SELF} --> [good]>! :|:".to_string()]);
    }

    #[test]
    fn test_disabled_sense_is_a_no_op() {
        let mut agent = detached(DialectKind::Ona);
        agent.set_sense_enabled(false);
        agent.add_perception(&Perception::new("enemy", "ahead"));
        assert_eq!(agent.total_senses(), 0);
        assert!(agent.command_queue().unwrap().is_empty());
    }

    #[test]
    fn test_add_self_perception() {
        let mut agent = detached(DialectKind::Python);
        agent.add_self_perception("hurt");
        assert_eq!(agent.drain_sent(), vec!["({SELF} --> [hurt]). :|:".to_string()]);
        assert_eq!(agent.total_senses(), 1);
    }

    #[test]
    fn test_unequipped_agent_drops_sentences() {
        let mut agent = Agent::new("good");
        agent.add_perception(&Perception::new("enemy", "left"));
        agent.praise();
        assert_eq!(agent.total_senses(), 0);
        assert!(agent.command_queue().is_none());
    }

    #[test]
    fn test_praise_and_punish() {
        let agent = detached(DialectKind::Ona);
        agent.praise();
        agent.punish();
        agent.punish_goal("good");
        assert_eq!(
            agent.drain_sent(),
            vec![
                "<{SELF} --> [good]>. :|:".to_string(),
                "<{SELF} --> [bad]>. :|:".to_string(),
                "<{SELF} --> [good]>. :|: {0}".to_string(),
            ]
        );
    }

    #[test]
    fn test_punish_without_negative_goal_sends_nothing() {
        let mut agent = Agent::new("good");
        agent.equip_detached(profile(DialectKind::OpenNars));
        agent.punish();
        assert!(agent.command_queue().unwrap().is_empty());
    }

    #[test]
    fn test_babble_picks_exactly_one() {
        let left = Operation::new("left");
        let right = Operation::new("right");
        for _ in 0..50 {
            let agent = detached(DialectKind::OpenNars);
            agent.set_active(&right, false);
            let chosen = agent.babble(1, &[left.clone(), right.clone()]).unwrap();
            let active = agent.active_operations();
            assert_eq!(active, vec![chosen.clone()]);
            if chosen == left {
                assert!(agent.contains(&right));
                assert!(!agent.is_active(&right));
            } else {
                assert!(!agent.contains(&left));
            }
            assert_eq!(agent.command_queue().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_babble_probability_zero_always_fires() {
        let agent = detached(DialectKind::OpenNars);
        assert!(agent.babble(0, &[Operation::new("fire")]).is_some());
        assert!(agent.is_active(&Operation::new("fire")));
    }

    #[test]
    fn test_babble_without_candidates() {
        let agent = detached(DialectKind::OpenNars);
        assert!(agent.babble(1, &[]).is_none());
        assert!(agent.command_queue().unwrap().is_empty());
    }

    #[test]
    fn test_force_on_unsupported_babble_only_stores() {
        let agent = detached(DialectKind::Ona);
        let queue = agent.command_queue().unwrap().clone();
        let before = (queue.len(), queue.total_pushed());
        agent.force_unconscious_operation(&Operation::new("left"));
        assert!(agent.is_active(&Operation::new("left")));
        assert_eq!((queue.len(), queue.total_pushed()), before);
    }

    #[test]
    fn test_babble_on_unsupported_dialect_stores_silently() {
        let agent = detached(DialectKind::Ona);
        let chosen = agent.babble(1, &[Operation::new("right")]);
        assert_eq!(chosen, Some(Operation::new("right")));
        assert!(agent.is_active(&Operation::new("right")));
        assert_eq!(agent.command_queue().unwrap().total_pushed(), 0);
    }

    #[test]
    fn test_force_announces_when_supported() {
        let agent = detached(DialectKind::OpenNars);
        agent.force_unconscious_operation(&Operation::new("fire"));
        assert_eq!(agent.drain_sent(), vec!["<(*,{SELF}) --> ^fire>. :|:".to_string()]);
    }

    #[test]
    fn test_register_basic_operation() {
        let agent = detached(DialectKind::Ona);
        agent.register_basic_operation(&Operation::new("fire"));
        assert_eq!(agent.drain_sent(), vec!["(*,{SELF}, ^fire). :|:".to_string()]);
    }

    #[test]
    fn test_handle_program_operation_counts() {
        let agent = detached(DialectKind::Ona);
        agent.handle_program_operation(Operation::new("left"));
        agent.handle_program_operation(Operation::new("fire"));
        assert_eq!(agent.total_operates(), 2);
        assert!(agent.is_active(&Operation::new("left")));
        assert!(agent.take(&Operation::new("fire")));
        assert!(!agent.take(&Operation::new("fire")));
    }

    #[test]
    fn test_control_disabled_ignores_operations() {
        let agent = detached(DialectKind::Ona);
        agent.set_control_enabled(false);
        agent.handle_program_operation(Operation::new("left"));
        assert_eq!(agent.total_operates(), 0);
        assert!(!agent.contains(&Operation::new("left")));
    }

    #[test]
    fn test_policy_applies_to_program_operations() {
        let agent = detached(DialectKind::Ona)
            .with_policy(ExclusivePolicy::new().with_group(["left", "right", "deactivate"]));
        agent.handle_program_operation(Operation::new("left"));
        agent.handle_program_operation(Operation::new("right"));
        assert!(!agent.is_active(&Operation::new("left")));
        assert!(agent.is_active(&Operation::new("right")));
        agent.force_unconscious_operation(&Operation::new("deactivate"));
        assert_eq!(agent.active_operations(), vec![Operation::new("deactivate")]);
    }

    #[test]
    fn test_disconnect_twice_and_reequip() {
        let mut agent = detached(DialectKind::Ona);
        agent.disconnect();
        agent.disconnect();
        assert!(!agent.has_brain_equipped());
        agent.equip_detached(profile(DialectKind::OpenNars));
        assert_eq!(agent.profile().unwrap().name(), "opennars");
    }

    #[test]
    fn test_equip_requires_runtime() {
        let mut agent = Agent::new("good");
        let err = agent.equip(profile(DialectKind::Ona)).unwrap_err();
        assert!(matches!(err, BridgeError::NoRuntime));
        assert!(!agent.has_brain_equipped());
    }

    #[tokio::test]
    async fn test_launch_failure_produces_no_agent() {
        let mut config = BridgeConfig::default();
        config.shell.program = "/definitely/not/a/shell".to_string();
        let result = Agent::launch("good", config, profile(DialectKind::Ona));
        assert!(matches!(result, Err(BridgeError::Launch { .. })));
    }

    #[tokio::test]
    async fn test_equip_twice_is_rejected() {
        let mut agent = detached(DialectKind::Ona);
        let err = agent.equip(profile(DialectKind::Ona)).unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyEquipped));
    }

    // -- end to end against a real child process -------------------------

    #[cfg(unix)]
    fn echo_profile() -> Arc<DialectProfile> {
        // `cat` stands in for the backend: every line we send comes back.
        Arc::new(
            DialectKind::Ona
                .profile(&BridgeConfig::default())
                .with_startup_commands(vec!["exec cat".to_string()]),
        )
    }

    #[cfg(unix)]
    async fn wait_until(mut check: impl FnMut() -> bool) {
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while !check() {
            assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_round_trip_through_process() {
        let mut agent = Agent::launch("good", BridgeConfig::default(), echo_profile()).unwrap();
        assert_eq!(agent.process_state(), Some(ProcessState::Running));

        agent.add_perception(&Perception::new("enemy", "left"));
        let queue = agent.command_queue().unwrap().clone();
        queue.write_line("^left executed with args");
        queue.write_line("^fire executed with args");

        wait_until(|| agent.total_operates() >= 2).await;
        assert!(agent.is_active(&Operation::new("left")));
        assert!(agent.take(&Operation::new("fire")));
        // sense and goal sentences echoed back are not operations
        assert_eq!(agent.total_operates(), 2);

        agent.shutdown().await;
        assert!(!agent.has_brain_equipped());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_disconnect_and_reequip_real_process() {
        let mut agent = Agent::launch("good", BridgeConfig::default(), echo_profile()).unwrap();
        agent.disconnect();
        agent.disconnect();
        assert!(agent.process_state().is_none());

        agent.equip(echo_profile()).unwrap();
        agent
            .command_queue()
            .unwrap()
            .write_line("^right executed with args");
        wait_until(|| agent.is_active(&Operation::new("right"))).await;
        agent.shutdown().await;
    }
}
