//! Headless launcher: one agent dodging a synthetic obstacle field.
//!
//! Obstacles fall from the top of a 720-wide field; the agent senses where
//! they are relative to itself and moves with `^left` / `^right`. Dodging an
//! obstacle is praised, being hit is punished.
//!
//! # Environment Variables
//!
//! - `NARS_BRIDGE_CONFIG` — YAML or JSON config file (optional)
//! - `NARS_BRIDGE_DIALECT` — opennars (default), ONA, ONA_old or python
//! - `NARS_BRIDGE_TICKS` — ticks to run before exiting (default: 500)
//! - `NARS_BRIDGE_*` — config overrides, see `BridgeConfig::apply_env`
//! - `RUST_LOG` — tracing filter (default: "info,nars_bridge=debug")

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::Rng;

use nars_bridge::{
    Agent, BridgeConfig, DialectKind, Entity, ExclusivePolicy, Operation, PerceptionContext,
};
use nars_bridge::agent::RelativePositionSensor;

const FIELD_WIDTH: f32 = 720.0;
const FIELD_HEIGHT: f32 = 720.0;
const TICK: Duration = Duration::from_millis(200);
const AGENT_SPEED: f32 = 24.0;
const OBSTACLE_SPEED: f32 = 30.0;
const BABBLE_PROBABILITY: u32 = 5;

fn load_config() -> anyhow::Result<BridgeConfig> {
    match std::env::var("NARS_BRIDGE_CONFIG") {
        Ok(path) => {
            let mut config = BridgeConfig::from_file(&path)
                .with_context(|| format!("reading config file {}", path))?;
            config.apply_env(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        Err(_) => Ok(BridgeConfig::from_env()?),
    }
}

struct Field {
    agent: Entity,
    obstacles: Vec<Entity>,
}

enum Outcome {
    Hit,
    Dodged,
}

impl Field {
    fn new() -> Self {
        Self {
            agent: Entity::new(FIELD_WIDTH / 2.0 - 40.0, FIELD_HEIGHT - 80.0, 80.0, 60.0),
            obstacles: Vec::new(),
        }
    }

    fn context(&self) -> PerceptionContext {
        PerceptionContext::new(self.agent, self.obstacles.clone())
    }

    fn move_agent(&mut self, dx: f32) {
        let width = self.agent.right - self.agent.left;
        let left = (self.agent.left + dx).clamp(0.0, FIELD_WIDTH - width);
        self.agent.left = left;
        self.agent.right = left + width;
        self.agent.velocity_x = dx;
    }

    fn advance(&mut self, rng: &mut impl Rng) -> Vec<Outcome> {
        if self.obstacles.is_empty() || rng.random_range(0..4) == 0 {
            let left = rng.random_range(0.0..FIELD_WIDTH - 50.0);
            self.obstacles
                .push(Entity::new(left, 0.0, 50.0, 40.0).with_velocity(0.0, OBSTACLE_SPEED));
        }

        let agent = self.agent;
        let mut outcomes = Vec::new();
        self.obstacles.retain_mut(|o| {
            o.top += o.velocity_y;
            o.bottom += o.velocity_y;
            let overlaps = o.left < agent.right
                && agent.left < o.right
                && o.top < agent.bottom
                && agent.top < o.bottom;
            if overlaps {
                outcomes.push(Outcome::Hit);
                false
            } else if o.top > FIELD_HEIGHT {
                outcomes.push(Outcome::Dodged);
                false
            } else {
                true
            }
        });
        outcomes
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nars_bridge=debug".into()),
        )
        .init();

    let config = load_config()?;
    let dialect: DialectKind = match std::env::var("NARS_BRIDGE_DIALECT") {
        Ok(name) => name.parse()?,
        Err(_) => DialectKind::default(),
    };
    let ticks: u64 = match std::env::var("NARS_BRIDGE_TICKS") {
        Ok(v) => v.parse().context("NARS_BRIDGE_TICKS must be a number")?,
        Err(_) => 500,
    };

    let profile = Arc::new(dialect.profile(&config));
    tracing::info!(
        "Starting {} backend via '{}' for {} ticks",
        dialect,
        profile.startup_commands().join("; "),
        ticks
    );

    let mut agent = Agent::launch("good", config, profile)
        .context("failed to start the reasoning process")?
        .with_negative_goal("bad")
        .with_sensor(RelativePositionSensor::default())
        .with_policy(ExclusivePolicy::new().with_group(["left", "right", "deactivate"]));

    let left = Operation::new("left");
    let right = Operation::new("right");
    let deactivate = Operation::new("deactivate");
    let motor = [left.clone(), right.clone(), deactivate.clone()];
    for op in &motor {
        agent.register_basic_operation(op);
    }

    let mut field = Field::new();
    let mut rng = rand::rng();
    let (mut hits, mut dodges) = (0u64, 0u64);
    let mut interval = tokio::time::interval(TICK);

    for tick in 0..ticks {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted at tick {}", tick);
                break;
            }
        }

        agent.update(&field.context());
        agent.babble(BABBLE_PROBABILITY, &motor);

        let dx = if agent.is_active(&left) {
            -AGENT_SPEED
        } else if agent.is_active(&right) {
            AGENT_SPEED
        } else {
            0.0
        };
        field.move_agent(dx);

        for outcome in field.advance(&mut rng) {
            match outcome {
                Outcome::Hit => {
                    hits += 1;
                    agent.punish();
                }
                Outcome::Dodged => {
                    dodges += 1;
                    agent.praise();
                }
            }
        }

        if tick % 25 == 0 {
            tracing::info!(
                "tick {}: senses={} operates={} hits={} dodges={}",
                tick,
                agent.total_senses(),
                agent.total_operates(),
                hits,
                dodges
            );
        }
    }

    agent.shutdown().await;
    tracing::info!(
        "Finished: senses={} operates={} hits={} dodges={}",
        agent.total_senses(),
        agent.total_operates(),
        hits,
        dodges
    );
    Ok(())
}
