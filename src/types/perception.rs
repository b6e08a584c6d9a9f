//! Perceptions and the per-tick perception context.

use serde::{Deserialize, Serialize};

/// Reserved object name for the agent itself.
pub const SELF_OBJECT: &str = "SELF";

/// "`object` has property `state`" at the current instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perception {
    pub object: String,
    pub state: String,
}

impl Perception {
    pub fn new(object: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            state: state.into(),
        }
    }

    /// A perception about the agent itself.
    pub fn of_self(state: impl Into<String>) -> Self {
        Self::new(SELF_OBJECT, state)
    }
}

/// Axis-aligned bounds and velocity of a simulated entity.
///
/// Screen coordinates: `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

impl Entity {
    /// Entity with the given bounds and no velocity.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            right: left + width,
            top,
            bottom: top + height,
            velocity_x: 0.0,
            velocity_y: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity_x: f32, velocity_y: f32) -> Self {
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
        self
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// What the simulation hands the agent every tick. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptionContext {
    /// The entity controlled by the agent.
    pub self_entity: Entity,
    /// Everything the agent should react to.
    pub obstacles: Vec<Entity>,
}

impl PerceptionContext {
    pub fn new(self_entity: Entity, obstacles: Vec<Entity>) -> Self {
        Self {
            self_entity,
            obstacles,
        }
    }
}
