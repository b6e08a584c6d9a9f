//! Sensing step: perception context in, perceptions out.

use crate::types::perception::{Perception, PerceptionContext};

/// Derives the perceptions to assert on a tick.
pub trait Sensor: Send {
    fn sense(&self, context: &PerceptionContext) -> Vec<Perception>;
}

impl<F> Sensor for F
where
    F: Fn(&PerceptionContext) -> Vec<Perception> + Send,
{
    fn sense(&self, context: &PerceptionContext) -> Vec<Perception> {
        self(context)
    }
}

/// Perceives nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSensor;

impl Sensor for NullSensor {
    fn sense(&self, _context: &PerceptionContext) -> Vec<Perception> {
        Vec::new()
    }
}

/// Reports where obstacles are relative to the self entity's horizontal
/// centre: `left`, `right` or `ahead`. Each direction is reported at most
/// once per tick, in that order.
#[derive(Debug, Clone)]
pub struct RelativePositionSensor {
    object: String,
}

impl Default for RelativePositionSensor {
    fn default() -> Self {
        Self::new("enemy")
    }
}

impl RelativePositionSensor {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
        }
    }
}

impl Sensor for RelativePositionSensor {
    fn sense(&self, context: &PerceptionContext) -> Vec<Perception> {
        let center = context.self_entity.center_x();
        let (mut left, mut right, mut ahead) = (false, false, false);
        for obstacle in &context.obstacles {
            if obstacle.right < center {
                left = true;
            } else if center < obstacle.left {
                right = true;
            } else {
                ahead = true;
            }
        }
        [(left, "left"), (right, "right"), (ahead, "ahead")]
            .into_iter()
            .filter(|(seen, _)| *seen)
            .map(|(_, state)| Perception::new(self.object.as_str(), state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::perception::Entity;

    fn hero() -> Entity {
        // centre_x = 240
        Entity::new(200.0, 600.0, 80.0, 60.0)
    }

    #[test]
    fn test_empty_field() {
        let ctx = PerceptionContext::new(hero(), vec![]);
        assert!(RelativePositionSensor::default().sense(&ctx).is_empty());
    }

    #[test]
    fn test_classification() {
        let ctx = PerceptionContext::new(
            hero(),
            vec![
                Entity::new(10.0, 0.0, 50.0, 40.0),
                Entity::new(400.0, 0.0, 50.0, 40.0),
                Entity::new(220.0, 0.0, 50.0, 40.0),
            ],
        );
        let got = RelativePositionSensor::default().sense(&ctx);
        assert_eq!(
            got,
            vec![
                Perception::new("enemy", "left"),
                Perception::new("enemy", "right"),
                Perception::new("enemy", "ahead"),
            ]
        );
    }

    #[test]
    fn test_each_direction_once() {
        let ctx = PerceptionContext::new(
            hero(),
            vec![Entity::new(0.0, 0.0, 10.0, 10.0), Entity::new(20.0, 0.0, 10.0, 10.0)],
        );
        let got = RelativePositionSensor::new("asteroid").sense(&ctx);
        assert_eq!(got, vec![Perception::new("asteroid", "left")]);
    }

    #[test]
    fn test_touching_centre_counts_as_ahead() {
        let ctx = PerceptionContext::new(hero(), vec![Entity::new(240.0, 0.0, 30.0, 30.0)]);
        let got = RelativePositionSensor::default().sense(&ctx);
        assert_eq!(got, vec![Perception::new("enemy", "ahead")]);
    }

    #[test]
    fn test_closure_sensor() {
        let sensor = |ctx: &PerceptionContext| {
            if ctx.self_entity.velocity_x < 0.0 {
                vec![Perception::of_self("moving_left")]
            } else {
                vec![]
            }
        };
        let ctx = PerceptionContext::new(hero().with_velocity(-4.0, 0.0), vec![]);
        assert_eq!(sensor.sense(&ctx), vec![Perception::of_self("moving_left")]);
        assert!(NullSensor.sense(&ctx).is_empty());
    }
}
