use rg_archetypes::{EntityId, Signature, System, archetype::Archetype, signature};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

/// Remaining time to live, in seconds
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct Lifetime(pub f32);

/// Per-tick context
pub(crate) struct Tick {
    pub delta_time: f32,
}

pub(crate) struct Movement;

impl System<Tick> for Movement {
    fn signature(&self) -> Signature {
        signature![Position, Velocity]
    }

    fn run(&mut self, archetype: &mut Archetype, tick: &Tick) {
        if let Ok(Some((_, (positions, velocities)))) =
            archetype.fetch::<(&mut Position, &Velocity)>()
        {
            for (p, v) in positions.iter_mut().zip(velocities) {
                p.x += v.dx * tick.delta_time;
                p.y += v.dy * tick.delta_time;
            }
        }
    }
}

/// Counts down lifetimes and collects entities which expired
#[derive(Default)]
pub(crate) struct Aging {
    pub expired: Vec<EntityId>,
}

impl System<Tick> for Aging {
    fn signature(&self) -> Signature {
        signature![Lifetime]
    }

    fn run(&mut self, archetype: &mut Archetype, tick: &Tick) {
        if let Ok(Some((entities, (lifetimes,)))) = archetype.fetch::<(&mut Lifetime,)>() {
            for (lifetime, entity) in lifetimes.iter_mut().zip(entities) {
                lifetime.0 -= tick.delta_time;
                if lifetime.0 <= 0.0 {
                    self.expired.push(*entity);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rg_archetypes::Entities;

    use super::{Aging, Lifetime, Movement, Position, Tick, Velocity};

    #[test]
    fn movement_and_aging() {
        let mut entities = Entities::new();
        entities.register::<Position>();
        entities.register::<Velocity>();
        entities.register::<Lifetime>();
        let e1 = entities.create();
        entities.attach_default::<Position>(e1).unwrap();
        entities.attach(e1, Velocity { dx: 1.0, dy: 2.0 }).unwrap();
        entities.attach(e1, Lifetime(0.75)).unwrap();

        let tick = Tick { delta_time: 0.5 };
        assert_eq!(1, entities.dispatch(&mut Movement, &tick));
        assert_eq!(Some(&Position { x: 0.5, y: 1.0 }), entities.get::<Position>(e1));

        let mut aging = Aging::default();
        entities.dispatch(&mut aging, &tick);
        assert!(aging.expired.is_empty());
        entities.dispatch(&mut aging, &tick);
        assert_eq!(vec![e1], aging.expired);
    }
}
