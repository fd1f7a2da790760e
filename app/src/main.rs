use std::{path::Path, time::Instant};

use log::{debug, info, warn};
use rg_archetypes::{Entities, signature};

use crate::{
    arguments::Arguments,
    config::Config,
    systems::{Aging, Lifetime, Movement, Position, Tick, Velocity},
};

mod app_logger;
mod arguments;
mod config;
mod systems;

fn main() -> anyhow::Result<()> {
    let args: Arguments = argh::from_env();
    app_logger::init(args.log_level())?;
    info!("Begin initialization...");

    let mut config = match args.config() {
        Some(path) => Config::load(Path::new(path))?,
        None => {
            warn!("No config file passed, using defaults");
            Config::default()
        }
    };
    if let Some(ticks) = args.ticks() {
        config.simulation.ticks = ticks;
    }
    debug!("Loaded config: {config:?}");

    let mut entities = Entities::with_config(config.storage);
    entities.register::<Position>();
    entities.register::<Velocity>();
    entities.register::<Lifetime>();

    for i in 0..config.simulation.entities {
        let entity = entities.create();
        entities.attach(
            entity,
            Position {
                x: i as f32,
                y: 0.0,
            },
        )?;
        if i % 2 == 0 {
            entities.attach(entity, Velocity { dx: 1.0, dy: 0.5 })?;
        }
        if i % 3 == 0 {
            entities.attach(entity, Lifetime(0.1 * (i % 10) as f32))?;
        }
    }
    info!(
        "Spawned {} entities in {} archetypes",
        entities.len(),
        entities.archetypes().len()
    );

    let tick = Tick {
        delta_time: config.simulation.delta_time,
    };
    let started_at = Instant::now();
    info!("Entering main loop...");
    for n in 0..config.simulation.ticks {
        entities.dispatch(&mut Movement, &tick);

        let mut aging = Aging::default();
        entities.dispatch(&mut aging, &tick);
        for (k, entity) in aging.expired.into_iter().enumerate() {
            // Half of expired entities just stop moving
            if k % 2 == 0 {
                entities.destroy(entity);
            } else {
                entities.detach::<Lifetime>(entity);
                entities.detach::<Velocity>(entity);
            }
        }
        if n % 10 == 0 {
            let moving = signature![Position, Velocity];
            let rows: usize = entities.query(&moving).map(|a| a.len()).sum();
            debug!("Tick {n}: {} entities, {rows} moving", entities.len());
        }
    }
    info!(
        "Leaving main loop after {:?}: {} entities left",
        started_at.elapsed(),
        entities.len()
    );
    for archetype in entities.archetypes().iter() {
        info!("{archetype}");
    }
    Ok(())
}
