use std::{fs, path::Path};

use anyhow::Context;
use rg_archetypes::StorageConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct SimulationConfig {
    pub ticks: usize,
    pub entities: usize,
    pub delta_time: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            ticks: 60,
            entities: 1000,
            delta_time: 1.0 / 60.0,
        }
    }
}

impl Config {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Unable to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Bad config {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn parse() {
        let config = Config::parse(
            r#"
            [storage]
            entity_capacity = 16

            [simulation]
            ticks = 5
            "#,
        )
        .unwrap();
        assert_eq!(16, config.storage.entity_capacity);
        assert_eq!(64, config.storage.archetype_capacity);
        assert_eq!(5, config.simulation.ticks);
        assert_eq!(1000, config.simulation.entities);
    }

    #[test]
    fn empty() {
        let config = Config::parse("").unwrap();
        assert_eq!(60, config.simulation.ticks);
    }
}
