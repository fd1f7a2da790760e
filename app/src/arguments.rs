use argh::FromArgs;
use log::LevelFilter;

/// Archetype storage demo
#[derive(FromArgs, Debug)]
pub(crate) struct Arguments {
    /// path to config file
    #[argh(option)]
    config: Option<String>,

    /// log level filter
    #[argh(option, default = "LevelFilter::Info")]
    log_level: LevelFilter,

    /// number of ticks to simulate, overrides config
    #[argh(option)]
    ticks: Option<usize>,
}

impl Arguments {
    pub(crate) fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub(crate) fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub(crate) fn ticks(&self) -> Option<usize> {
        self.ticks
    }
}
