mod command;
mod shell;

use anyhow::Context;
use chardev_config::ChardevConfig;
use chardev_device::{CharDevice, SharedBuffer};
use shell::Shell;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ChardevConfig::load(path.clone())
            .with_context(|| format!("loading config from {path}"))?,
        None => ChardevConfig::default(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let device = CharDevice::new(
        config.device_name.as_str(),
        SharedBuffer::with_content(config.greeting.as_bytes()),
    );
    info!(
        device = %config.device_name,
        class = %config.class_name,
        "device ready"
    );

    let mut shell = Shell::new(device);
    let result = shell.run(io::stdin().lock(), &mut io::stdout().lock());
    shell.shutdown();
    result.context("running command loop")
}
