use anyhow::Result;

/// Sets up `log` output, `-v` once per step from warnings down to tracing.
pub fn init(verbosity: u8) -> Result<()> {
    simple_logger::init_with_level(level(verbosity))?;
    Ok(())
}

fn level(verbosity: u8) -> log::Level {
    match verbosity {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}
