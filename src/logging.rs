use log::LevelFilter;

pub const LOG_ENV: &str = "SIERPINSKI_LOG";

/// Parses a level name such as `debug`; unknown names fall back to `Info`.
pub fn level_from_env(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn init() -> Result<(), log::SetLoggerError> {
    let level = level_from_env(std::env::var(LOG_ENV).ok().as_deref());

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:<5} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("wgpu_core", LevelFilter::Warn)
        .level_for("wgpu_hal", LevelFilter::Warn)
        .level_for("naga", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_parsing() {
        assert_eq!(level_from_env(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from_env(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("loud")), LevelFilter::Info);
        assert_eq!(level_from_env(None), LevelFilter::Info);
    }
}
