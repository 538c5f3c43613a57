use log::LevelFilter;

/// Environment variable that turns on debug logging, like `--verbose`.
pub const DEBUG_ENV_VAR: &str = "RUNKEY_DEBUG";

/// Initialize logging for runkey.
///
/// # Behavior
/// - Uses `Debug` level if `debug_enabled` is true, otherwise `Info` level.
/// - `RUST_LOG`, when set, overrides both (e.g. `RUST_LOG=runkey=trace` for state traces).
/// - Safe to call more than once; later calls are ignored.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("logger initialized at {level:?} level");
    }
}

/// True if [`DEBUG_ENV_VAR`] is set to anything.
#[must_use]
pub fn debug_from_env() -> bool {
    std::env::var_os(DEBUG_ENV_VAR).is_some()
}
