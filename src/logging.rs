use env_logger::Env;

/// Log target shared by the client behavior machine and its runtime.
pub const TARGET: &str = "sd::client";

/// Installs `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
/// Calling it again after a logger is installed does nothing.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(true)
        .try_init();
}
