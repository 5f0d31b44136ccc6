use log::LevelFilter;

/// Initialize logging for the CLI.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` applies. Calling this twice is harmless.
pub fn init_logging(default_filter: LevelFilter) {
  let mut builder = env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or(default_filter.as_str()),
  );
  builder.format_timestamp(None);

  if builder.try_init().is_err() {
    // Logger already initialized; nothing to do.
  }
}

/// Picks the default level from the `--verbose`/`--quiet` flags.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
  match (verbose, quiet) {
    (true, _) => LevelFilter::Debug,
    (false, true) => LevelFilter::Error,
    (false, false) => LevelFilter::Info,
  }
}
