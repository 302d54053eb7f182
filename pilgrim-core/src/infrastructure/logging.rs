use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Инициализирует `tracing`. `RUST_LOG` имеет приоритет над `default_level`
/// и `verbose`. Логи пишутся в stderr, чтобы не смешиваться с выводом команд.
pub fn init_logging(default_level: &str, verbose: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(default_level, verbose))
            .map_err(|e| anyhow!("invalid log level '{default_level}': {e}"))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

/// sqlx логирует каждый запрос на `info`, поэтому он приглушён до `warn`.
fn default_directives(default_level: &str, verbose: bool) -> String {
    let level = default_level.trim();
    let level = if level.is_empty() { "info" } else { level };
    let mut directives = format!("{level},sqlx=warn");
    if verbose {
        directives.push_str(",pilgrim_core=debug,pilgrim_cli=debug");
    }
    directives
}
