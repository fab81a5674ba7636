//! Config and contract artifact errors.

use std::path::PathBuf;

/// Errors raised while loading the config or the contract artifact it points to.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One or more settings could not be extracted from the merged sources.
    #[error("invalid atm config:{}", list_failures(.0))]
    Extract(figment::Error),
    /// `balance_decimals` is out of the range `format_units` accepts.
    #[error("`balance_decimals` must be at most {max}, got {decimals}")]
    BalanceDecimals { decimals: u8, max: u8 },
    #[error("failed to read contract artifact at {}: {source}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid contract artifact at {}: {source}", path.display())]
    ArtifactJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One line per distinct failure: the setting, what went wrong and which source supplied it.
fn list_failures(error: &figment::Error) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(error.count());
    for err in error.clone() {
        let mut line = String::from("\n- ");
        if !err.path.is_empty() {
            line.push_str(&format!("`{}`: ", err.path.join(".")));
        }
        line.push_str(&err.kind.to_string());
        if let Some(meta) = &err.metadata {
            line.push_str(&format!(" (from {})", meta.name));
        }
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines.concat()
}
