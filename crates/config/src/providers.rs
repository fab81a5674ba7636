use figment::{
    Error, Metadata, Profile, Provider,
    providers::{Env, Format, Toml},
    value::{Dict, Map, Value},
};
use std::path::{Path, PathBuf};

/// Reads `atm.toml`, mapping every `[profile.<name>]` table to the figment profile `<name>`.
///
/// The file location can be overridden with the given env var, in which case a missing file is an
/// error rather than an empty provider.
pub(crate) struct TomlFileProvider {
    pub env_var: Option<&'static str>,
    pub default: PathBuf,
}

impl TomlFileProvider {
    pub(crate) fn new(env_var: Option<&'static str>, default: impl Into<PathBuf>) -> Self {
        Self { env_var, default: default.into() }
    }

    fn env_val(&self) -> Option<String> {
        self.env_var.and_then(Env::var)
    }

    fn file(&self) -> PathBuf {
        self.env_val().map(PathBuf::from).unwrap_or_else(|| self.default.clone())
    }

    fn read(&self) -> Result<Map<Profile, Dict>, Error> {
        if let Some(file) = self.env_val() {
            if !Path::new(&file).exists() {
                return Err(Error::from(format!(
                    "Config file `{file}` set in env var `{}` does not exist",
                    self.env_var.unwrap_or_default()
                )));
            }
        }
        unwrap_profiles(Toml::file(self.file()).nested().data()?)
    }
}

impl Provider for TomlFileProvider {
    fn metadata(&self) -> Metadata {
        Toml::file(self.file()).nested().metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        self.read()
    }
}

fn unwrap_profiles(data: Map<Profile, Dict>) -> Result<Map<Profile, Dict>, Error> {
    let mut profiles = Map::new();
    for (section, dict) in data {
        if section.as_str() != "profile" {
            warn!(%section, "ignoring unknown section in config file");
            continue;
        }
        for (name, value) in dict {
            let Value::Dict(_, values) = value else {
                return Err(Error::from(format!("`profile.{name}` must be a table")));
            };
            profiles.insert(Profile::new(&name), values);
        }
    }
    Ok(profiles)
}
