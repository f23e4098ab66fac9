use crate::error::Kind;
use crate::Error;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CREDENTIAL_VAR: &str = "RENDER_API_KEY";

// runbook config, every field has a default so the config file is optional and may be partial.
// The credential is never read from the file, it is handed in by the caller
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    main: Main,
    #[serde(skip)]
    credential: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct Main {
    credential_var: String,
    api_url: Url,
    service_type: String,
    // seconds, no timeout when absent
    discovery_timeout: Option<u64>,
    probe_url: Url,
    // seconds
    probe_timeout: u64,
    dashboard_url: Url,
    migration_script: String,
}

impl Default for Main {
    fn default() -> Main {
        Main {
            credential_var: DEFAULT_CREDENTIAL_VAR.into(),
            //safe to call unwrap on the constant urls below
            api_url: Url::parse("https://api.render.com/v1").unwrap(),
            service_type: "postgresql".into(),
            discovery_timeout: None,
            probe_url: Url::parse("https://mcp.render.com/mcp").unwrap(),
            probe_timeout: 10,
            dashboard_url: Url::parse("https://dashboard.render.com").unwrap(),
            migration_script: "execute-migration-now.js".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

impl Config {
    /// create a new config instance with the default endpoints and no credential
    pub fn new() -> Config {
        Config {
            main: Main::default(),
            credential: None,
        }
    }

    /// create a new Config instance from a config file located on the file system
    pub fn from_file_location<T: AsRef<Path>>(location: T) -> Result<Config, Error> {
        let file = std::fs::read_to_string(&location).map_err(|err| {
            Error::new(Kind::ConfigError(format!(
                "could not open config file, {}",
                err
            )))
        })?;

        let config: Config = toml::from_str(&file).map_err(|err| {
            Error::new(Kind::ConfigError(format!(
                "could not parse config file, {}",
                err
            )))
        })?;

        if config.main.credential_var.trim().is_empty() {
            return Err(Error::new(Kind::ConfigError(
                "field credential_var must not be empty".into(),
            )));
        }

        if config.main.probe_timeout == 0 {
            return Err(Error::new(Kind::ConfigError(
                "field probe_timeout must be at least one second".into(),
            )));
        }

        Ok(config)
    }

    /// The API credential, `None` when absent or empty
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn credential_var(&self) -> &str {
        &self.main.credential_var
    }

    pub fn api_url(&self) -> &Url {
        &self.main.api_url
    }

    /// The management API endpoint listing every service of the account
    pub fn services_url(&self) -> String {
        format!("{}/services", self.api_url().as_str().trim_end_matches('/'))
    }

    pub fn service_type(&self) -> &str {
        &self.main.service_type
    }

    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.main.discovery_timeout.map(Duration::from_secs)
    }

    pub fn probe_url(&self) -> &Url {
        &self.main.probe_url
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.main.probe_timeout)
    }

    pub fn dashboard_url(&self) -> &str {
        self.main.dashboard_url.as_str().trim_end_matches('/')
    }

    pub fn migration_script(&self) -> &str {
        &self.main.migration_script
    }

    pub fn set_credential(self, credential: Option<&str>) -> Config {
        // only an empty value counts as absent, anything else is sent as is
        let credential = credential.filter(|c| !c.is_empty()).map(String::from);
        Config { credential, ..self }
    }

    pub fn set_credential_var(self, credential_var: &str) -> Config {
        Config {
            main: Main {
                credential_var: credential_var.into(),
                ..self.main
            },
            ..self
        }
    }

    pub fn set_api_url(self, api_url: Url) -> Config {
        Config {
            main: Main {
                api_url,
                ..self.main
            },
            ..self
        }
    }

    pub fn set_discovery_timeout(self, discovery_timeout: Option<Duration>) -> Config {
        Config {
            main: Main {
                discovery_timeout: discovery_timeout.map(|t| t.as_secs()),
                ..self.main
            },
            ..self
        }
    }

    pub fn set_probe_url(self, probe_url: Url) -> Config {
        Config {
            main: Main {
                probe_url,
                ..self.main
            },
            ..self
        }
    }

    pub fn set_probe_timeout(self, probe_timeout: Duration) -> Config {
        Config {
            main: Main {
                probe_timeout: probe_timeout.as_secs().max(1),
                ..self.main
            },
            ..self
        }
    }
}
