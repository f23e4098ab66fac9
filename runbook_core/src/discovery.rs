use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::fmt;

use crate::config::Config;
use crate::error::{Kind, WrapNetworkError};
use crate::Error;

/// One entry of the management API service list.
/// Every field is optional, records missing a field are kept and a missing type never matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRecord {
    name: Option<String>,
    id: Option<String>,
    service_type: Option<String>,
}

impl ServiceRecord {
    pub fn new(name: &str, id: &str, service_type: &str) -> ServiceRecord {
        ServiceRecord {
            name: Some(name.into()),
            id: Some(id.into()),
            service_type: Some(service_type.into()),
        }
    }

    /// Pull the fields out of one JSON object of the service list.
    /// A non string `name` or `id` keeps its JSON text, a non string `type` is dropped
    pub fn from_object(object: &Map<String, Value>) -> ServiceRecord {
        ServiceRecord {
            name: object.get("name").and_then(display_value),
            id: object.get("id").and_then(display_value),
            service_type: object
                .get("type")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn service_type(&self) -> Option<&str> {
        self.service_type.as_deref()
    }
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "{} ({})",
            self.name().unwrap_or("unknown"),
            self.id().unwrap_or("unknown")
        )
    }
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Keep the records whose type is exactly `service_type`
pub fn filter_by_type(services: &[ServiceRecord], service_type: &str) -> Vec<ServiceRecord> {
    services
        .iter()
        .filter(|s| s.service_type() == Some(service_type))
        .cloned()
        .collect()
}

/// Blocking client for the provider management API
pub struct DiscoveryClient {
    client: Client,
    services_url: String,
}

impl DiscoveryClient {
    pub fn new(config: &Config) -> Result<DiscoveryClient, Error> {
        // reqwest's blocking client defaults to 30s, an absent timeout must stay unbounded
        let client = Client::builder()
            .timeout(config.discovery_timeout())
            .build()
            .network_err("could not build http client")?;

        Ok(DiscoveryClient {
            client,
            services_url: config.services_url(),
        })
    }

    /// Issue a single authenticated GET on the services endpoint
    pub fn list_services(&self, credential: &str) -> Result<Vec<ServiceRecord>, Error> {
        debug!("listing services at {}", self.services_url);

        let response = self
            .client
            .get(&self.services_url)
            .header(AUTHORIZATION, format!("Bearer {}", credential))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .network_err(&format!("GET {} failed", self.services_url))?;

        let status = response.status();
        let body = response
            .text()
            .network_err("could not read service list response")?;

        if status != StatusCode::OK {
            debug!("service list answered {}", status);
            return Err(Error::new(Kind::HttpStatus {
                status: status.as_u16(),
                body,
            }));
        }

        let objects: Vec<Map<String, Value>> = serde_json::from_str(&body)
            .map_err(|err| Error::new(Kind::Decode("invalid service list".into(), err)))?;

        Ok(objects.iter().map(ServiceRecord::from_object).collect())
    }
}

/// What the discovery step ended up with
#[derive(Debug)]
pub enum Discovery {
    /// No credential was supplied, nothing was attempted
    MissingCredential,
    /// The service list was fetched, `matches` holds the services of the configured type
    Listed {
        total: usize,
        matches: Vec<ServiceRecord>,
    },
    Failed(Error),
}

/// List the account services and keep the ones matching the configured type.
/// Never fails, any error is carried by `Discovery::Failed`
pub fn discover(config: &Config) -> Discovery {
    let credential = match config.credential() {
        Some(credential) => credential,
        None => return Discovery::MissingCredential,
    };

    let services =
        DiscoveryClient::new(config).and_then(|client| client.list_services(credential));

    match services {
        Ok(services) => {
            let matches = filter_by_type(&services, config.service_type());
            debug!(
                "{} of {} services are of type {}",
                matches.len(),
                services.len(),
                config.service_type()
            );
            Discovery::Listed {
                total: services.len(),
                matches,
            }
        }
        Err(err) => {
            debug!("service discovery failed: {:?}", err);
            Discovery::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{discover, filter_by_type, Discovery, DiscoveryClient, ServiceRecord};
    use crate::error::Kind;
    use crate::Config;
    use std::io::Write;
    use std::thread;
    use std::time::{Duration, Instant};
    use url::Url;

    const SERVICES: &str = r#"[
        {"name": "colibrrri-db", "id": "dpg-001", "type": "postgresql"},
        {"name": "colibrrri-web", "id": "srv-002", "type": "web_service"},
        {"name": "vheer-db", "id": "dpg-003", "type": "postgresql"},
        {"name": "cron", "id": "crn-004", "type": "cron_job"},
        {"id": "srv-005"}
    ]"#;

    fn config_for(server: &mockito::ServerGuard) -> Config {
        Config::new().set_api_url(Url::parse(&server.url()).unwrap())
    }

    #[test]
    fn filters_services_by_exact_type() {
        let services = vec![
            ServiceRecord::new("a", "1", "postgresql"),
            ServiceRecord::new("b", "2", "PostgreSQL"),
            ServiceRecord::new("c", "3", "postgresql-replica"),
            ServiceRecord::new("d", "4", "postgresql"),
        ];
        let matches = filter_by_type(&services, "postgresql");
        assert_eq!(2, matches.len());
        assert_eq!(Some("a"), matches[0].name());
        assert_eq!(Some("d"), matches[1].name());
    }

    fn record(json: &str) -> ServiceRecord {
        ServiceRecord::from_object(&serde_json::from_str(json).unwrap())
    }

    #[test]
    fn renders_missing_fields_as_unknown() {
        let record = record(r#"{"type": "postgresql", "name": null}"#);
        assert_eq!("unknown (unknown)", record.to_string());
        assert_eq!(
            "colibrrri-db (dpg-001)",
            ServiceRecord::new("colibrrri-db", "dpg-001", "postgresql").to_string()
        );
    }

    #[test]
    fn keeps_json_text_of_non_string_fields() {
        let record = record(r#"{"name": {"en": "db"}, "id": 7, "type": "postgresql"}"#);
        assert_eq!(r#"{"en":"db"} (7)"#, record.to_string());
        assert_eq!(Some("postgresql"), record.service_type());
    }

    #[test]
    fn non_string_type_never_matches() {
        let services = vec![
            record(r#"{"name": "a", "id": "1", "type": 5}"#),
            record(r#"{"name": "b", "id": "2", "type": ["postgresql"]}"#),
            record(r#"{"name": "c", "id": "3", "type": "postgresql"}"#),
        ];
        assert_eq!(None, services[0].service_type());
        let matches = filter_by_type(&services, "postgresql");
        assert_eq!(1, matches.len());
        assert_eq!(Some("c"), matches[0].name());
    }

    #[test]
    fn mixed_field_types_do_not_reject_the_list() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(
                r#"[{"name":"colibrrri-db","id":"dpg-1","type":"postgresql"},
                    {"name":"x","id":7,"type":"web_service"}]"#,
            )
            .create();

        let config = config_for(&server).set_credential(Some("rnd_test"));
        match discover(&config) {
            Discovery::Listed { total, matches } => {
                assert_eq!(2, total);
                assert_eq!(vec![ServiceRecord::new("colibrrri-db", "dpg-1", "postgresql")], matches);
            }
            other => panic!("unexpected discovery outcome {:?}", other),
        }
    }

    #[test]
    fn discovery_timeout_bounds_the_request() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/services")
            .with_status(200)
            .with_chunked_body(|w| {
                thread::sleep(Duration::from_secs(3));
                w.write_all(b"[]")
            })
            .create();

        let config = config_for(&server)
            .set_credential(Some("rnd_test"))
            .set_discovery_timeout(Some(Duration::from_secs(1)));
        let started = Instant::now();
        match discover(&config) {
            Discovery::Failed(err) => assert!(err.is_network(), "unexpected error {:?}", err),
            other => panic!("unexpected discovery outcome {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn lists_services_with_bearer_credential() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/services")
            .match_header("authorization", "Bearer rnd_test")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SERVICES)
            .create();

        let client = DiscoveryClient::new(&config_for(&server)).unwrap();
        let services = client.list_services("rnd_test").unwrap();

        mock.assert();
        assert_eq!(5, services.len());
        assert_eq!(None, services[4].service_type());
    }

    #[test]
    fn discover_reports_only_matching_services() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(SERVICES)
            .create();

        let config = config_for(&server).set_credential(Some("rnd_test"));
        match discover(&config) {
            Discovery::Listed { total, matches } => {
                assert_eq!(5, total);
                assert_eq!(
                    vec![
                        ServiceRecord::new("colibrrri-db", "dpg-001", "postgresql"),
                        ServiceRecord::new("vheer-db", "dpg-003", "postgresql"),
                    ],
                    matches
                );
            }
            other => panic!("unexpected discovery outcome {:?}", other),
        }
        mock.assert();
    }

    #[test]
    fn discover_without_credential_never_calls_the_api() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/services").expect(0).create();

        let config = config_for(&server).set_credential(None);
        assert!(matches!(discover(&config), Discovery::MissingCredential));
        mock.assert();
    }

    #[test]
    fn non_200_keeps_status_and_raw_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/services")
            .with_status(401)
            .with_body(r#"{"message":"unauthorized"}"#)
            .expect(1)
            .create();

        let config = config_for(&server).set_credential(Some("bad"));
        let err = match discover(&config) {
            Discovery::Failed(err) => err,
            other => panic!("unexpected discovery outcome {:?}", other),
        };

        mock.assert();
        assert_eq!(Some(401), err.status());
        match err.kind() {
            Kind::HttpStatus { body, .. } => assert_eq!(r#"{"message":"unauthorized"}"#, body),
            _ => panic!("test failed"),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/services")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create();

        let config = config_for(&server).set_credential(Some("rnd_test"));
        match discover(&config) {
            Discovery::Failed(err) => assert!(matches!(err.kind(), Kind::Decode(..))),
            other => panic!("unexpected discovery outcome {:?}", other),
        }
    }

    #[test]
    fn refused_connection_is_a_network_error() {
        let config = Config::new()
            .set_api_url(Url::parse("http://127.0.0.1:1").unwrap())
            .set_credential(Some("rnd_test"));
        match discover(&config) {
            Discovery::Failed(err) => assert!(err.is_network()),
            other => panic!("unexpected discovery outcome {:?}", other),
        }
    }
}
