//! Connection parameter resolution
//!
//! A non-empty `connection_uri` in the config fully determines the
//! connection. Otherwise host, user and password are assembled one by one,
//! each preferring its environment variable over the config file value.
//! Missing values are not an error: a bad connection fails on its own.

use mongodb::options::{AuthMechanism, ClientOptions, Credential};

use crate::config::{MongoConfig, ENV_DB_PWD, ENV_DB_URL, ENV_DB_USER};

use super::APP_NAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Uri {
        connection_uri: String,
        replica_set: Option<String>,
    },
    Discrete {
        host: String,
        user: String,
        password: String,
    },
}

/// Resolve credentials from the process environment and `config`.
pub fn resolve(config: &MongoConfig) -> Credentials {
    resolve_with(config, |key| std::env::var(key).ok())
}

/// Resolve credentials with an explicit environment lookup.
pub fn resolve_with<F>(config: &MongoConfig, env: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    if !config.connection_uri.is_empty() {
        let replica_set = Some(config.replica_set.clone()).filter(|rs| !rs.is_empty());
        return Credentials::Uri {
            connection_uri: config.connection_uri.clone(),
            replica_set,
        };
    }

    let lookup = |key: &str, fallback: &str| env(key).unwrap_or_else(|| fallback.to_string());

    Credentials::Discrete {
        host: lookup(ENV_DB_URL, &config.url),
        user: lookup(ENV_DB_USER, &config.user),
        password: lookup(ENV_DB_PWD, &config.password),
    }
}

impl Credentials {
    /// Connection string handed to the driver's parser.
    pub fn connection_string(&self) -> String {
        match self {
            Credentials::Uri { connection_uri, .. } => connection_uri.clone(),
            Credentials::Discrete { host, .. } => {
                if host.contains("://") {
                    host.clone()
                } else {
                    format!("mongodb://{}", host)
                }
            }
        }
    }

    /// Finish parsed client options: replica set for URIs, SCRAM-SHA-256 for
    /// discrete credentials.
    pub fn apply(&self, options: &mut ClientOptions) {
        options.app_name = Some(APP_NAME.to_string());

        match self {
            Credentials::Uri { replica_set, .. } => {
                if options.repl_set_name.is_none() {
                    options.repl_set_name = replica_set.clone();
                }
            }
            Credentials::Discrete { user, password, .. } => {
                if !user.is_empty() {
                    options.credential = Some(
                        Credential::builder()
                            .username(user.clone())
                            .password(password.clone())
                            .mechanism(AuthMechanism::ScramSha256)
                            .build(),
                    );
                }
            }
        }
    }

    /// Host part for log lines, never the password.
    pub fn redacted(&self) -> String {
        match self {
            Credentials::Uri { connection_uri, .. } => match connection_uri.rsplit_once('@') {
                Some((scheme_and_auth, hosts)) => {
                    let scheme = scheme_and_auth.split("://").next().unwrap_or("mongodb");
                    format!("{}://***@{}", scheme, hosts)
                }
                None => connection_uri.clone(),
            },
            Credentials::Discrete { host, user, .. } if !user.is_empty() => {
                format!("{}@{}", user, host)
            }
            Credentials::Discrete { host, .. } => host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn discrete_config() -> MongoConfig {
        MongoConfig {
            url: "config-host:27017".into(),
            user: "config-user".into(),
            password: "config-pwd".into(),
            ..MongoConfig::default()
        }
    }

    #[test]
    fn test_uri_wins_over_discrete_fields() {
        let config = MongoConfig {
            connection_uri: "mongodb://uri-host:27017".into(),
            ..discrete_config()
        };
        let env = env_from(&[
            (ENV_DB_URL, "env-host"),
            (ENV_DB_USER, "env-user"),
            (ENV_DB_PWD, "env-pwd"),
        ]);

        assert_eq!(
            resolve_with(&config, env),
            Credentials::Uri {
                connection_uri: "mongodb://uri-host:27017".into(),
                replica_set: None,
            }
        );
    }

    #[test]
    fn test_replica_set_carried_with_uri() {
        let config = MongoConfig {
            connection_uri: "mongodb://a,b,c".into(),
            replica_set: "rs0".into(),
            ..MongoConfig::default()
        };
        match resolve_with(&config, |_| None) {
            Credentials::Uri { replica_set, .. } => assert_eq!(replica_set.as_deref(), Some("rs0")),
            other => panic!("expected URI credentials, got {:?}", other),
        }
    }

    #[test]
    fn test_config_values_without_env() {
        assert_eq!(
            resolve_with(&discrete_config(), |_| None),
            Credentials::Discrete {
                host: "config-host:27017".into(),
                user: "config-user".into(),
                password: "config-pwd".into(),
            }
        );
    }

    #[test]
    fn test_env_overrides_each_field() {
        let env = env_from(&[(ENV_DB_USER, "env-user"), (ENV_DB_PWD, "env-pwd")]);
        assert_eq!(
            resolve_with(&discrete_config(), env),
            Credentials::Discrete {
                host: "config-host:27017".into(),
                user: "env-user".into(),
                password: "env-pwd".into(),
            }
        );

        let env = env_from(&[(ENV_DB_URL, "env-host:27018")]);
        match resolve_with(&discrete_config(), env) {
            Credentials::Discrete { host, user, .. } => {
                assert_eq!(host, "env-host:27018");
                assert_eq!(user, "config-user");
            }
            other => panic!("expected discrete credentials, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_values_are_empty_not_errors() {
        let config = MongoConfig {
            url: String::new(),
            ..MongoConfig::default()
        };
        assert_eq!(
            resolve_with(&config, |_| None),
            Credentials::Discrete {
                host: String::new(),
                user: String::new(),
                password: String::new(),
            }
        );
    }

    #[test]
    fn test_connection_string() {
        let creds = Credentials::Discrete {
            host: "h1:27017,h2:27017".into(),
            user: String::new(),
            password: String::new(),
        };
        assert_eq!(creds.connection_string(), "mongodb://h1:27017,h2:27017");

        let creds = Credentials::Discrete {
            host: "mongodb://h1:27017".into(),
            user: String::new(),
            password: String::new(),
        };
        assert_eq!(creds.connection_string(), "mongodb://h1:27017");
    }

    #[test]
    fn test_apply_sets_scram_credential() {
        let creds = Credentials::Discrete {
            host: "localhost".into(),
            user: "bench".into(),
            password: "secret".into(),
        };
        let mut options = ClientOptions::default();
        creds.apply(&mut options);

        let credential = options.credential.expect("credential attached");
        assert_eq!(credential.username.as_deref(), Some("bench"));
        assert_eq!(credential.mechanism, Some(AuthMechanism::ScramSha256));
        assert_eq!(options.app_name.as_deref(), Some(APP_NAME));
    }

    #[test]
    fn test_apply_replica_set() {
        let creds = Credentials::Uri {
            connection_uri: "mongodb://localhost".into(),
            replica_set: Some("rs0".into()),
        };
        let mut options = ClientOptions::default();
        creds.apply(&mut options);
        assert_eq!(options.repl_set_name.as_deref(), Some("rs0"));
        assert!(options.credential.is_none());
    }

    #[test]
    fn test_redacted_hides_password() {
        let creds = Credentials::Uri {
            connection_uri: "mongodb://bench:secret@db:27017".into(),
            replica_set: None,
        };
        let shown = creds.redacted();
        assert!(!shown.contains("secret"));
        assert_eq!(shown, "mongodb://***@db:27017");

        let creds = Credentials::Discrete {
            host: "db".into(),
            user: "bench".into(),
            password: "secret".into(),
        };
        assert_eq!(creds.redacted(), "bench@db");
    }
}
