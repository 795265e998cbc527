//! Environment variable gate for cluster-scoped import.
//!
//! Topics and ACLs live behind a cluster's REST endpoint, so importing them
//! needs cluster credentials that the planning engine cannot supply. They come
//! from the environment instead, all three or none.

use crate::credentials::Credentials;
use crate::error::{ProviderError, Result};

pub const KAFKA_API_KEY: &str = "KAFKA_API_KEY";
pub const KAFKA_API_SECRET: &str = "KAFKA_API_SECRET";
pub const KAFKA_HTTP_ENDPOINT: &str = "KAFKA_HTTP_ENDPOINT";

/// The import bundle. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaImportEnvVars {
    pub kafka_api_key: String,
    pub kafka_api_secret: String,
    pub kafka_http_endpoint: String,
}

impl KafkaImportEnvVars {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.kafka_api_key.clone(), self.kafka_api_secret.clone())
    }
}

/// Read the bundle from the process environment.
pub fn check_environment_variables_for_kafka_import() -> Result<KafkaImportEnvVars> {
    check_with(|name| std::env::var(name).ok())
}

/// Read the bundle through `lookup`. An empty value counts as unset.
pub fn check_with<F>(lookup: F) -> Result<KafkaImportEnvVars>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    match (get(KAFKA_API_KEY), get(KAFKA_API_SECRET), get(KAFKA_HTTP_ENDPOINT)) {
        (Some(kafka_api_key), Some(kafka_api_secret), Some(kafka_http_endpoint)) => {
            Ok(KafkaImportEnvVars {
                kafka_api_key,
                kafka_api_secret,
                kafka_http_endpoint,
            })
        }
        _ => Err(ProviderError::MissingImportEnvironment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const FULL: [(&str, &str); 3] = [
        (KAFKA_API_KEY, "key"),
        (KAFKA_API_SECRET, "secret"),
        (KAFKA_HTTP_ENDPOINT, "https://pkc-1.us-west-2.aws.confluent.cloud:443"),
    ];

    #[test]
    fn test_all_set() {
        let vars = env(&FULL);
        let bundle = check_with(|name| vars.get(name).cloned()).unwrap();
        assert_eq!(bundle.kafka_api_key, "key");
        assert_eq!(bundle.kafka_api_secret, "secret");
        assert_eq!(
            bundle.kafka_http_endpoint,
            "https://pkc-1.us-west-2.aws.confluent.cloud:443"
        );
        assert_eq!(bundle.credentials(), Credentials::new("key", "secret"));
    }

    #[test]
    fn test_any_one_missing_fails() {
        for missing in 0..FULL.len() {
            let partial: Vec<_> = FULL
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != missing)
                .map(|(_, kv)| *kv)
                .collect();
            let vars = env(&partial);
            let err = check_with(|name| vars.get(name).cloned()).unwrap_err();

            // The message names every variable, not just the missing one
            let msg = err.to_string();
            for (name, _) in FULL {
                assert!(msg.contains(name), "{} not in {:?}", name, msg);
            }
        }
    }

    #[test]
    fn test_empty_counts_as_unset() {
        let mut vars = env(&FULL);
        vars.insert(KAFKA_API_SECRET.to_string(), String::new());
        assert!(matches!(
            check_with(|name| vars.get(name).cloned()),
            Err(ProviderError::MissingImportEnvironment)
        ));
    }

    #[test]
    fn test_nothing_set() {
        assert!(check_with(|_| None).is_err());
    }
}
