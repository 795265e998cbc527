//! Kafka ACL reconciler (kafka-rest API).
//!
//! An ACL has no server-side id: the seven-field tuple is its identity, so
//! nothing about it can change in place except the credentials used to reach
//! the cluster.

use std::sync::Arc;

use async_trait::async_trait;
use ccloud_sdk::kafka_rest::Acl;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{
    EnvLookup, Resource, StateRecord, check_update, import_bundle, observe, require_credentials, require_id,
    require_non_empty,
};
use crate::client::Client;
use crate::credentials::Credentials;
use crate::error::{Operation, ProviderError, Result};
use crate::kafka_rest::KafkaRestClient;
use crate::translate::{
    string_to_acl_operation, string_to_acl_pattern_type, string_to_acl_permission,
    string_to_acl_resource_type,
};

pub const PARAM_CREDENTIALS: &str = "credentials";

const ID_SEPARATOR: char = '#';
const IMPORT_ID_FORMAT: &str =
    "<cluster id>/<resource type>#<resource name>#<pattern type>#<principal>#<host>#<operation>#<permission>";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KafkaAclState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub kafka_cluster_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub pattern_type: String,
    #[serde(default)]
    pub principal: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub permission: String,
    #[serde(default)]
    pub http_endpoint: String,
    #[serde(default)]
    pub credentials: Credentials,
}

impl KafkaAclState {
    /// The binding this record describes, with every token translated.
    pub fn acl(&self) -> Result<Acl> {
        Ok(Acl {
            resource_type: string_to_acl_resource_type(&self.resource_type)?,
            resource_name: self.resource_name.clone(),
            pattern_type: string_to_acl_pattern_type(&self.pattern_type)?,
            principal: self.principal.clone(),
            host: self.host.clone(),
            operation: string_to_acl_operation(&self.operation)?,
            permission: string_to_acl_permission(&self.permission)?,
        })
    }

    /// `<cluster id>/` followed by the tuple joined with `#`.
    pub fn compose_id(&self) -> String {
        let tuple = [
            self.resource_type.as_str(),
            self.resource_name.as_str(),
            self.pattern_type.as_str(),
            self.principal.as_str(),
            self.host.as_str(),
            self.operation.as_str(),
            self.permission.as_str(),
        ];
        format!(
            "{}/{}",
            self.kafka_cluster_id,
            tuple.join(&ID_SEPARATOR.to_string())
        )
    }
}

impl StateRecord for KafkaAclState {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        let resource = KafkaAclResource::DISPLAY_NAME;
        require_non_empty(resource, "kafka_cluster_id", &self.kafka_cluster_id)?;
        require_non_empty(resource, "http_endpoint", &self.http_endpoint)?;
        require_non_empty(resource, "resource_name", &self.resource_name)?;
        require_non_empty(resource, "principal", &self.principal)?;
        require_non_empty(resource, "host", &self.host)?;
        require_credentials(&self.credentials)?;
        self.acl().map(|_| ())
    }
}

pub struct KafkaAclResource {
    client: Arc<Client>,
    env: Option<EnvLookup>,
}

impl KafkaAclResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            env: None,
        }
    }

    /// Replace the environment used by import.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = Some(env);
        self
    }

    fn rest_client(&self, state: &KafkaAclState) -> KafkaRestClient {
        self.client.kafka_rest_factory.create_kafka_rest_client(
            &state.http_endpoint,
            &state.kafka_cluster_id,
            &state.credentials.key,
            &state.credentials.secret,
        )
    }
}

#[async_trait]
impl Resource for KafkaAclResource {
    type State = KafkaAclState;

    const TYPE_NAME: &'static str = "confluent_kafka_acl";
    const DISPLAY_NAME: &'static str = "kafka ACL";
    const MUTABLE_FIELDS: &'static [&'static str] = &[PARAM_CREDENTIALS];

    async fn create(&self, state: &mut KafkaAclState) -> Result<()> {
        let acl = state.acl()?;
        let rest = self.rest_client(state);

        rest.api
            .create_acl(&rest.api_context(), &rest.cluster_id, &acl)
            .await
            .map_err(|e| {
                error!("Kafka ACL create failed {:?}: {}", acl, e);
                ProviderError::api(Operation::Create, Self::DISPLAY_NAME, &state.compose_id(), e)
            })?;

        let id = state.compose_id();
        debug!("Created kafka ACL {}", id);
        state.set_id(Some(id));
        Ok(())
    }

    async fn read(&self, state: &mut KafkaAclState) -> Result<()> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };
        info!("Kafka ACL read for {}", id);

        let filter = state.acl()?;
        let rest = self.rest_client(state);
        let result = rest
            .api
            .list_acls(&rest.api_context(), &rest.cluster_id, &filter)
            .await;

        let Some(acls) = observe(Self::DISPLAY_NAME, state, &id, result)? else {
            return Ok(());
        };
        if acls.is_empty() {
            warn!("{} {} not found, removing from state", Self::DISPLAY_NAME, id);
            state.set_id(None);
        }
        Ok(())
    }

    async fn update(&self, prior: &KafkaAclState, planned: &mut KafkaAclState) -> Result<()> {
        check_update::<Self>(prior, planned)?;
        let id = require_id(Operation::Update, prior)?;
        debug!("Kafka ACL {} credentials updated", id);
        Ok(())
    }

    async fn delete(&self, state: &KafkaAclState) -> Result<()> {
        let id = require_id(Operation::Delete, state)?;
        info!("Deleting kafka ACL {}", id);

        let filter = state.acl()?;
        let rest = self.rest_client(state);
        rest.api
            .delete_acls(&rest.api_context(), &rest.cluster_id, &filter)
            .await
            .map_err(|e| ProviderError::api(Operation::Delete, Self::DISPLAY_NAME, &id, e))
    }

    async fn import(&self, id: &str) -> Result<KafkaAclState> {
        let env = import_bundle(self.env.as_ref())?;
        let invalid = || ProviderError::InvalidImportId {
            resource: Self::DISPLAY_NAME,
            id: id.to_string(),
            expected: IMPORT_ID_FORMAT,
        };

        let (cluster_id, tuple) = id.split_once('/').ok_or_else(invalid)?;
        let parts: Vec<&str> = tuple.split(ID_SEPARATOR).collect();
        let &[resource_type, resource_name, pattern_type, principal, host, operation, permission] =
            parts.as_slice()
        else {
            return Err(invalid());
        };
        if cluster_id.is_empty() {
            return Err(invalid());
        }

        let state = KafkaAclState {
            id: Some(id.to_string()),
            kafka_cluster_id: cluster_id.to_string(),
            resource_type: resource_type.to_string(),
            resource_name: resource_name.to_string(),
            pattern_type: pattern_type.to_string(),
            principal: principal.to_string(),
            host: host.to_string(),
            operation: operation.to_string(),
            permission: permission.to_string(),
            http_endpoint: env.kafka_http_endpoint.clone(),
            credentials: env.credentials(),
        };
        state.acl()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import_env::{KAFKA_API_KEY, KAFKA_API_SECRET, KAFKA_HTTP_ENDPOINT};
    use crate::resource::testing::RecordingTransport;
    use ccloud_sdk::Method;
    use serde_json::json;

    const ENDPOINT: &str = "https://pkc-1.us-east-2.aws.confluent.cloud:443";
    const ID: &str = "lkc-1/TOPIC#orders#LITERAL#User:sa-1#*#READ#ALLOW";

    fn acl_state() -> KafkaAclState {
        KafkaAclState {
            id: None,
            kafka_cluster_id: "lkc-1".into(),
            resource_type: "TOPIC".into(),
            resource_name: "orders".into(),
            pattern_type: "LITERAL".into(),
            principal: "User:sa-1".into(),
            host: "*".into(),
            operation: "READ".into(),
            permission: "ALLOW".into(),
            http_endpoint: ENDPOINT.into(),
            credentials: Credentials::new("cluster-key", "cluster-secret"),
        }
    }

    fn import_env() -> EnvLookup {
        Arc::new(|name: &str| match name {
            KAFKA_API_KEY => Some("env-key".to_string()),
            KAFKA_API_SECRET => Some("env-secret".to_string()),
            KAFKA_HTTP_ENDPOINT => Some(ENDPOINT.to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_validate_rejects_unknown_operation() {
        let mut state = acl_state();
        state.operation = "read".into();
        let err = state.validate().unwrap_err();
        assert_eq!(err.to_string(), "unknown ACL operation was found: read");
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(acl_state().validate().is_ok());

        let mut state = acl_state();
        state.credentials = Credentials::default();
        assert!(matches!(
            state.validate(),
            Err(ProviderError::MissingBlockAttribute { attribute: "key", block: "credentials" })
        ));

        state.credentials = Credentials::new("cluster-key", "");
        assert_eq!(
            state.validate().unwrap_err().to_string(),
            "could not find secret attribute in credentials block"
        );
    }

    #[tokio::test]
    async fn test_create_posts_tuple_and_composes_id() {
        let transport = RecordingTransport::new();
        transport.respond_empty(201);
        let resource = KafkaAclResource::new(transport.client());

        let mut state = acl_state();
        resource.create(&mut state).await.unwrap();
        assert_eq!(state.id.as_deref(), Some(ID));

        let request = &transport.requests()[0];
        assert_eq!(request.url, format!("{}/kafka/v3/clusters/lkc-1/acls", ENDPOINT));
        assert_eq!(request.body.as_ref().unwrap()["operation"], json!("READ"));
    }

    #[tokio::test]
    async fn test_create_with_bad_token_makes_no_call() {
        let transport = RecordingTransport::new();
        let resource = KafkaAclResource::new(transport.client());

        let mut state = acl_state();
        state.permission = "PERMIT".into();
        assert!(matches!(
            resource.create(&mut state).await,
            Err(ProviderError::UnknownEnumToken { .. })
        ));
        assert!(!transport.was_called());
    }

    #[tokio::test]
    async fn test_read_empty_list_clears_id() {
        let transport = RecordingTransport::new();
        transport.respond(200, json!({"data": []}));
        let resource = KafkaAclResource::new(transport.client());

        let mut state = acl_state();
        state.id = Some(ID.into());
        resource.read(&mut state).await.unwrap();
        assert_eq!(state.id, None);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::GET);
        assert!(request.query.contains(&("principal".to_string(), "User:sa-1".to_string())));
    }

    #[tokio::test]
    async fn test_read_match_keeps_id() {
        let transport = RecordingTransport::new();
        transport.respond(
            200,
            json!({"data": [{
                "resource_type": "TOPIC",
                "resource_name": "orders",
                "pattern_type": "LITERAL",
                "principal": "User:sa-1",
                "host": "*",
                "operation": "READ",
                "permission": "ALLOW"
            }]}),
        );
        let resource = KafkaAclResource::new(transport.client());

        let mut state = acl_state();
        state.id = Some(ID.into());
        resource.read(&mut state).await.unwrap();
        assert_eq!(state.id.as_deref(), Some(ID));
    }

    #[tokio::test]
    async fn test_update_only_rotates_credentials() {
        let transport = RecordingTransport::new();
        let resource = KafkaAclResource::new(transport.client());

        let mut prior = acl_state();
        prior.id = Some(ID.into());
        let mut planned = prior.clone();
        planned.credentials = Credentials::new("new-key", "new-secret");
        resource.update(&prior, &mut planned).await.unwrap();
        assert!(!transport.was_called());

        planned.host = "10.0.0.1".into();
        let err = resource.update(&prior, &mut planned).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "only credentials field can be updated for a kafka ACL (changed: host)"
        );
    }

    #[tokio::test]
    async fn test_delete_filters_on_tuple() {
        let transport = RecordingTransport::new();
        transport.respond(200, json!({"data": []}));
        let resource = KafkaAclResource::new(transport.client());

        let mut state = acl_state();
        state.id = Some(ID.into());
        resource.delete(&state).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.query.len(), 7);
    }

    #[tokio::test]
    async fn test_import_parses_tuple() {
        let resource =
            KafkaAclResource::new(RecordingTransport::new().client()).with_env_lookup(import_env());

        let state = resource.import(ID).await.unwrap();
        let mut expected = acl_state();
        expected.id = Some(ID.into());
        expected.credentials = Credentials::new("env-key", "env-secret");
        assert_eq!(state, expected);
        assert_eq!(state.compose_id(), ID);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_ids() {
        let resource =
            KafkaAclResource::new(RecordingTransport::new().client()).with_env_lookup(import_env());

        for bad in [
            "TOPIC#orders#LITERAL#User:sa-1#*#READ#ALLOW",
            "lkc-1/TOPIC#orders#LITERAL#User:sa-1#*#READ",
            "/TOPIC#orders#LITERAL#User:sa-1#*#READ#ALLOW",
        ] {
            assert!(matches!(
                resource.import(bad).await,
                Err(ProviderError::InvalidImportId { .. })
            ));
        }

        let err = resource
            .import("lkc-1/QUEUE#orders#LITERAL#User:sa-1#*#READ#ALLOW")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown ACL resource type was found: QUEUE");
    }

    #[tokio::test]
    async fn test_import_without_env_fails() {
        let resource = KafkaAclResource::new(RecordingTransport::new().client())
            .with_env_lookup(Arc::new(|_: &str| None));
        assert!(matches!(
            resource.import(ID).await,
            Err(ProviderError::MissingImportEnvironment)
        ));
    }
}
