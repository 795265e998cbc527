//! Kafka REST v3 (`/kafka/v3`): topics, topic configs and ACLs.
//!
//! Unlike the other families this API is served by each cluster's own HTTP
//! endpoint and authenticated with cluster-scoped credentials.

use serde::{Deserialize, Serialize};

use crate::auth::{ApiContext, ApiFamily};
use crate::client::{ApiClient, Configuration};
use crate::error::Result;
use crate::wire_enum;

wire_enum! {
    AclResourceType, "ACL resource type" {
        Unknown => "UNKNOWN",
        Any => "ANY",
        Topic => "TOPIC",
        Group => "GROUP",
        Cluster => "CLUSTER",
        TransactionalId => "TRANSACTIONAL_ID",
        DelegationToken => "DELEGATION_TOKEN",
    }
}

wire_enum! {
    AclPatternType, "ACL pattern type" {
        Unknown => "UNKNOWN",
        Any => "ANY",
        Match => "MATCH",
        Literal => "LITERAL",
        Prefixed => "PREFIXED",
    }
}

wire_enum! {
    AclOperation, "ACL operation" {
        Unknown => "UNKNOWN",
        Any => "ANY",
        All => "ALL",
        Read => "READ",
        Write => "WRITE",
        Create => "CREATE",
        Delete => "DELETE",
        Alter => "ALTER",
        Describe => "DESCRIBE",
        ClusterAction => "CLUSTER_ACTION",
        DescribeConfigs => "DESCRIBE_CONFIGS",
        AlterConfigs => "ALTER_CONFIGS",
        IdempotentWrite => "IDEMPOTENT_WRITE",
    }
}

wire_enum! {
    AclPermission, "ACL permission" {
        Unknown => "UNKNOWN",
        Any => "ANY",
        Deny => "DENY",
        Allow => "ALLOW",
    }
}

/// One ACL binding. All seven fields together identify it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Acl {
    pub resource_type: AclResourceType,
    pub resource_name: String,
    pub pattern_type: AclPatternType,
    pub principal: String,
    pub host: String,
    pub operation: AclOperation,
    pub permission: AclPermission,
}

impl Acl {
    /// Query parameters selecting exactly this binding.
    fn to_query(&self) -> [(&'static str, &str); 7] {
        use crate::WireEnum;
        [
            ("resource_type", self.resource_type.as_str()),
            ("resource_name", self.resource_name.as_str()),
            ("pattern_type", self.pattern_type.as_str()),
            ("principal", self.principal.as_str()),
            ("host", self.host.as_str()),
            ("operation", self.operation.as_str()),
            ("permission", self.permission.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AclDataList {
    data: Vec<Acl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTopicRequest {
    pub topic_name: String,
    pub partitions_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    pub cluster_id: String,
    pub topic_name: String,
    pub partitions_count: u32,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_read_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TopicConfigList {
    data: Vec<TopicConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlterOperation {
    Set,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlterConfigEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub operation: AlterOperation,
}

impl AlterConfigEntry {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            operation: AlterOperation::Set,
        }
    }

    pub fn delete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            operation: AlterOperation::Delete,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AlterConfigBatchRequest<'a> {
    data: &'a [AlterConfigEntry],
}

/// Client for one cluster's REST endpoint.
#[derive(Clone)]
pub struct KafkaRestApi {
    client: ApiClient,
}

impl KafkaRestApi {
    pub fn new(config: Configuration) -> Self {
        Self {
            client: ApiClient::new(ApiFamily::KafkaRest, config),
        }
    }

    pub fn base_path(&self) -> &str {
        self.client.base_path()
    }

    fn topics_path(cluster_id: &str) -> String {
        format!("/kafka/v3/clusters/{}/topics", cluster_id)
    }

    fn acls_path(cluster_id: &str) -> String {
        format!("/kafka/v3/clusters/{}/acls", cluster_id)
    }

    pub async fn create_topic(
        &self,
        ctx: &ApiContext,
        cluster_id: &str,
        request: &CreateTopicRequest,
    ) -> Result<Topic> {
        self.client
            .post(ctx, &Self::topics_path(cluster_id), request)
            .await
    }

    pub async fn get_topic(&self, ctx: &ApiContext, cluster_id: &str, topic_name: &str) -> Result<Topic> {
        self.client
            .get(
                ctx,
                &format!("{}/{}", Self::topics_path(cluster_id), topic_name),
                &[],
            )
            .await
    }

    pub async fn list_topic_configs(
        &self,
        ctx: &ApiContext,
        cluster_id: &str,
        topic_name: &str,
    ) -> Result<Vec<TopicConfig>> {
        let list: TopicConfigList = self
            .client
            .get(
                ctx,
                &format!("{}/{}/configs", Self::topics_path(cluster_id), topic_name),
                &[],
            )
            .await?;
        Ok(list.data)
    }

    pub async fn alter_topic_configs(
        &self,
        ctx: &ApiContext,
        cluster_id: &str,
        topic_name: &str,
        entries: &[AlterConfigEntry],
    ) -> Result<()> {
        self.client
            .post_no_content(
                ctx,
                &format!("{}/{}/configs:alter", Self::topics_path(cluster_id), topic_name),
                &AlterConfigBatchRequest { data: entries },
            )
            .await
    }

    pub async fn delete_topic(&self, ctx: &ApiContext, cluster_id: &str, topic_name: &str) -> Result<()> {
        self.client
            .delete(
                ctx,
                &format!("{}/{}", Self::topics_path(cluster_id), topic_name),
                &[],
            )
            .await
    }

    pub async fn create_acl(&self, ctx: &ApiContext, cluster_id: &str, acl: &Acl) -> Result<()> {
        self.client
            .post_no_content(ctx, &Self::acls_path(cluster_id), acl)
            .await
    }

    /// ACLs matching `filter` exactly.
    pub async fn list_acls(&self, ctx: &ApiContext, cluster_id: &str, filter: &Acl) -> Result<Vec<Acl>> {
        let list: AclDataList = self
            .client
            .get(ctx, &Self::acls_path(cluster_id), &filter.to_query())
            .await?;
        Ok(list.data)
    }

    pub async fn delete_acls(&self, ctx: &ApiContext, cluster_id: &str, filter: &Acl) -> Result<()> {
        self.client
            .delete(ctx, &Self::acls_path(cluster_id), &filter.to_query())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_acl() -> Acl {
        Acl {
            resource_type: AclResourceType::Topic,
            resource_name: "orders".to_string(),
            pattern_type: AclPatternType::Literal,
            principal: "User:sa-123".to_string(),
            host: "*".to_string(),
            operation: AclOperation::Read,
            permission: AclPermission::Allow,
        }
    }

    #[test]
    fn test_acl_wire_format() {
        assert_eq!(
            serde_json::to_value(sample_acl()).unwrap(),
            json!({
                "resource_type": "TOPIC",
                "resource_name": "orders",
                "pattern_type": "LITERAL",
                "principal": "User:sa-123",
                "host": "*",
                "operation": "READ",
                "permission": "ALLOW"
            })
        );
    }

    #[test]
    fn test_acl_query_covers_whole_tuple() {
        let acl = sample_acl();
        let query = acl.to_query();
        assert_eq!(query[0], ("resource_type", "TOPIC"));
        assert_eq!(query[5], ("operation", "READ"));
        assert_eq!(query.len(), 7);
    }

    #[test]
    fn test_alter_entries() {
        let entries = [
            AlterConfigEntry::set("retention.ms", "600000"),
            AlterConfigEntry::delete("cleanup.policy"),
        ];
        assert_eq!(
            serde_json::to_value(AlterConfigBatchRequest { data: &entries }).unwrap(),
            json!({"data": [
                {"name": "retention.ms", "value": "600000", "operation": "SET"},
                {"name": "cleanup.policy", "operation": "DELETE"}
            ]})
        );
    }
}
