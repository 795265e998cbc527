//! Shared test utilities for ccloud-provider integration tests.
//!
//! [`TestServer`] runs a small in-memory stand-in for the Confluent Cloud
//! control plane (org environments and the Kafka REST topic API) on a random
//! local port, and records every request it receives.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ccloud_provider::resource::EnvLookup;
use ccloud_provider::{Client, Provider, ProviderConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const ORG_KEY: &str = "org-key";
pub const ORG_SECRET: &str = "org-secret";
/// `Basic base64("org-key:org-secret")`
pub const ORG_AUTH: &str = "Basic b3JnLWtleTpvcmctc2VjcmV0";
/// `Basic base64("cluster-key:cluster-secret")`
pub const CLUSTER_AUTH: &str = "Basic Y2x1c3Rlci1rZXk6Y2x1c3Rlci1zZWNyZXQ=";
/// `Basic base64("env-key:env-secret")`
pub const ENV_AUTH: &str = "Basic ZW52LWtleTplbnYtc2VjcmV0";

/// One request as the fake control plane saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeTopic {
    partitions_count: u64,
    configs: BTreeMap<String, String>,
}

/// In-memory control plane state.
pub struct FakeCloud {
    next_env: Mutex<u64>,
    environments: Mutex<BTreeMap<String, String>>,
    topics: Mutex<BTreeMap<(String, String), FakeTopic>>,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeCloud {
    fn new() -> Self {
        Self {
            next_env: Mutex::new(123),
            environments: Mutex::new(BTreeMap::new()),
            topics: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, method: Method, path: String, headers: &HeaderMap, body: Option<Value>) {
        let header = |name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            body,
            authorization: header(header::AUTHORIZATION),
            user_agent: header(header::USER_AGENT),
        });
    }

    /// Insert an environment directly, bypassing the API.
    pub fn seed_environment(&self, id: &str, display_name: &str) {
        self.environments
            .lock()
            .unwrap()
            .insert(id.to_string(), display_name.to_string());
    }

    pub fn environment(&self, id: &str) -> Option<String> {
        self.environments.lock().unwrap().get(id).cloned()
    }

    pub fn topic_configs(&self, cluster: &str, topic: &str) -> Option<BTreeMap<String, String>> {
        self.topics
            .lock()
            .unwrap()
            .get(&(cluster.to_string(), topic.to_string()))
            .map(|t| t.configs.clone())
    }
}

fn v2_not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"errors": [{"status": "404", "detail": format!("{} not found", what)}]})),
    )
        .into_response()
}

fn v3_not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error_code": 404, "message": format!("{} not found", what)})),
    )
        .into_response()
}

fn environment_json(id: &str, display_name: &str) -> Value {
    json!({
        "api_version": "org/v2",
        "kind": "Environment",
        "id": id,
        "display_name": display_name
    })
}

async fn create_environment(
    State(cloud): State<Arc<FakeCloud>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    cloud.record(Method::POST, "/org/v2/environments".into(), &headers, Some(body.clone()));

    let Some(name) = body["display_name"].as_str() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": [{"detail": "display_name is required"}]})),
        )
            .into_response();
    };
    let id = {
        let mut next = cloud.next_env.lock().unwrap();
        let id = format!("env-{}", *next);
        *next += 1;
        id
    };
    cloud.seed_environment(&id, name);
    (StatusCode::CREATED, Json(environment_json(&id, name))).into_response()
}

async fn get_environment(
    State(cloud): State<Arc<FakeCloud>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    cloud.record(Method::GET, format!("/org/v2/environments/{}", id), &headers, None);
    match cloud.environment(&id) {
        Some(name) => Json(environment_json(&id, &name)).into_response(),
        None => v2_not_found(&id),
    }
}

async fn update_environment(
    State(cloud): State<Arc<FakeCloud>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    cloud.record(Method::PATCH, format!("/org/v2/environments/{}", id), &headers, Some(body.clone()));

    let mut environments = cloud.environments.lock().unwrap();
    let Some(name) = environments.get_mut(&id) else {
        return v2_not_found(&id);
    };
    if let Some(new_name) = body["display_name"].as_str() {
        *name = new_name.to_string();
    }
    Json(environment_json(&id, name)).into_response()
}

async fn delete_environment(
    State(cloud): State<Arc<FakeCloud>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    cloud.record(Method::DELETE, format!("/org/v2/environments/{}", id), &headers, None);
    match cloud.environments.lock().unwrap().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => v2_not_found(&id),
    }
}

fn topic_json(cluster: &str, topic: &str, partitions_count: u64) -> Value {
    json!({
        "kind": "KafkaTopic",
        "cluster_id": cluster,
        "topic_name": topic,
        "partitions_count": partitions_count,
        "is_internal": false
    })
}

async fn create_topic(
    State(cloud): State<Arc<FakeCloud>>,
    Path(cluster): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    cloud.record(
        Method::POST,
        format!("/kafka/v3/clusters/{}/topics", cluster),
        &headers,
        Some(body.clone()),
    );

    let name = body["topic_name"].as_str().unwrap_or_default().to_string();
    let partitions_count = body["partitions_count"].as_u64().unwrap_or(6);
    let configs = body["configs"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| Some((e["name"].as_str()?.to_string(), e["value"].as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    cloud.topics.lock().unwrap().insert(
        (cluster.clone(), name.clone()),
        FakeTopic {
            partitions_count,
            configs,
        },
    );
    (StatusCode::CREATED, Json(topic_json(&cluster, &name, partitions_count))).into_response()
}

async fn get_topic(
    State(cloud): State<Arc<FakeCloud>>,
    Path((cluster, topic)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    cloud.record(
        Method::GET,
        format!("/kafka/v3/clusters/{}/topics/{}", cluster, topic),
        &headers,
        None,
    );
    match cloud.topics.lock().unwrap().get(&(cluster.clone(), topic.clone())) {
        Some(t) => Json(topic_json(&cluster, &topic, t.partitions_count)).into_response(),
        None => v3_not_found(&topic),
    }
}

async fn delete_topic(
    State(cloud): State<Arc<FakeCloud>>,
    Path((cluster, topic)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    cloud.record(
        Method::DELETE,
        format!("/kafka/v3/clusters/{}/topics/{}", cluster, topic),
        &headers,
        None,
    );
    match cloud.topics.lock().unwrap().remove(&(cluster, topic.clone())) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => v3_not_found(&topic),
    }
}

async fn list_topic_configs(
    State(cloud): State<Arc<FakeCloud>>,
    Path((cluster, topic)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    cloud.record(
        Method::GET,
        format!("/kafka/v3/clusters/{}/topics/{}/configs", cluster, topic),
        &headers,
        None,
    );
    let topics = cloud.topics.lock().unwrap();
    let Some(t) = topics.get(&(cluster, topic.clone())) else {
        return v3_not_found(&topic);
    };

    let mut data: Vec<Value> = t
        .configs
        .iter()
        .map(|(name, value)| json!({"name": name, "value": value, "is_default": false}))
        .collect();
    data.push(json!({"name": "compression.type", "value": "producer", "is_default": true}));
    Json(json!({"kind": "KafkaTopicConfigList", "data": data})).into_response()
}

async fn alter_topic_configs(
    State(cloud): State<Arc<FakeCloud>>,
    Path((cluster, topic)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    cloud.record(
        Method::POST,
        format!("/kafka/v3/clusters/{}/topics/{}/configs:alter", cluster, topic),
        &headers,
        Some(body.clone()),
    );
    let mut topics = cloud.topics.lock().unwrap();
    let Some(t) = topics.get_mut(&(cluster, topic.clone())) else {
        return v3_not_found(&topic);
    };

    for entry in body["data"].as_array().into_iter().flatten() {
        let Some(name) = entry["name"].as_str() else {
            continue;
        };
        match (entry["operation"].as_str(), entry["value"].as_str()) {
            (Some("SET"), Some(value)) => {
                t.configs.insert(name.to_string(), value.to_string());
            }
            (Some("DELETE"), _) => {
                t.configs.remove(name);
            }
            _ => {}
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

fn create_router(cloud: Arc<FakeCloud>) -> Router {
    Router::new()
        .route("/org/v2/environments", post(create_environment))
        .route(
            "/org/v2/environments/{id}",
            get(get_environment)
                .patch(update_environment)
                .delete(delete_environment),
        )
        .route("/kafka/v3/clusters/{cluster}/topics", post(create_topic))
        .route(
            "/kafka/v3/clusters/{cluster}/topics/{topic}",
            get(get_topic).delete(delete_topic),
        )
        .route(
            "/kafka/v3/clusters/{cluster}/topics/{topic}/configs",
            get(list_topic_configs),
        )
        .route(
            "/kafka/v3/clusters/{cluster}/topics/{topic}/configs:alter",
            post(alter_topic_configs),
        )
        .with_state(cloud)
}

/// Test server wrapper around the fake control plane.
pub struct TestServer {
    pub addr: SocketAddr,
    pub cloud: Arc<FakeCloud>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    /// Spawn the fake control plane on a random local port.
    pub async fn spawn() -> Self {
        let cloud = Arc::new(FakeCloud::new());
        let router = create_router(Arc::clone(&cloud));

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
        let actual_addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr: actual_addr,
            cloud,
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Provider pointed at this server with the organization credentials.
    pub fn provider(&self) -> Provider {
        Provider::new(self.client())
    }

    /// Provider whose topic and ACL imports read `env`.
    pub fn provider_with_env(&self, env: EnvLookup) -> Provider {
        Provider::with_env_lookup(self.client(), env)
    }

    fn client(&self) -> Arc<Client> {
        let config = ProviderConfig::new(self.base_url(), ORG_KEY, ORG_SECRET)
            .with_poll_interval(Duration::from_millis(10));
        Arc::new(Client::new(&config))
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.cloud.requests.lock().unwrap().clone()
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}
