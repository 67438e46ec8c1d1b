use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::ApiConfig;
use crate::envelope::Mutation;

/// A scoped connection to the manager API.
///
/// Holds the HTTP connection pool and credentials for the duration of one
/// command; dropping the session releases the pool. Sub-resource accessors
/// borrow the session, so no API call can outlive it.
pub struct ApiSession {
    http: Client,
    base_url: String,
    endpoint_type: String,
    access_key: Option<String>,
}

impl ApiSession {
    pub fn connect(config: &ApiConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            endpoint_type: config.endpoint_type.clone(),
            access_key: config.access_key.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_type(&self) -> &str {
        &self.endpoint_type
    }

    pub fn group(&self) -> GroupClient<'_> {
        GroupClient { api: self }
    }

    pub fn manager(&self) -> ManagerClient<'_> {
        ManagerClient { api: self }
    }

    pub fn admin(&self) -> AdminClient<'_> {
        AdminClient { api: self }
    }

    pub fn resource(&self) -> ResourceClient<'_> {
        ResourceClient { api: self }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_key {
            Some(key) => req.header("X-Access-Key", key),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let resp = self
            .add_auth(req)
            .send()
            .await
            .context("Failed to connect to the manager")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{status}: {body}");
        }

        resp.json::<T>().await.context("Failed to parse response")
    }

    /// GET request returning deserialized JSON.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.get(self.url(path))).await
    }

    /// GET request where 404 means "no such entity" rather than an error.
    async fn get_opt<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let req = self.add_auth(self.http.get(self.url(path)));
        let resp = req
            .send()
            .await
            .context("Failed to connect to the manager")?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{status}: {body}");
        }

        resp.json::<T>()
            .await
            .map(Some)
            .context("Failed to parse response")
    }

    /// POST request with JSON body, returning deserialized JSON.
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    /// DELETE request returning deserialized JSON.
    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.delete(self.url(path))).await
    }
}

/// Group administration calls.
pub struct GroupClient<'a> {
    api: &'a ApiSession,
}

impl GroupClient<'_> {
    /// Fetch one group restricted to the given response fields.
    /// `None` when no such group exists.
    pub async fn detail(&self, gid: &str, fields: &[&str]) -> Result<Option<Map<String, Value>>> {
        let path = format!("/admin/groups/{gid}?fields={}", fields.join(","));
        self.api.get_opt(&path).await
    }

    /// List all groups in a domain.
    pub async fn list(&self, domain_name: &str, fields: &[&str]) -> Result<Vec<Map<String, Value>>> {
        let path = format!("/admin/groups?domain={domain_name}&fields={}", fields.join(","));
        self.api.get(&path).await
    }

    pub async fn create(
        &self,
        domain_name: &str,
        name: &str,
        description: &str,
        is_active: bool,
    ) -> Result<Mutation> {
        let body = json!({
            "domain_name": domain_name,
            "name": name,
            "description": description,
            "is_active": is_active,
        });
        self.api.post("/admin/groups", &body).await
    }

    /// Partial update: unset options are omitted from the request body so the
    /// server leaves those attributes untouched.
    pub async fn update(
        &self,
        gid: &str,
        name: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Mutation> {
        let mut body = Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(is_active) = is_active {
            body.insert("is_active".to_string(), json!(is_active));
        }
        self.api
            .post(&format!("/admin/groups/{gid}"), &Value::Object(body))
            .await
    }

    pub async fn delete(&self, gid: &str) -> Result<Mutation> {
        self.api.delete(&format!("/admin/groups/{gid}")).await
    }

    pub async fn add_users(&self, gid: &str, user_uuids: &[String]) -> Result<Mutation> {
        let body = json!({ "user_uuids": user_uuids });
        self.api
            .post(&format!("/admin/groups/{gid}/add-users"), &body)
            .await
    }

    pub async fn remove_users(&self, gid: &str, user_uuids: &[String]) -> Result<Mutation> {
        let body = json!({ "user_uuids": user_uuids });
        self.api
            .post(&format!("/admin/groups/{gid}/remove-users"), &body)
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStatus {
    pub status: String,
    pub active_sessions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Manager lifecycle and announcement calls.
pub struct ManagerClient<'a> {
    api: &'a ApiSession,
}

impl ManagerClient<'_> {
    pub async fn status(&self) -> Result<ManagerStatus> {
        self.api.get("/manager/status").await
    }

    pub async fn freeze(&self, force_kill: bool) -> Result<()> {
        let body = json!({ "force_kill": force_kill });
        let _: Value = self.api.post("/manager/freeze", &body).await?;
        Ok(())
    }

    pub async fn unfreeze(&self) -> Result<()> {
        let _: Value = self.api.post("/manager/unfreeze", &json!({})).await?;
        Ok(())
    }

    pub async fn get_announcement(&self) -> Result<Announcement> {
        self.api.get("/manager/announcement").await
    }

    pub async fn update_announcement(&self, enabled: bool, message: Option<&str>) -> Result<()> {
        let body = json!({ "enabled": enabled, "message": message });
        let _: Value = self.api.post("/manager/announcement", &body).await?;
        Ok(())
    }

    /// Generic scheduler operation: `"include-agents"` or `"exclude-agents"`.
    pub async fn scheduler_op(&self, op: &str, agent_ids: &[String]) -> Result<()> {
        let body = json!({ "agent_ids": agent_ids });
        let _: Value = self
            .api
            .post(&format!("/manager/scheduler/{op}"), &body)
            .await?;
        Ok(())
    }
}

/// Generic structured-query execution against the admin endpoint.
pub struct AdminClient<'a> {
    api: &'a ApiSession,
}

impl AdminClient<'_> {
    pub async fn query(&self, query: &str, variables: &Value) -> Result<Value> {
        let body = json!({ "query": query, "variables": variables });
        self.api.post("/admin/graphql", &body).await
    }
}

/// Aggregate resource-usage queries. Only served on "session" endpoints.
pub struct ResourceClient<'a> {
    api: &'a ApiSession,
}

impl ResourceClient<'_> {
    pub async fn get_available_resources(
        &self,
        scaling_group: &str,
        group: &str,
    ) -> Result<Value> {
        let path = format!("/resource/available?scaling_group={scaling_group}&group={group}");
        self.api.get(&path).await
    }
}
