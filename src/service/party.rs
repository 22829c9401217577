//! Domain query service for the `/parties` resource family.
//!
//! Reads build a canonical request key and go through the response cache;
//! writes bypass the cache and invalidate the keys they affect. The
//! request key doubles as the request path, exactly what the server sees.

use std::sync::Arc;

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::cache::ResponseCache;
use crate::models::{BulkOutcome, Party, PartyDraft, PartyHistoryEntry, Stats};
use crate::notify::Notice;

/// Cache lifetimes per read class. Lists churn fastest; single resources
/// and aggregates tolerate a little more staleness.
const LIST_TTL_SECS: i64 = 30;
const RESOURCE_TTL_SECS: i64 = 60;
const STATS_TTL_SECS: i64 = 60;
const HISTORY_TTL_SECS: i64 = 300;

/// Percent-encode one query component (RFC 3986 unreserved set passes
/// through).
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Canonical request identity for a read: endpoint plus normalized query
/// string. Empty values are omitted and keys are sorted, so two logically
/// identical filter sets collide to the same key regardless of call-site
/// ordering.
pub fn request_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .copied()
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

    if pairs.is_empty() {
        return endpoint.to_string();
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    format!("{}?{}", endpoint, query.join("&"))
}

/// Advanced search parameters for `/parties`. Empty strings are treated
/// as "not set" and omitted from the request.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub place: String,
    pub phone: String,
    pub from_date: String,
    pub to_date: String,
    pub reminder: String,
    pub min_net_weight: Option<f64>,
    pub max_net_weight: Option<f64>,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: String,
    pub sort_order: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            place: String::new(),
            phone: String::new(),
            from_date: String::new(),
            to_date: String::new(),
            reminder: String::new(),
            min_net_weight: None,
            max_net_weight: None,
            limit: 100,
            offset: 0,
            sort_by: "createdAt".to_string(),
            sort_order: "desc".to_string(),
        }
    }
}

impl SearchParams {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("place", self.place.clone()),
            ("phone", self.phone.clone()),
            ("from", self.from_date.clone()),
            ("to", self.to_date.clone()),
            ("reminder", self.reminder.clone()),
        ];
        if let Some(min) = self.min_net_weight {
            params.push(("minNetWeight", min.to_string()));
        }
        if let Some(max) = self.max_net_weight {
            params.push(("maxNetWeight", max.to_string()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
        params.push(("sortBy", self.sort_by.clone()));
        params.push(("sortOrder", self.sort_order.clone()));
        params
    }
}

fn from_value<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Unexpected(format!("Failed to parse {}: {}", what, e)))
}

/// Store each mutated resource from an authoritative write response under
/// its single-resource key.
fn repopulate_mutated(cache: &ResponseCache, value: &Value) {
    let Value::Array(items) = value else {
        return;
    };
    for item in items {
        let id = item
            .get("_id")
            .or_else(|| item.get("id"))
            .and_then(Value::as_str);
        if let Some(id) = id {
            cache.put(&format!("/parties/{}", id), item.clone());
        }
    }
}

pub struct PartyService {
    client: ApiClient,
    cache: Arc<ResponseCache>,
}

impl PartyService {
    pub fn new(client: ApiClient, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Cached GET: the request key is also the request path.
    async fn cached_get(&self, key: String, ttl_secs: i64) -> Result<Value, ApiError> {
        let client = self.client.clone();
        let path = key.clone();
        self.cache
            .get_with(&key, Duration::seconds(ttl_secs), move || async move {
                client.get_value(&path).await
            })
            .await
    }

    fn require_id(id: &str) -> Result<(), ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::Unexpected("Party ID is required".to_string()));
        }
        Ok(())
    }

    // ===== Reads (through the cache) =====

    /// All parties, optionally filtered. Filter pairs with empty values
    /// are dropped during key normalization.
    pub async fn list_parties(&self, filters: &[(&str, &str)]) -> Result<Vec<Party>, ApiError> {
        let key = request_key("/parties", filters);
        let value = self.cached_get(key, LIST_TTL_SECS).await?;
        from_value(value, "party list")
    }

    pub async fn get_party(&self, id: &str) -> Result<Party, ApiError> {
        Self::require_id(id)?;
        let key = format!("/parties/{}", id);
        let value = self.cached_get(key, RESOURCE_TTL_SECS).await?;
        from_value(value, "party")
    }

    pub async fn party_history(&self, id: &str) -> Result<Vec<PartyHistoryEntry>, ApiError> {
        Self::require_id(id)?;
        let key = format!("/parties/{}/history", id);
        let value = self.cached_get(key, HISTORY_TTL_SECS).await?;
        from_value(value, "party history")
    }

    pub async fn search_parties(&self, params: &SearchParams) -> Result<Vec<Party>, ApiError> {
        let owned = params.to_params();
        let pairs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let key = request_key("/parties", &pairs);
        let value = self.cached_get(key, LIST_TTL_SECS).await?;
        from_value(value, "party search results")
    }

    /// Parties whose reminder is due.
    pub async fn due_reminders(&self) -> Result<Vec<Party>, ApiError> {
        let key = request_key("/parties", &[("reminder", "due")]);
        let value = self.cached_get(key, RESOURCE_TTL_SECS).await?;
        from_value(value, "due reminders")
    }

    pub async fn statistics(&self) -> Result<Stats, ApiError> {
        let value = self.cached_get("/stats".to_string(), STATS_TTL_SECS).await?;
        from_value(value, "statistics")
    }

    // ===== Writes (bypass the cache, then invalidate) =====

    pub async fn create_party(&self, draft: &PartyDraft) -> Result<Party, ApiError> {
        let party: Party = self.client.post("/parties", draft).await?;
        self.cache.invalidate(Some("parties"));
        debug!(id = %party.id, "party created");
        self.client
            .sink()
            .notify(Notice::success("Party created successfully"));
        Ok(party)
    }

    pub async fn update_party(&self, id: &str, draft: &PartyDraft) -> Result<Party, ApiError> {
        Self::require_id(id)?;
        let party: Party = self.client.put(&format!("/parties/{}", id), draft).await?;
        self.cache.invalidate(Some("parties"));
        self.cache.invalidate(Some(&format!("/parties/{}", id)));
        self.client
            .sink()
            .notify(Notice::success("Party updated successfully"));
        Ok(party)
    }

    pub async fn delete_party(&self, id: &str) -> Result<Value, ApiError> {
        Self::require_id(id)?;
        let response: Value = self.client.delete(&format!("/parties/{}", id)).await?;
        self.cache.invalidate(Some("parties"));
        self.cache.invalidate(Some(&format!("/parties/{}", id)));
        self.client
            .sink()
            .notify(Notice::success("Party deleted successfully"));
        Ok(response)
    }

    /// Apply `data` to every party in `ids`. When the server echoes the
    /// mutated resources, they repopulate the single-resource cache keys.
    pub async fn bulk_update(
        &self,
        ids: &[String],
        data: &PartyDraft,
    ) -> Result<BulkOutcome, ApiError> {
        let body = serde_json::json!({ "ids": ids, "data": data });
        let value: Value = self.client.post("/parties/bulk-update", &body).await?;
        self.cache.invalidate(Some("parties"));
        repopulate_mutated(&self.cache, &value);
        from_value(value, "bulk update outcome")
    }

    pub async fn bulk_delete(&self, ids: &[String]) -> Result<BulkOutcome, ApiError> {
        let body = serde_json::json!({ "ids": ids });
        let value: Value = self.client.post("/parties/bulk-delete", &body).await?;
        self.cache.invalidate(Some("parties"));
        from_value(value, "bulk delete outcome")
    }

    /// Server-side export artifact; never cached.
    pub async fn export_parties(
        &self,
        format: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<u8>, ApiError> {
        let mut params: Vec<(&str, &str)> = filters.to_vec();
        params.push(("format", format));
        let path = request_key("/parties/export", &params);
        self.client.get_bytes(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_key_is_order_independent() {
        let a = request_key("/parties", &[("place", "Salem"), ("limit", "10")]);
        let b = request_key("/parties", &[("limit", "10"), ("place", "Salem")]);
        assert_eq!(a, b);
        assert_eq!(a, "/parties?limit=10&place=Salem");
    }

    #[test]
    fn test_request_key_omits_empty_values() {
        let key = request_key("/parties", &[("place", ""), ("phone", "  "), ("q", "acme")]);
        assert_eq!(key, "/parties?q=acme");

        let bare = request_key("/parties", &[("place", "")]);
        assert_eq!(bare, "/parties");
    }

    #[test]
    fn test_request_key_encodes_reserved_characters() {
        let key = request_key("/parties", &[("q", "a b&c=d")]);
        assert_eq!(key, "/parties?q=a%20b%26c%3Dd");
    }

    #[test]
    fn test_search_params_defaults() {
        let owned = SearchParams::default().to_params();
        let pairs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let key = request_key("/parties", &pairs);
        assert_eq!(
            key,
            "/parties?limit=100&offset=0&sortBy=createdAt&sortOrder=desc"
        );
    }

    #[test]
    fn test_search_params_net_weight_bounds() {
        let params = SearchParams {
            min_net_weight: Some(100.0),
            max_net_weight: Some(250.5),
            ..Default::default()
        };
        let owned = params.to_params();
        assert!(owned
            .iter()
            .any(|(k, v)| *k == "minNetWeight" && v == "100"));
        assert!(owned
            .iter()
            .any(|(k, v)| *k == "maxNetWeight" && v == "250.5"));
    }

    #[test]
    fn test_repopulate_mutated_stores_single_resource_keys() {
        let cache = ResponseCache::new();
        let response = json!([
            {"_id": "1", "partyName": "A"},
            {"_id": "2", "partyName": "B"},
            {"partyName": "no id, skipped"}
        ]);
        repopulate_mutated(&cache, &response);
        assert_eq!(cache.len(), 2);

        // A non-array outcome repopulates nothing
        let cache = ResponseCache::new();
        repopulate_mutated(&cache, &json!({"modifiedCount": 2}));
        assert!(cache.is_empty());
    }
}
