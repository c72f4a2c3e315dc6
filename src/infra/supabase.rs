use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use tracing::debug;

use crate::config::BackendConfig;
use crate::domain::ticket::{Ticket, TicketChanges, TicketFields, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::TicketStore;

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "Prefer";

/// Gateway to a hosted Supabase project's REST interface for one table.
pub struct SupabaseClient {
    http: Client,
    config: BackendConfig,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn api_details(&self) -> AppResult<(&str, &str)> {
        let base_url = self.config.base_url.as_deref().ok_or_else(|| {
            AppError::Configuration("backend URL not configured".to_string())
        })?;
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("backend API key not configured".to_string())
        })?;
        Ok((base_url, api_key))
    }

    fn collection_endpoint(base_url: &str, table: &str) -> AppResult<Url> {
        let raw = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);
        Url::parse(&raw)
            .map_err(|err| AppError::Configuration(format!("invalid backend URL '{raw}': {err}")))
    }

    fn select_url(base_url: &str, table: &str) -> AppResult<Url> {
        let mut url = Self::collection_endpoint(base_url, table)?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    fn record_url(base_url: &str, table: &str, id: &TicketId) -> AppResult<Url> {
        let mut url = Self::collection_endpoint(base_url, table)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id.as_str()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> AppResult<RequestBuilder> {
        let (_, api_key) = self.api_details()?;
        debug!(%method, %url, "backend request");
        Ok(self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, api_key)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json"))
    }

    async fn send(request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Backend(format!("failed to {action}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Backend(format!(
                "backend responded with {status} while trying to {action}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl TicketStore for SupabaseClient {
    async fn select_all(&self) -> AppResult<Vec<Ticket>> {
        let (base_url, _) = self.api_details()?;
        let url = Self::select_url(base_url, &self.config.table)?;
        let response = Self::send(self.request(Method::GET, url)?, "fetch tickets").await?;

        response
            .json::<Vec<Ticket>>()
            .await
            .map_err(|err| AppError::Backend(format!("failed to parse ticket list: {err}")))
    }

    async fn insert_one(&self, fields: &TicketFields) -> AppResult<Ticket> {
        let (base_url, _) = self.api_details()?;
        let url = Self::collection_endpoint(base_url, &self.config.table)?;
        let request = self
            .request(Method::POST, url)?
            .header(PREFER_HEADER, "return=representation")
            .json(&[fields]);
        let response = Self::send(request, "insert ticket").await?;

        let mut rows = response
            .json::<Vec<Ticket>>()
            .await
            .map_err(|err| AppError::Backend(format!("failed to parse inserted ticket: {err}")))?;
        if rows.is_empty() {
            return Err(AppError::Backend(
                "backend returned no row for the inserted ticket".to_string(),
            ));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update_by_id(&self, id: &TicketId, changes: &TicketChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::Validation(
                "update must change at least one field".to_string(),
            ));
        }
        let (base_url, _) = self.api_details()?;
        let url = Self::record_url(base_url, &self.config.table, id)?;
        let request = self.request(Method::PATCH, url)?.json(changes);
        Self::send(request, &format!("update ticket {id}")).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &TicketId) -> AppResult<()> {
        let (base_url, _) = self.api_details()?;
        let url = Self::record_url(base_url, &self.config.table, id)?;
        Self::send(
            self.request(Method::DELETE, url)?,
            &format!("delete ticket {id}"),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::{Priority, Status};

    fn configured() -> SupabaseClient {
        SupabaseClient::new(BackendConfig {
            base_url: Some("https://abc.supabase.co/".to_string()),
            api_key: Some("anon-key".to_string()),
            table: "Tickets".to_string(),
        })
    }

    #[test]
    fn builds_collection_urls() {
        let select = SupabaseClient::select_url("https://abc.supabase.co/", "Tickets").unwrap();
        assert_eq!(
            select.as_str(),
            "https://abc.supabase.co/rest/v1/Tickets?select=*"
        );

        let record =
            SupabaseClient::record_url("https://abc.supabase.co", "Tickets", &TicketId::new("17"))
                .unwrap();
        assert_eq!(
            record.as_str(),
            "https://abc.supabase.co/rest/v1/Tickets?id=eq.17"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = SupabaseClient::collection_endpoint("not a url", "Tickets").unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn requests_carry_key_headers() {
        let client = configured();
        let url = SupabaseClient::select_url("https://abc.supabase.co", "Tickets").unwrap();
        let request = client
            .request(Method::GET, url)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.headers()[API_KEY_HEADER], "anon-key");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer anon-key");
        assert_eq!(request.method(), &Method::GET);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let client = SupabaseClient::new(BackendConfig {
            base_url: Some("https://abc.supabase.co".to_string()),
            api_key: None,
            table: "Tickets".to_string(),
        });

        let err = client.select_all().await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn empty_update_is_rejected_locally() {
        let err = configured()
            .update_by_id(&TicketId::new("1"), &TicketChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn insert_payload_is_an_array_of_one_record() {
        let fields = TicketFields {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            title: "Printer jam".to_string(),
            description: "Paper stuck".to_string(),
            priority: Priority::Medium,
            status: Status::Open,
        };
        let body = serde_json::to_value([&fields]).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{
                "name": "Ada",
                "email": "ada@example.com",
                "title": "Printer jam",
                "description": "Paper stuck",
                "priority": "Medium",
                "status": "Open"
            }])
        );
    }
}
