//! HTTP client for the cafe REST API

use crate::api::CafeApi;
use crate::error::{ClientError, Result};
use crate::forms::{MenuSubmission, NewsSubmission, PendingUpload};
use async_trait::async_trait;
use cafe_core::{CategoryId, MenuCategory, MenuItem, MenuItemId, NewsId, NewsItem};
use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Serialize)]
struct SortOrderBody {
    sort_order: i32,
}

/// API client for making HTTP requests to the cafe API server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (without `/api`)
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Server root, used to resolve `/uploads/` paths
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status.canonical_reason().unwrap_or("Request failed").to_string();
        let (message, details) = match response.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.details),
            Err(_) => (fallback, None),
        };
        warn!("API returned {}: {}", status, message);
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
            details,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ClientError::Encode(e.to_string()))
}

fn image_parts(mut form: Form, existing: &[String], uploads: &[PendingUpload]) -> Result<Form> {
    let existing = encode_json(existing)?;
    form = form.text("existingImages", existing);
    for upload in uploads {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        form = form.part("images", part);
    }
    Ok(form)
}

fn menu_form(item: &MenuSubmission) -> Result<Form> {
    let draft = &item.draft;
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("price", draft.price.to_string())
        .text("category", draft.category.clone());
    if let Some(calories) = draft.calories {
        form = form.text("calories", calories.to_string());
    }
    if let Some(description) = &draft.description {
        form = form.text("description", description.clone());
    }
    image_parts(form, &item.existing_images, &item.uploads)
}

fn news_form(item: &NewsSubmission) -> Result<Form> {
    let draft = &item.draft;
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("postedAt", draft.posted_at.to_rfc3339());
    if let Some(preview) = &draft.preview {
        form = form.text("preview", preview.clone());
    }
    if let Some(description) = &draft.description {
        form = form.text("description", description.clone());
    }
    image_parts(form, &item.existing_images, &item.uploads)
}

#[async_trait]
impl CafeApi for ApiClient {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>> {
        self.get_json(self.client.get(self.url("/menu"))).await
    }

    async fn fetch_menu_item(&self, id: MenuItemId) -> Result<MenuItem> {
        self.get_json(self.client.get(self.url(&format!("/menu/{id}"))))
            .await
    }

    async fn fetch_admin_menu(&self, token: &str) -> Result<Vec<MenuItem>> {
        self.get_json(self.client.get(self.url("/admin/menu")).bearer_auth(token))
            .await
    }

    async fn create_menu_item(&self, token: &str, item: &MenuSubmission) -> Result<MenuItem> {
        let form = menu_form(item)?;
        debug!(title = %item.draft.title, uploads = item.uploads.len(), "Creating menu item");
        self.get_json(
            self.client
                .post(self.url("/admin/menu"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn update_menu_item(
        &self,
        token: &str,
        id: MenuItemId,
        item: &MenuSubmission,
    ) -> Result<()> {
        let form = menu_form(item)?;
        debug!(id, uploads = item.uploads.len(), "Updating menu item");
        Self::send(
            self.client
                .put(self.url(&format!("/admin/menu/{id}")))
                .bearer_auth(token)
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn delete_menu_item(&self, token: &str, id: MenuItemId) -> Result<()> {
        Self::send(
            self.client
                .delete(self.url(&format!("/admin/menu/{id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    async fn fetch_categories(&self) -> Result<Vec<MenuCategory>> {
        self.get_json(self.client.get(self.url("/menu-categories")))
            .await
    }

    async fn update_category_sort_order(
        &self,
        token: &str,
        id: CategoryId,
        sort_order: i32,
    ) -> Result<()> {
        Self::send(
            self.client
                .put(self.url(&format!("/menu-categories/{id}/sort-order")))
                .bearer_auth(token)
                .json(&SortOrderBody { sort_order }),
        )
        .await?;
        Ok(())
    }

    async fn delete_category(&self, token: &str, id: CategoryId) -> Result<()> {
        Self::send(
            self.client
                .delete(self.url(&format!("/admin/menu-categories/{id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
        self.get_json(self.client.get(self.url("/news"))).await
    }

    async fn fetch_news_item(&self, id: NewsId) -> Result<NewsItem> {
        self.get_json(self.client.get(self.url(&format!("/news/{id}"))))
            .await
    }

    async fn fetch_admin_news(&self, token: &str) -> Result<Vec<NewsItem>> {
        self.get_json(self.client.get(self.url("/admin/news")).bearer_auth(token))
            .await
    }

    async fn create_news_item(&self, token: &str, item: &NewsSubmission) -> Result<NewsItem> {
        let form = news_form(item)?;
        self.get_json(
            self.client
                .post(self.url("/admin/news"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn update_news_item(
        &self,
        token: &str,
        id: NewsId,
        item: &NewsSubmission,
    ) -> Result<()> {
        let form = news_form(item)?;
        Self::send(
            self.client
                .put(self.url(&format!("/admin/news/{id}")))
                .bearer_auth(token)
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn delete_news_item(&self, token: &str, id: NewsId) -> Result<()> {
        Self::send(
            self.client
                .delete(self.url(&format!("/admin/news/{id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    async fn login(&self, password: &str) -> Result<String> {
        let body: TokenBody = self
            .get_json(
                self.client
                    .post(self.url("/login"))
                    .json(&LoginBody { password }),
            )
            .await?;
        Ok(body.token)
    }

    async fn logout(&self) -> Result<()> {
        Self::send(self.client.post(self.url("/logout"))).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_core::MenuItemDraft;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn menu_json() -> Value {
        json!([{
            "id": 1,
            "title": "Latte",
            "price": 250,
            "imageURLs": ["/uploads/a.png"],
            "category": "napitki",
            "createdAt": "2025-01-01T10:00:00Z",
            "updatedAt": "2025-01-01T10:00:00Z"
        }])
    }

    #[tokio::test]
    async fn test_fetch_menu() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/menu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(menu_json()))
            .mount(&server)
            .await;

        let client = ApiClient::new(format!("{}/", server.uri())).unwrap();
        let menu = client.fetch_menu().await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].image_urls, vec!["/uploads/a.png"]);
        assert_eq!(menu[0].calories, None);
    }

    #[tokio::test]
    async fn test_login_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(json!({ "password": "barista" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/news"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let token = client.login("barista").await.unwrap();
        assert_eq!(token, "t0k");
        assert!(client.fetch_admin_news(&token).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/menu-categories/3"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "Category \"Напитки\" is used by menu items",
                "code": "CATEGORY_IN_USE",
                "details": { "items": ["Latte"] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.delete_category("t", 3).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.conflict_items(), vec!["Latte"]);

        let err = client.logout().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[tokio::test]
    async fn test_create_menu_item_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/menu"))
            .and(header("authorization", "Bearer t"))
            .and(body_string_contains("name=\"existingImages\""))
            .and(body_string_contains("[\"/uploads/a.png\"]"))
            .and(body_string_contains("filename=\"b.png\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(menu_json()[0].clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let submission = MenuSubmission {
            draft: MenuItemDraft {
                title: "Latte".to_string(),
                price: 250.0,
                calories: None,
                description: None,
                category: "Напитки".to_string(),
            },
            existing_images: vec!["/uploads/a.png".to_string()],
            uploads: vec![PendingUpload {
                file_name: "b.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: b"png".to_vec(),
            }],
        };
        let created = client.create_menu_item("t", &submission).await.unwrap();
        assert_eq!(created.id, 1);
    }

    #[test]
    fn test_request_encoding_failure_is_not_a_decode_error() {
        let keyed_by_tuple = std::collections::BTreeMap::from([((1, 2), 3)]);
        let err = encode_json(&keyed_by_tuple).unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
        assert!(!err.is_network());

        assert_eq!(
            encode_json(&["/uploads/a.png".to_string()]).unwrap(),
            r#"["/uploads/a.png"]"#
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client.fetch_news().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
