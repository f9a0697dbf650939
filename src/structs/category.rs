use super::client::{path_segment, ApiRequest};
use super::session::SessionManager;
use super::store::{decode_list, Collection};
use super::Category;
use crate::errors::GigzError;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

/// Local mirror of `/categories`.
///
/// Embedded `gigs` are whatever the server sent with the category; editing a gig through
/// `GigStore` does not touch them until the next fetch.
pub struct CategoryStore {
    session: Arc<SessionManager>,
    categories: Collection<Category>,
}

impl CategoryStore {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            categories: Collection::new(),
        }
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Category>> {
        self.categories.subscribe()
    }

    /// Replaces the local list with the server's. On failure the last known list is kept.
    pub async fn fetch_all(&self) {
        let result = self
            .session
            .with_auth_raw(ApiRequest::get("/categories"))
            .await
            .and_then(decode_list::<Category>);

        match result {
            Ok(categories) => self.categories.replace_all(categories),
            Err(err) => tracing::warn!("failed to fetch categories, keeping cached list: {}", err),
        }
    }

    /// Fetches one category without touching the local list.
    pub async fn get(&self, id: &str) -> Option<Category> {
        match self
            .session
            .with_auth(ApiRequest::get(&format!("/categories/{}", path_segment(id))))
            .await
        {
            Ok(category) => Some(category),
            Err(err) => {
                tracing::warn!(id, "failed to fetch category: {}", err);
                None
            }
        }
    }

    pub async fn create(&self, name: &str) -> Result<Category, GigzError> {
        let request = ApiRequest::post("/categories").json(&json!({ "name": name }))?;
        let category: Category = self.session.with_auth(request).await?;

        self.categories.push(category.clone());
        Ok(category)
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<Category, GigzError> {
        let path = format!("/categories/{}", path_segment(id));
        let request = ApiRequest::put(&path).json(&json!({ "name": name }))?;
        let category: Category = self.session.with_auth(request).await?;

        self.replace_local(id, category.clone());
        Ok(category)
    }

    pub async fn remove(&self, id: &str) -> Result<(), GigzError> {
        self.session
            .with_auth_raw(ApiRequest::delete(&format!("/categories/{}", path_segment(id))))
            .await?;

        self.categories.remove(id);
        Ok(())
    }

    /// Lists a gig under a category. The server's updated category replaces the local one.
    pub async fn add_gig(&self, category_id: &str, gig_id: &str) -> Result<Category, GigzError> {
        self.link("/categories/add-gig", category_id, gig_id).await
    }

    pub async fn remove_gig(&self, category_id: &str, gig_id: &str) -> Result<Category, GigzError> {
        self.link("/categories/remove-gig", category_id, gig_id)
            .await
    }

    async fn link(&self, path: &str, category_id: &str, gig_id: &str) -> Result<Category, GigzError> {
        let request = ApiRequest::post(path).json(&json!({
            "categoryId": category_id,
            "gigId": gig_id,
        }))?;
        let category: Category = self.session.with_auth(request).await?;

        self.replace_local(category_id, category.clone());
        Ok(category)
    }

    fn replace_local(&self, id: &str, category: Category) {
        self.categories.replace(id, category);
    }
}
