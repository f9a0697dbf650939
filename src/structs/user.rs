use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{path_segment, ApiRequest};
use super::session::SessionManager;
use crate::errors::GigzError;

/// User object which gets returned from `login()` and the user lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server id. Empty when the record came back without one.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub username: String,
    pub email: String,
    pub country: String,
    /// Avatar of the user. This can either be an image URL or null.
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Short bio shown on the seller profile.
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub is_seller: bool,
}

/// Registration payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub is_seller: bool,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_seller: Option<bool>,
}

impl SessionManager {
    /// Creates an account. Does not log in.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, GigzError> {
        let request = ApiRequest::post("/users").json(new_user)?;
        self.client.api_call(request).await
    }

    /// Looks a user up by email, e.g. to show the seller of a gig.
    pub async fn lookup_user(&self, email: &str) -> Result<User, GigzError> {
        self.with_auth(ApiRequest::get(&format!("/users/{}", path_segment(email))))
            .await
    }

    /// Updates the logged-in user's profile and swaps the session user for the server's copy.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, GigzError> {
        let path = self.own_user_path()?;

        let request = ApiRequest::put(&path).json(patch)?;
        let user: User = self.with_auth(request).await?;

        self.replace_user(user.clone());
        Ok(user)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), GigzError> {
        let path = self.own_user_path()?;

        let request = ApiRequest::put(&format!("{}/password", path)).json(&json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        }))?;
        self.with_auth_raw(request).await.map(|_| ())
    }

    /// Deletes the logged-in user's account, then logs out.
    pub async fn delete_account(&self) -> Result<(), GigzError> {
        let path = self.own_user_path()?;

        self.with_auth_raw(ApiRequest::delete(&path)).await?;

        self.logout().await;
        Ok(())
    }

    /// `/users/{id}` of the logged-in user.
    fn own_user_path(&self) -> Result<String, GigzError> {
        let user = self.current_user().ok_or(GigzError::SessionExpired)?;
        if user.id.is_empty() {
            return Err(GigzError::ValidationError(
                "the session user record has no id".to_string(),
            ));
        }

        Ok(format!("/users/{}", path_segment(&user.id)))
    }
}
