use super::client::{path_segment, ApiRequest};
use super::session::SessionManager;
use super::store::{decode_list, Collection};
use super::{Gig, GigPatch, NewGig};
use crate::errors::GigzError;
use std::sync::Arc;
use tokio::sync::watch;

/// Local mirror of `/gigs`, plus the "my gigs" view of the logged-in seller.
pub struct GigStore {
    session: Arc<SessionManager>,
    gigs: Collection<Gig>,
    my_gigs: Collection<Gig>,
}

impl GigStore {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            gigs: Collection::new(),
            my_gigs: Collection::new(),
        }
    }

    pub fn gigs(&self) -> Vec<Gig> {
        self.gigs.snapshot()
    }

    /// Gigs owned by the current session's user.
    pub fn my_gigs(&self) -> Vec<Gig> {
        self.my_gigs.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Gig>> {
        self.gigs.subscribe()
    }

    pub fn subscribe_mine(&self) -> watch::Receiver<Vec<Gig>> {
        self.my_gigs.subscribe()
    }

    /// Replaces the local list with the server's. On failure the last known list is kept.
    pub async fn fetch_all(&self) {
        match self.fetch_list().await {
            Ok(gigs) => self.gigs.replace_all(gigs),
            Err(err) => tracing::warn!("failed to fetch gigs, keeping cached list: {}", err),
        }
    }

    /// Rebuilds "my gigs" from the server. An anonymous session has no gigs.
    pub async fn fetch_mine(&self) {
        let Some(owner) = self.owner_id() else {
            self.my_gigs.replace_all(Vec::new());
            return;
        };

        match self.fetch_list().await {
            Ok(gigs) => self.my_gigs.replace_all(
                gigs.into_iter()
                    .filter(|gig| gig.seller_id == owner)
                    .collect(),
            ),
            Err(err) => tracing::warn!("failed to fetch my gigs, keeping cached list: {}", err),
        }
    }

    /// Fetches one gig without touching the local lists.
    pub async fn get(&self, id: &str) -> Option<Gig> {
        match self
            .session
            .with_auth(ApiRequest::get(&format!("/gigs/{}", path_segment(id))))
            .await
        {
            Ok(gig) => Some(gig),
            Err(err) => {
                tracing::warn!(id, "failed to fetch gig: {}", err);
                None
            }
        }
    }

    pub async fn create(&self, new_gig: &NewGig) -> Result<Gig, GigzError> {
        new_gig.validate()?;

        let request = ApiRequest::post("/gigs").json(new_gig)?;
        let gig: Gig = self.session.with_auth(request).await?;

        self.gigs.push(gig.clone());
        if self.is_mine(&gig) {
            self.my_gigs.push(gig.clone());
        }

        Ok(gig)
    }

    pub async fn update(&self, id: &str, patch: &GigPatch) -> Result<Gig, GigzError> {
        patch.validate()?;

        let request = ApiRequest::put(&format!("/gigs/{}", path_segment(id))).json(patch)?;
        let gig: Gig = self.session.with_auth(request).await?;

        // my_gigs stays a subset of gigs
        let listed = self.gigs.replace(id, gig.clone());
        if listed && self.is_mine(&gig) {
            if !self.my_gigs.replace(id, gig.clone()) {
                self.my_gigs.push(gig.clone());
            }
        } else {
            self.my_gigs.remove(id);
        }

        Ok(gig)
    }

    pub async fn remove(&self, id: &str) -> Result<(), GigzError> {
        self.session
            .with_auth_raw(ApiRequest::delete(&format!("/gigs/{}", path_segment(id))))
            .await?;

        self.gigs.remove(id);
        self.my_gigs.remove(id);
        Ok(())
    }

    async fn fetch_list(&self) -> Result<Vec<Gig>, GigzError> {
        self.session
            .with_auth_raw(ApiRequest::get("/gigs"))
            .await
            .and_then(decode_list)
    }

    /// Id of the session user, if there is one with a usable id.
    fn owner_id(&self) -> Option<String> {
        self.session
            .current_user()
            .map(|user| user.id)
            .filter(|id| !id.is_empty())
    }

    fn is_mine(&self, gig: &Gig) -> bool {
        self.owner_id().is_some_and(|owner| owner == gig.seller_id)
    }
}
