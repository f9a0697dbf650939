use super::client::{path_segment, ApiRequest};
use super::session::SessionManager;
use super::store::{decode_list, Collection};
use super::{NewOrder, Order, OrderStatus};
use crate::errors::GigzError;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// A view of orders fetched for one party, remembering who it was fetched for.
#[derive(Debug, Default)]
struct PartyView {
    orders: Collection<Order>,
    fetched_for: Mutex<Option<String>>,
}

impl PartyView {
    fn fetched_for(&self) -> Option<String> {
        self.fetched_for
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_all(&self, party_id: &str, orders: Vec<Order>) {
        *self.fetched_for.lock().unwrap_or_else(PoisonError::into_inner) = Some(party_id.to_string());
        self.orders.replace_all(orders);
    }
}

/// Local mirror of `/orders`, with separately fetched buyer and seller views.
///
/// A new order only shows up in the buyer (seller) view when that view was last fetched for
/// the order's buyer (seller). Fetch the view for an identity before relying on it.
pub struct OrderStore {
    session: Arc<SessionManager>,
    all: Collection<Order>,
    buyer: PartyView,
    seller: PartyView,
}

impl OrderStore {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            all: Collection::new(),
            buyer: PartyView::default(),
            seller: PartyView::default(),
        }
    }

    pub fn all_orders(&self) -> Vec<Order> {
        self.all.snapshot()
    }

    pub fn buyer_orders(&self) -> Vec<Order> {
        self.buyer.orders.snapshot()
    }

    pub fn seller_orders(&self) -> Vec<Order> {
        self.seller.orders.snapshot()
    }

    pub fn subscribe_all(&self) -> watch::Receiver<Vec<Order>> {
        self.all.subscribe()
    }

    pub fn subscribe_buyer(&self) -> watch::Receiver<Vec<Order>> {
        self.buyer.orders.subscribe()
    }

    pub fn subscribe_seller(&self) -> watch::Receiver<Vec<Order>> {
        self.seller.orders.subscribe()
    }

    /// The buyer id the buyer view was last fetched for.
    pub fn buyer_view_owner(&self) -> Option<String> {
        self.buyer.fetched_for()
    }

    /// The seller id the seller view was last fetched for.
    pub fn seller_view_owner(&self) -> Option<String> {
        self.seller.fetched_for()
    }

    pub async fn fetch_all(&self) {
        match self.fetch_list("/orders").await {
            Ok(orders) => self.all.replace_all(orders),
            Err(err) => tracing::warn!("failed to fetch all orders, keeping cached list: {}", err),
        }
    }

    pub async fn fetch_for_buyer(&self, buyer_id: &str) {
        match self.fetch_list(&format!("/orders/buyer/{}", path_segment(buyer_id))).await {
            Ok(orders) => self.buyer.replace_all(buyer_id, orders),
            Err(err) => tracing::warn!(buyer_id, "failed to fetch buyer orders, keeping cached list: {}", err),
        }
    }

    pub async fn fetch_for_seller(&self, seller_id: &str) {
        match self.fetch_list(&format!("/orders/seller/{}", path_segment(seller_id))).await {
            Ok(orders) => self.seller.replace_all(seller_id, orders),
            Err(err) => tracing::warn!(seller_id, "failed to fetch seller orders, keeping cached list: {}", err),
        }
    }

    /// Fetches one order without touching the local lists.
    pub async fn get(&self, id: &str) -> Option<Order> {
        match self
            .session
            .with_auth(ApiRequest::get(&format!("/orders/{}", path_segment(id))))
            .await
        {
            Ok(order) => Some(order),
            Err(err) => {
                tracing::warn!(id, "failed to fetch order: {}", err);
                None
            }
        }
    }

    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, GigzError> {
        let request = ApiRequest::post("/orders").json(new_order)?;
        let order: Order = self.session.with_auth(request).await?;

        self.all.push(order.clone());
        if self.buyer.fetched_for().as_deref() == Some(order.buyer_id.as_str()) {
            self.buyer.orders.push(order.clone());
        }
        if self.seller.fetched_for().as_deref() == Some(order.seller_id.as_str()) {
            self.seller.orders.push(order.clone());
        }

        Ok(order)
    }

    /// Asks the server to move the order to `status` and mirrors whatever it answers.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, GigzError> {
        let path = format!("/orders/{}/status", path_segment(id));
        let request = ApiRequest::patch(&path).json(&json!({ "status": status }))?;
        let order: Order = self.session.with_auth(request).await?;

        self.replace_everywhere(id, &order);
        Ok(order)
    }

    pub async fn cancel(&self, id: &str) -> Result<Order, GigzError> {
        let order: Order = self
            .session
            .with_auth(ApiRequest::patch(&format!("/orders/{}/cancel", path_segment(id))))
            .await?;

        self.replace_everywhere(id, &order);
        Ok(order)
    }

    pub async fn remove(&self, id: &str) -> Result<(), GigzError> {
        self.session
            .with_auth_raw(ApiRequest::delete(&format!("/orders/{}", path_segment(id))))
            .await?;

        for collection in self.collections() {
            collection.remove(id);
        }
        Ok(())
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Order>, GigzError> {
        self.session
            .with_auth_raw(ApiRequest::get(path))
            .await
            .and_then(decode_list)
    }

    fn replace_everywhere(&self, id: &str, order: &Order) {
        for collection in self.collections() {
            collection.replace(id, order.clone());
        }
    }

    fn collections(&self) -> [&Collection<Order>; 3] {
        [&self.all, &self.buyer.orders, &self.seller.orders]
    }
}
