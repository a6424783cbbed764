//! Order service: placing orders and driving their status lifecycle.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::AuthUser;
use crate::domain::{
    Order, OrderFilter, OrderId, OrderRequest, OrderStatus, OrderUpdate, ServiceId, UserId,
};
use crate::error::HubError;
use crate::persistence::{MarketStore, clamp_limit};

use super::ensure_account;

/// Attempts at drawing a fresh order number after a collision.
const ORDER_NUMBER_RETRIES: u32 = 3;

/// Which side of the orders to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderRole {
    /// Orders the caller bought.
    #[default]
    Buyer,
    /// Orders placed on the caller's listings.
    Seller,
}

impl std::str::FromStr for OrderRole {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(HubError::InvalidRequest(format!(
                "role must be buyer or seller, got {other:?}"
            ))),
        }
    }
}

/// Order placement, access and lifecycle.
#[derive(Debug, Clone)]
pub struct OrderService {
    store: Arc<dyn MarketStore>,
}

impl OrderService {
    /// Creates a new `OrderService`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Places a pending order for the caller on an active listing.
    ///
    /// Title, price and seller are copied from the listing; the due date is
    /// the listing's delivery time from now.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ServiceNotFound`] for unknown or inactive
    /// listings and [`HubError::InvalidRequest`] when buyers order from
    /// themselves or the due date cannot be computed.
    pub async fn place_order(
        &self,
        caller: &AuthUser,
        service_id: ServiceId,
        request: OrderRequest,
    ) -> Result<Order, HubError> {
        let service = self
            .store
            .get_service(service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| HubError::ServiceNotFound(service_id.to_string()))?;
        if service.seller_id == caller.id {
            return Err(HubError::InvalidRequest(
                "cannot order your own service".to_string(),
            ));
        }

        ensure_account(self.store.as_ref(), caller).await?;
        let mut attempt = 0;
        let order = loop {
            let draft = Order::place(&service, caller.id.clone(), request.clone(), Utc::now())
                .ok_or_else(|| {
                    HubError::InvalidRequest("delivery time is out of range".to_string())
                })?;
            match self.store.create_order(draft).await {
                // Order numbers carry millisecond precision; retry in the next tick.
                Err(HubError::Conflict(_)) if attempt < ORDER_NUMBER_RETRIES => {
                    attempt += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                }
                result => break result?,
            }
        };
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            buyer_id = %order.buyer_id,
            seller_id = %order.seller_id,
            price = %order.price,
            "order placed"
        );
        Ok(order)
    }

    /// Fetches an order the caller takes part in.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::OrderNotFound`] or [`HubError::Forbidden`] for
    /// outsiders.
    pub async fn get_order(&self, caller: &UserId, id: OrderId) -> Result<Order, HubError> {
        let order = self.load(id).await?;
        if !order.is_participant(caller) {
            return Err(HubError::Forbidden("not a participant of this order".to_string()));
        }
        Ok(order)
    }

    /// Lists the caller's orders from one side.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_orders(
        &self,
        caller: &UserId,
        role: OrderRole,
        status: Option<OrderStatus>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Order>, HubError> {
        let mut filter = OrderFilter {
            status,
            limit: Some(clamp_limit(limit)),
            offset,
            ..OrderFilter::default()
        };
        match role {
            OrderRole::Buyer => filter.buyer_id = Some(caller.clone()),
            OrderRole::Seller => filter.seller_id = Some(caller.clone()),
        }
        self.store.list_orders(&filter).await
    }

    /// Applies the seller's changes to an order.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::OrderNotFound`], [`HubError::Forbidden`] for
    /// anyone but the seller, or [`HubError::InvalidTransition`] when the
    /// requested status is not reachable from the current one.
    pub async fn update_order(
        &self,
        caller: &UserId,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Order, HubError> {
        let order = self.load(id).await?;
        if &order.seller_id != caller {
            return Err(HubError::Forbidden("only the seller may update an order".to_string()));
        }
        if let Some(next) = update.status {
            if !order.status.can_transition_to(next) {
                return Err(HubError::InvalidTransition {
                    from: order.status.to_string(),
                    to: next.to_string(),
                });
            }
        }

        let updated = self
            .store
            .update_order(id, update)
            .await?
            .ok_or_else(|| HubError::OrderNotFound(*id.as_uuid()))?;
        tracing::info!(
            order_id = %id,
            from = %order.status,
            to = %updated.status,
            "order updated"
        );
        Ok(updated)
    }

    async fn load(&self, id: OrderId) -> Result<Order, HubError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| HubError::OrderNotFound(*id.as_uuid()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::auth::Claims;
    use crate::domain::service::slugify;
    use crate::domain::{NewService, Service, UserRole};
    use crate::persistence::MemoryStore;

    pub(crate) fn caller(id: &str) -> AuthUser {
        AuthUser::from_claims(Claims::new(id, chrono::Duration::hours(1)).with_role(UserRole::User))
    }

    pub(crate) async fn seeded_listing(store: &Arc<dyn MarketStore>, seller: &str) -> Service {
        let service = NewService {
            title: "Landing page".to_string(),
            slug: slugify("Landing page"),
            description: "One responsive page".to_string(),
            short_description: None,
            price: Decimal::new(25000, 2),
            delivery_time: 5,
            revisions: 2,
            category: "web".to_string(),
            subcategory: None,
            featured_image: None,
            gallery: Vec::new(),
            requirements: None,
            seller_id: UserId::new(seller),
        }
        .into_service(Utc::now());
        let Ok(service) = store.create_service(service).await else {
            panic!("seed failed");
        };
        service
    }

    fn setup() -> (Arc<dyn MarketStore>, OrderService) {
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        let orders = OrderService::new(Arc::clone(&store));
        (store, orders)
    }

    #[tokio::test]
    async fn place_copies_listing_terms() {
        let (store, orders) = setup();
        let listing = seeded_listing(&store, "seller").await;
        let Ok(order) = orders
            .place_order(&caller("buyer"), listing.id, OrderRequest::default())
            .await
        else {
            panic!("place failed");
        };
        assert_eq!(order.seller_id, UserId::new("seller"));
        assert_eq!(order.price, listing.price);
        assert_eq!(order.title, listing.title);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ALP-"));
    }

    #[tokio::test]
    async fn cannot_order_own_or_inactive_listing() {
        let (store, orders) = setup();
        let listing = seeded_listing(&store, "seller").await;
        assert!(matches!(
            orders
                .place_order(&caller("seller"), listing.id, OrderRequest::default())
                .await,
            Err(HubError::InvalidRequest(_))
        ));
        if store.deactivate_service(listing.id).await.is_err() {
            panic!("deactivate failed");
        }
        assert!(matches!(
            orders
                .place_order(&caller("buyer"), listing.id, OrderRequest::default())
                .await,
            Err(HubError::ServiceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_due_date_is_a_bad_request() {
        let (store, orders) = setup();
        let mut listing = seeded_listing(&store, "seller").await;
        listing.id = ServiceId::new();
        listing.slug = slugify("Forever");
        listing.delivery_time = i32::MAX;
        let Ok(listing) = store.create_service(listing).await else {
            panic!("seed failed");
        };
        assert!(matches!(
            orders
                .place_order(&caller("buyer"), listing.id, OrderRequest::default())
                .await,
            Err(HubError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn outsiders_cannot_read_orders() {
        let (store, orders) = setup();
        let listing = seeded_listing(&store, "seller").await;
        let Ok(order) = orders
            .place_order(&caller("buyer"), listing.id, OrderRequest::default())
            .await
        else {
            panic!("place failed");
        };
        assert!(orders.get_order(&UserId::new("buyer"), order.id).await.is_ok());
        assert!(orders.get_order(&UserId::new("seller"), order.id).await.is_ok());
        assert!(matches!(
            orders.get_order(&UserId::new("stranger"), order.id).await,
            Err(HubError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn lifecycle_is_enforced_for_seller_only() {
        let (store, orders) = setup();
        let listing = seeded_listing(&store, "seller").await;
        let Ok(order) = orders
            .place_order(&caller("buyer"), listing.id, OrderRequest::default())
            .await
        else {
            panic!("place failed");
        };
        let seller = UserId::new("seller");
        let to = |status| OrderUpdate {
            status: Some(status),
            ..OrderUpdate::default()
        };

        assert!(matches!(
            orders
                .update_order(&UserId::new("buyer"), order.id, to(OrderStatus::InProgress))
                .await,
            Err(HubError::Forbidden(_))
        ));
        assert!(matches!(
            orders.update_order(&seller, order.id, to(OrderStatus::Completed)).await,
            Err(HubError::InvalidTransition { .. })
        ));
        for next in [OrderStatus::InProgress, OrderStatus::Revision, OrderStatus::Completed] {
            let Ok(updated) = orders.update_order(&seller, order.id, to(next)).await else {
                panic!("transition to {next} failed");
            };
            assert_eq!(updated.status, next);
        }
        assert!(matches!(
            orders.update_order(&seller, order.id, to(OrderStatus::Cancelled)).await,
            Err(HubError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn list_by_role() {
        let (store, orders) = setup();
        let listing = seeded_listing(&store, "seller").await;
        for _ in 0..3 {
            if orders
                .place_order(&caller("buyer"), listing.id, OrderRequest::default())
                .await
                .is_err()
            {
                panic!("place failed");
            }
        }
        let seller = UserId::new("seller");
        let buyer = UserId::new("buyer");
        let as_seller = orders.list_orders(&seller, OrderRole::Seller, None, None, None).await;
        let as_buyer = orders.list_orders(&seller, OrderRole::Buyer, None, None, None).await;
        let paged = orders.list_orders(&buyer, OrderRole::Buyer, None, Some(2), None).await;
        assert_eq!(as_seller.map(|v| v.len()).ok(), Some(3));
        assert_eq!(as_buyer.map(|v| v.len()).ok(), Some(0));
        assert_eq!(paged.map(|v| v.len()).ok(), Some(2));
    }

    #[test]
    fn role_parses() {
        assert_eq!("seller".parse::<OrderRole>().ok(), Some(OrderRole::Seller));
        assert!("admin".parse::<OrderRole>().is_err());
    }
}
