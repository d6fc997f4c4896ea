//! Service layer API for listing stock and order lifecycle operations
use super::error::{MarketError, MarketResult, ValidationError};
use super::guard::{OwnershipGuard, tx_assert_owns_listing, tx_assert_owns_restaurant};
use super::ledger::{StockLedger, apply_delta};
use super::listing::{Listing, ListingDraft};
use super::order::{Order, OrderStatus};
use super::restaurant::{Coordinates, Restaurant, RestaurantDraft};
use super::store::{self, Store, tx_get, tx_put};
use super::utils::{IdGenerator, LISTING_HRP, ORDER_HRP, RESTAURANT_HRP, new_uuid_to_bech32};
use sled::Transactional;
use sled::transaction::{TransactionResult, abort};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct MarketService {
    store: Store,
    ledger: StockLedger,
    guard: OwnershipGuard,
    new_id: Box<IdGenerator>,
}

impl MarketService {
    pub fn new(instance: Arc<sled::Db>) -> MarketResult<Self> {
        let store = Store::open(instance)?;
        let ledger = StockLedger::new(store.listings.clone());
        let guard = OwnershipGuard::new(store.restaurants.clone(), store.listings.clone());

        Ok(Self {
            store,
            ledger,
            guard,
            new_id: Box::new(new_uuid_to_bech32),
        })
    }

    /// Replace the id source. The generator receives the id prefix of the
    /// record being created.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str) -> MarketResult<String> + Send + Sync + 'static,
    {
        self.new_id = Box::new(generator);
        self
    }

    pub fn stock_ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn ownership_guard(&self) -> &OwnershipGuard {
        &self.guard
    }

    pub fn flush(&self) -> MarketResult<usize> {
        self.store.flush()
    }

    /// Register a restaurant owned by `owner_id`
    pub fn register_restaurant(
        &self,
        owner_id: &str,
        draft: RestaurantDraft,
    ) -> MarketResult<Restaurant> {
        let id = (self.new_id)(RESTAURANT_HRP)?;
        let restaurant = draft.validate_and_finalise(id, owner_id.to_string())?;

        store::insert_new(&self.store.restaurants, &restaurant.id, &restaurant)?;

        info!(restaurant_id = %restaurant.id, owner_id, "Restaurant registered");
        Ok(restaurant)
    }

    pub fn restaurant(&self, restaurant_id: &str) -> MarketResult<Restaurant> {
        store::get(&self.store.restaurants, restaurant_id)?
            .ok_or_else(|| MarketError::NotFound("restaurant", restaurant_id.to_string()))
    }

    /// All restaurants, newest first
    pub fn restaurants(&self) -> MarketResult<Vec<Restaurant>> {
        let mut restaurants = store::scan::<Restaurant>(&self.store.restaurants)?;
        restaurants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(restaurants)
    }

    pub fn restaurants_by_owner(&self, owner_id: &str) -> MarketResult<Vec<Restaurant>> {
        let mut restaurants = self.restaurants()?;
        restaurants.retain(|r| r.is_owned_by(owner_id));
        Ok(restaurants)
    }

    /// Replace a restaurant's details. Id, owner and creation time are kept.
    pub fn update_restaurant(
        &self,
        restaurant_id: &str,
        owner_id: &str,
        draft: RestaurantDraft,
    ) -> MarketResult<Restaurant> {
        let details = draft.validate_and_finalise(restaurant_id.to_string(), owner_id.to_string())?;

        let outcome: TransactionResult<Restaurant, MarketError> =
            self.store.restaurants.transaction(|restaurants| {
                let current = tx_assert_owns_restaurant(restaurants, restaurant_id, owner_id)?;
                let updated = Restaurant {
                    created_at: current.created_at,
                    ..details.clone()
                };
                tx_put(restaurants, restaurant_id, &updated)?;
                Ok(updated)
            });
        let updated = outcome?;

        info!(restaurant_id, owner_id, "Restaurant updated");
        Ok(updated)
    }

    /// Restaurants within `max_km` of the given point, nearest first
    pub fn nearby_restaurants(&self, lat: f64, lng: f64, max_km: f64) -> MarketResult<Vec<Restaurant>> {
        let origin = Coordinates::new(lat, lng);
        if !origin.is_valid() {
            return Err(ValidationError::InvalidCoordinates { lat, lng }.into());
        }

        let mut nearby: Vec<(f64, Restaurant)> = store::scan::<Restaurant>(&self.store.restaurants)?
            .into_iter()
            .map(|r| (origin.distance_km(&r.coordinates), r))
            .filter(|(distance, _)| *distance <= max_km)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(nearby.into_iter().map(|(_, r)| r).collect())
    }

    /// Publish a listing under a restaurant the caller owns
    pub fn create_listing(&self, owner_id: &str, draft: ListingDraft) -> MarketResult<Listing> {
        let restaurant_id = draft
            .restaurant_id()
            .ok_or(ValidationError::MissingField("restaurant"))?
            .to_string();
        self.guard.assert_owns_restaurant(&restaurant_id, owner_id)?;

        let id = (self.new_id)(LISTING_HRP)?;
        let listing = draft.validate_and_finalise(id)?;

        store::insert_new(&self.store.listings, &listing.id, &listing)?;

        info!(
            listing_id = %listing.id,
            restaurant_id = %listing.restaurant_id,
            kind = listing.kind.as_str(),
            stock = listing.stock,
            unit_price = listing.unit_price,
            "Listing created"
        );
        Ok(listing)
    }

    pub fn listing(&self, listing_id: &str) -> MarketResult<Listing> {
        store::get(&self.store.listings, listing_id)?
            .ok_or_else(|| MarketError::NotFound("listing", listing_id.to_string()))
    }

    /// All listings, newest first. `active_only` keeps those that can still be bought.
    pub fn listings(&self, active_only: bool) -> MarketResult<Vec<Listing>> {
        let mut listings = store::scan::<Listing>(&self.store.listings)?;
        if active_only {
            listings.retain(Listing::is_purchasable);
        }
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    pub fn listings_by_restaurant(&self, restaurant_id: &str) -> MarketResult<Vec<Listing>> {
        let mut listings = store::scan::<Listing>(&self.store.listings)?;
        listings.retain(|l| l.restaurant_id == restaurant_id);
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    /// Owner-initiated restock or correction. Returns the new stock level.
    pub fn adjust_stock(&self, listing_id: &str, delta: i64, owner_id: &str) -> MarketResult<u64> {
        let outcome: TransactionResult<Listing, MarketError> =
            (&self.store.restaurants, &self.store.listings).transaction(|(restaurants, listings)| {
                tx_assert_owns_listing(restaurants, listings, listing_id, owner_id, || {
                    format!("listing {listing_id}")
                })?;
                apply_delta(listings, listing_id, delta)
            });

        match outcome {
            Ok(listing) => {
                info!(listing_id, delta, new_stock = listing.stock, "Stock adjusted by owner");
                Ok(listing.stock)
            }
            Err(err) => {
                let err = MarketError::from(err);
                warn!(listing_id, delta, kind = ?err.kind(), "Stock adjustment rejected: {err}");
                Err(err)
            }
        }
    }

    /// Owner-initiated activation toggle. Inactive listings cannot be ordered.
    pub fn set_listing_active(&self, listing_id: &str, active: bool, owner_id: &str) -> MarketResult<Listing> {
        let outcome: TransactionResult<Listing, MarketError> =
            (&self.store.restaurants, &self.store.listings).transaction(|(restaurants, listings)| {
                let mut listing = tx_assert_owns_listing(restaurants, listings, listing_id, owner_id, || {
                    format!("listing {listing_id}")
                })?;
                listing.is_active = active;
                tx_put(listings, listing_id, &listing)?;
                Ok(listing)
            });

        let listing = outcome?;
        info!(listing_id, active, "Listing activation changed");
        Ok(listing)
    }

    /// Place an order: decrement stock and persist the order in one unit of work
    pub fn create_order(&self, user_id: &str, listing_id: &str, qty: i64) -> MarketResult<Order> {
        if qty <= 0 {
            warn!(user_id, listing_id, qty, "Order rejected: non-positive quantity");
            return Err(MarketError::InvalidQuantity(qty));
        }
        let requested = qty.unsigned_abs();
        let order_id = (self.new_id)(ORDER_HRP)?;

        let outcome: TransactionResult<(Order, u64), MarketError> =
            (&self.store.listings, &self.store.orders).transaction(|(listings, orders)| {
                let Some(listing) = tx_get::<Listing>(listings, listing_id)? else {
                    return abort(MarketError::NotFound("listing", listing_id.to_string()));
                };
                debug!(?listing, "Listing loaded for order");

                if !listing.is_active {
                    return abort(MarketError::InvalidInput(ValidationError::InactiveListing));
                }
                // priced from the same snapshot the stock is taken from
                let Some(total_price) = requested.checked_mul(listing.unit_price) else {
                    return abort(MarketError::InvalidInput(ValidationError::PriceOverflow {
                        qty: requested,
                        unit_price: listing.unit_price,
                    }));
                };

                if !listing.has_stock(requested) {
                    return abort(MarketError::InsufficientStock {
                        requested,
                        available: listing.stock,
                    });
                }
                let updated = apply_delta(listings, listing_id, -qty)?;

                if orders.get(order_id.as_bytes())?.is_some() {
                    return abort(MarketError::DuplicateEntry(order_id.clone()));
                }
                let order = Order::new(
                    order_id.clone(),
                    user_id.to_string(),
                    listing_id.to_string(),
                    requested,
                    total_price,
                );
                tx_put(orders, &order.id, &order)?;

                Ok((order, updated.stock))
            });

        match outcome {
            Ok((order, remaining)) => {
                info!(
                    order_id = %order.id,
                    listing_id,
                    qty = requested,
                    total_price = order.total_price(),
                    remaining,
                    "Order placed"
                );
                Ok(order)
            }
            Err(err) => {
                let err = MarketError::from(err);
                warn!(user_id, listing_id, qty, kind = ?err.kind(), "Order rejected: {err}");
                Err(err)
            }
        }
    }

    pub fn order(&self, order_id: &str) -> MarketResult<Order> {
        store::get(&self.store.orders, order_id)?
            .ok_or_else(|| MarketError::NotFound("order", order_id.to_string()))
    }

    /// Orders placed by a user, newest first
    pub fn orders_by_user(&self, user_id: &str) -> MarketResult<Vec<Order>> {
        let mut orders = store::scan::<Order>(&self.store.orders)?;
        orders.retain(|o| o.user_id == user_id);
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders against any listing of a restaurant, newest first
    pub fn orders_by_restaurant(&self, restaurant_id: &str) -> MarketResult<Vec<Order>> {
        let listing_ids: Vec<String> = self
            .listings_by_restaurant(restaurant_id)?
            .into_iter()
            .map(|l| l.id)
            .collect();

        let mut orders = store::scan::<Order>(&self.store.orders)?;
        orders.retain(|o| listing_ids.contains(&o.listing_id));
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Move an order to `new_status` on behalf of the owning restaurant's operator
    pub fn update_order_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        requester_id: &str,
    ) -> MarketResult<()> {
        let outcome: TransactionResult<OrderStatus, MarketError> = (
            &self.store.restaurants,
            &self.store.listings,
            &self.store.orders,
        )
            .transaction(|(restaurants, listings, orders)| {
                let Some(mut order) = tx_get::<Order>(orders, order_id)? else {
                    return abort(MarketError::NotFound("order", order_id.to_string()));
                };
                tx_assert_owns_listing(restaurants, listings, &order.listing_id, requester_id, || {
                    format!("order {order_id}")
                })?;

                let previous = order.status();
                if let Err(err) = order.transition_to(new_status) {
                    return abort(err);
                }
                tx_put(orders, order_id, &order)?;

                Ok(previous)
            });

        match outcome {
            Ok(previous) => {
                info!(order_id, from = %previous, to = %new_status, "Order status updated");
                Ok(())
            }
            Err(err) => {
                let err = MarketError::from(err);
                warn!(order_id, requester_id, to = %new_status, kind = ?err.kind(), "Status update rejected: {err}");
                Err(err)
            }
        }
    }
}
