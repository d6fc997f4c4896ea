//! Ownership guard: resolves who may mutate a listing or an order
//!
//! Ownership is always re-derived from persisted state (listing -> restaurant ->
//! owner) at the time of the call, never taken from the caller.
use super::error::{MarketError, MarketResult};
use super::listing::Listing;
use super::restaurant::Restaurant;
use super::store::{self, tx_get};
use sled::Tree;
use sled::transaction::{ConflictableTransactionResult, TransactionalTree, abort};

fn check_owner(restaurant: &Restaurant, resource: String, user_id: &str) -> MarketResult<()> {
    if !restaurant.is_owned_by(user_id) {
        return Err(MarketError::Unauthorized {
            resource,
            user_id: user_id.to_string(),
        });
    }
    Ok(())
}

pub struct OwnershipGuard {
    restaurants: Tree,
    listings: Tree,
}

impl OwnershipGuard {
    pub fn new(restaurants: Tree, listings: Tree) -> Self {
        Self {
            restaurants,
            listings,
        }
    }

    pub fn assert_owns_restaurant(&self, restaurant_id: &str, user_id: &str) -> MarketResult<Restaurant> {
        let restaurant: Restaurant = store::get(&self.restaurants, restaurant_id)?
            .ok_or_else(|| MarketError::NotFound("restaurant", restaurant_id.to_string()))?;

        check_owner(&restaurant, format!("restaurant {restaurant_id}"), user_id)?;
        Ok(restaurant)
    }

    pub fn assert_owns_listing(&self, listing_id: &str, user_id: &str) -> MarketResult<Listing> {
        let listing: Listing = store::get(&self.listings, listing_id)?
            .ok_or_else(|| MarketError::NotFound("listing", listing_id.to_string()))?;

        let restaurant: Restaurant = store::get(&self.restaurants, &listing.restaurant_id)?
            .ok_or_else(|| MarketError::NotFound("restaurant", listing.restaurant_id.clone()))?;

        check_owner(&restaurant, format!("listing {listing_id}"), user_id)?;
        Ok(listing)
    }
}

/// Same check as [`OwnershipGuard::assert_owns_listing`], read at the snapshot
/// of an open transaction so the chain cannot change under the mutation it guards.
pub(crate) fn tx_assert_owns_listing(
    restaurants: &TransactionalTree,
    listings: &TransactionalTree,
    listing_id: &str,
    user_id: &str,
    resource: impl FnOnce() -> String,
) -> ConflictableTransactionResult<Listing, MarketError> {
    let Some(listing) = tx_get::<Listing>(listings, listing_id)? else {
        return abort(MarketError::NotFound("listing", listing_id.to_string()));
    };
    let Some(restaurant) = tx_get::<Restaurant>(restaurants, &listing.restaurant_id)? else {
        return abort(MarketError::NotFound(
            "restaurant",
            listing.restaurant_id.clone(),
        ));
    };

    match check_owner(&restaurant, resource(), user_id) {
        Ok(()) => Ok(listing),
        Err(err) => abort(err),
    }
}

pub(crate) fn tx_assert_owns_restaurant(
    restaurants: &TransactionalTree,
    restaurant_id: &str,
    user_id: &str,
) -> ConflictableTransactionResult<Restaurant, MarketError> {
    let Some(restaurant) = tx_get::<Restaurant>(restaurants, restaurant_id)? else {
        return abort(MarketError::NotFound("restaurant", restaurant_id.to_string()));
    };

    match check_owner(&restaurant, format!("restaurant {restaurant_id}"), user_id) {
        Ok(()) => Ok(restaurant),
        Err(err) => abort(err),
    }
}
