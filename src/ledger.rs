//! Stock ledger: the only place a listing's stock counter is written
//!
//! [`apply_delta`] runs inside whatever sled transaction the caller opened, so
//! the read of the current stock and the write of the new value land in the
//! same serializable unit of work. A concurrent transaction touching the same
//! listing key conflicts and is re-run against the committed value, which is
//! what keeps two buyers from both taking the last unit.
use super::error::{MarketError, MarketResult, ValidationError};
use super::listing::Listing;
use super::store::{tx_get, tx_put};
use sled::Tree;
use sled::transaction::{ConflictableTransactionResult, TransactionalTree, abort};

/// Adjusts stock for one listing inside an open transaction and returns the
/// updated listing. Nothing is written when the result would go negative.
pub(crate) fn apply_delta(
    listings: &TransactionalTree,
    listing_id: &str,
    delta: i64,
) -> ConflictableTransactionResult<Listing, MarketError> {
    let Some(mut listing) = tx_get::<Listing>(listings, listing_id)? else {
        return abort(MarketError::NotFound("listing", listing_id.to_string()));
    };

    let next = listing.stock as i128 + delta as i128;
    if next < 0 {
        return abort(MarketError::NegativeStock {
            current: listing.stock,
            delta,
        });
    }
    let Ok(next) = u64::try_from(next) else {
        return abort(MarketError::InvalidInput(ValidationError::StockOverflow {
            current: listing.stock,
            delta,
        }));
    };

    listing.stock = next;
    tx_put(listings, listing_id, &listing)?;

    Ok(listing)
}

/// Standalone ledger over the listings tree, for adjustments that are not
/// part of a larger unit of work.
pub struct StockLedger {
    listings: Tree,
}

impl StockLedger {
    pub fn new(listings: Tree) -> Self {
        Self { listings }
    }

    pub fn adjust_stock(&self, listing_id: &str, delta: i64) -> MarketResult<u64> {
        let listing = self
            .listings
            .transaction(|listings| apply_delta(listings, listing_id, delta))?;

        tracing::debug!(listing_id, delta, new_stock = listing.stock, "Stock adjusted");
        Ok(listing.stock)
    }
}
