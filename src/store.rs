//! Persistent record store on top of sled trees
//!
//! Each record kind lives in its own tree keyed by id and encoded as CBOR. The
//! `tx_*` helpers are the transactional counterparts used inside a unit of work;
//! they surface decode failures as aborts so the whole transaction rolls back.
use super::error::{MarketError, MarketResult};
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionalTree};
use sled::{Db, Tree};
use std::sync::Arc;

const RESTAURANTS: &str = "restaurants";
const LISTINGS: &str = "listings";
const ORDERS: &str = "orders";

#[derive(Clone)]
pub struct Store {
    instance: Arc<Db>,
    pub(crate) restaurants: Tree,
    pub(crate) listings: Tree,
    pub(crate) orders: Tree,
}

impl Store {
    pub fn open(instance: Arc<Db>) -> MarketResult<Self> {
        let restaurants = instance.open_tree(RESTAURANTS)?;
        let listings = instance.open_tree(LISTINGS)?;
        let orders = instance.open_tree(ORDERS)?;

        Ok(Self {
            instance,
            restaurants,
            listings,
            orders,
        })
    }

    pub fn flush(&self) -> MarketResult<usize> {
        Ok(self.instance.flush()?)
    }
}

pub(crate) fn get<T>(tree: &Tree, key: &str) -> MarketResult<Option<T>>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    match tree.get(key.as_bytes())? {
        Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Inserts a record under a key that must not exist yet.
pub(crate) fn insert_new<T>(tree: &Tree, key: &str, value: &T) -> MarketResult<()>
where
    T: minicbor::Encode<()>,
{
    let bytes = minicbor::to_vec(value)?;
    tree.compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))?
        .map_err(|_| MarketError::DuplicateEntry(key.to_string()))
}

/// Decodes every record in the tree.
pub(crate) fn scan<T>(tree: &Tree) -> MarketResult<Vec<T>>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    tree.iter()
        .values()
        .map(|value| Ok(minicbor::decode(&value?)?))
        .collect()
}

pub(crate) fn tx_get<T>(
    tree: &TransactionalTree,
    key: &str,
) -> ConflictableTransactionResult<Option<T>, MarketError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    match tree.get(key.as_bytes())? {
        Some(bytes) => minicbor::decode(&bytes)
            .map(Some)
            .map_err(|e| ConflictableTransactionError::Abort(e.into())),
        None => Ok(None),
    }
}

pub(crate) fn tx_put<T>(
    tree: &TransactionalTree,
    key: &str,
    value: &T,
) -> ConflictableTransactionResult<(), MarketError>
where
    T: minicbor::Encode<()>,
{
    let bytes = minicbor::to_vec(value).map_err(|e| ConflictableTransactionError::Abort(e.into()))?;
    tree.insert(key.as_bytes(), bytes)?;
    Ok(())
}
