//! Identifier generation

use super::error::{MarketError, ValidationError};
use bech32::Bech32m;
use uuid7::uuid7;

pub const LISTING_HRP: &str = "listing";
pub const ORDER_HRP: &str = "order";
pub const RESTAURANT_HRP: &str = "rest";
pub const USER_HRP: &str = "user";

// construct a unique time-ordered id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, MarketError> {
    let hrp =
        bech32::Hrp::parse(hrp).map_err(|e| ValidationError::Identifier(e.to_string()))?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .map_err(|e| ValidationError::Identifier(e.to_string()))?;
    Ok(encode)
}

/// Source of fresh record ids. The default draws a uuid7 per call.
pub type IdGenerator = dyn Fn(&str) -> Result<String, MarketError> + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        let id = new_uuid_to_bech32(ORDER_HRP).unwrap();
        assert!(id.starts_with("order1"));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(new_uuid_to_bech32("").is_err());
    }
}
