//! Listings: what a restaurant puts up for sale, and how many are left
use super::error::ValidationError;
use super::restaurant::non_empty;
use super::types::{ClockTime, TimeStamp};
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ListingKind {
    #[n(0)]
    MysteryBox,
    #[n(1)]
    Reveal,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MysteryBox => "mystery_box",
            Self::Reveal => "reveal",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub struct Listing {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub restaurant_id: String,
    #[n(2)]
    pub kind: ListingKind,
    #[n(3)]
    pub name: Option<String>, // mystery boxes may stay anonymous
    #[n(4)]
    pub description: String,
    #[n(5)]
    pub unit_price: u64, // smallest currency unit
    #[n(6)]
    pub stock: u64,
    #[n(7)]
    pub is_active: bool,
    #[n(8)]
    pub photo_url: Option<String>,
    #[n(9)]
    pub pickup_time: ClockTime,
    #[n(10)]
    pub created_at: TimeStamp<Utc>,
}

impl Listing {
    pub fn has_stock(&self, qty: u64) -> bool {
        self.stock >= qty
    }
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

// Also used for constructing drafts
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ListingDraft {
    restaurant_id: Option<String>,
    kind: Option<ListingKind>,
    name: Option<String>,
    description: Option<String>,
    unit_price: u64,
    stock: u64,
    photo_url: Option<String>,
    pickup_time: Option<ClockTime>,
}

impl ListingDraft {
    /// Construct a new builder object, this becomes the basis for a listing
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_restaurant(mut self, restaurant_id: &str) -> Self {
        self.restaurant_id = Some(restaurant_id.to_string());
        self
    }
    pub fn set_kind(mut self, kind: ListingKind) -> Self {
        self.kind = Some(kind);
        self
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
    pub fn set_unit_price(mut self, price: u64) -> Self {
        self.unit_price = price;
        self
    }
    pub fn set_stock(mut self, stock: u64) -> Self {
        self.stock = stock;
        self
    }
    pub fn set_photo_url(mut self, url: &str) -> Self {
        self.photo_url = Some(url.to_string());
        self
    }
    pub fn set_pickup_time(mut self, pickup_time: ClockTime) -> Self {
        self.pickup_time = Some(pickup_time);
        self
    }
    pub fn restaurant_id(&self) -> Option<&str> {
        self.restaurant_id.as_deref()
    }
    /// Checks fields and performs validation, returning the active listing to persist.
    pub fn validate_and_finalise(self, id: String) -> Result<Listing, ValidationError> {
        let restaurant_id = non_empty(self.restaurant_id, "restaurant")?;
        let kind = self.kind.ok_or(ValidationError::MissingField("listing kind"))?;
        let name = self.name.filter(|n| !n.trim().is_empty());
        if kind == ListingKind::Reveal && name.is_none() {
            return Err(ValidationError::UnnamedReveal);
        }
        let description = non_empty(self.description, "description")?;
        let pickup_time = self
            .pickup_time
            .ok_or(ValidationError::MissingField("pickup time"))?;

        Ok(Listing {
            id,
            restaurant_id,
            kind,
            name,
            description,
            unit_price: self.unit_price,
            stock: self.stock,
            is_active: true,
            photo_url: self.photo_url,
            pickup_time,
            created_at: TimeStamp::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_draft() -> ListingDraft {
        ListingDraft::new()
            .set_restaurant("rest1abc")
            .set_kind(ListingKind::MysteryBox)
            .set_description("Assorted pastries")
            .set_unit_price(450)
            .set_stock(4)
            .set_pickup_time(ClockTime::new(20, 0).unwrap())
    }

    #[test]
    fn mystery_box_may_be_unnamed() {
        let listing = base_draft().validate_and_finalise("listing1".into()).unwrap();
        assert!(listing.name.is_none());
        assert!(listing.is_active);
    }

    #[test]
    fn reveal_needs_a_name() {
        let draft = base_draft().set_kind(ListingKind::Reveal);
        assert_eq!(
            draft.validate_and_finalise("listing1".into()),
            Err(ValidationError::UnnamedReveal)
        );
    }

    #[test]
    fn purchasable_requires_active_and_stock() {
        let mut listing = base_draft().validate_and_finalise("listing1".into()).unwrap();
        assert!(listing.is_purchasable());
        listing.stock = 0;
        assert!(!listing.is_purchasable());
        listing.stock = 2;
        listing.is_active = false;
        assert!(!listing.is_purchasable());
    }
}
