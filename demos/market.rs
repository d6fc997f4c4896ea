//! Walks one listing through a busy evening: two buyers race for the last
//! boxes, the owner restocks, and an order is collected.
//!
//! RUST_LOG=debug cargo run --example market

use surplus_market::{
    config::MarketConfig,
    listing::{ListingDraft, ListingKind},
    order::OrderStatus,
    restaurant::RestaurantDraft,
    service::MarketService,
    telemetry,
    types::ClockTime,
    utils::{self, USER_HRP},
};

fn main() -> anyhow::Result<()> {
    telemetry::setup_tracing();

    let config = MarketConfig::from_env()?;
    let db = config.open()?;
    let service = MarketService::new(db)?;

    let owner = utils::new_uuid_to_bech32(USER_HRP)?;
    let restaurant = service.register_restaurant(
        &owner,
        RestaurantDraft::new()
            .set_name("Little Bakehouse")
            .set_address("5 Mill Street")
            .set_coordinates(52.2053, 0.1218)
            .set_closing_time(ClockTime::new(18, 0).ok_or(anyhow::anyhow!("bad closing time"))?),
    )?;

    let listing = service.create_listing(
        &owner,
        ListingDraft::new()
            .set_restaurant(&restaurant.id)
            .set_kind(ListingKind::MysteryBox)
            .set_description("A surprise bag of today's bakes")
            .set_unit_price(300)
            .set_stock(3)
            .set_pickup_time(ClockTime::new(17, 30).ok_or(anyhow::anyhow!("bad pickup time"))?),
    )?;

    let alice = utils::new_uuid_to_bech32(USER_HRP)?;
    let bob = utils::new_uuid_to_bech32(USER_HRP)?;

    let (first, second) = std::thread::scope(|s| {
        let a = s.spawn(|| service.create_order(&alice, &listing.id, 2));
        let b = s.spawn(|| service.create_order(&bob, &listing.id, 2));
        (a.join(), b.join())
    });
    for outcome in [first, second] {
        match outcome {
            Ok(Ok(order)) => println!("placed {} for {} ({} units)", order.id, order.total_price(), order.qty()),
            Ok(Err(err)) => println!("rejected: {err} ({:?})", err.kind()),
            Err(_) => anyhow::bail!("buyer thread panicked"),
        }
    }

    let stock = service.adjust_stock(&listing.id, 4, &owner)?;
    println!("restocked, {stock} left");

    for order in service.orders_by_restaurant(&restaurant.id)? {
        service.update_order_status(&order.id, OrderStatus::Ready, &owner)?;
        service.update_order_status(&order.id, OrderStatus::Completed, &owner)?;
        println!("{} -> {}", order.id, service.order(&order.id)?.status());
    }

    service.flush()?;
    Ok(())
}
