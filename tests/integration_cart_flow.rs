use assert_matches::assert_matches;
use tempfile::tempdir;

use till::catalog::Catalog;
use till::discount::Discount;
use till::error::PosError;
use till::registry::{SessionRegistry, MAX_SESSIONS};
use till::store::PosStore;
use till::util::format_naira;

fn fresh_registry() -> SessionRegistry {
    SessionRegistry::bootstrap(Catalog::builtin(), None)
}

#[test]
fn five_sessions_then_max_reached() {
    let mut registry = fresh_registry();
    for _ in 0..MAX_SESSIONS - 1 {
        registry.create_session().unwrap();
    }
    assert_matches!(
        registry.create_session(),
        Err(PosError::MaxSessionsReached(5))
    );

    // Closing any one frees a slot immediately.
    registry.close_session("customer-2").unwrap();
    assert_eq!(registry.create_session().unwrap(), "customer-2");
}

#[test]
fn volume_discount_boundary_at_ten_items() {
    let mut registry = fresh_registry();
    let line = registry.add_line("customer-1").unwrap();
    registry.set_line_product("customer-1", line, 1).unwrap();
    registry.set_line_quantity("customer-1", line, 9).unwrap();
    registry
        .set_discount("customer-1", Discount::Volume)
        .unwrap();

    // The initial empty row still counts its quantity of 1, so drop it to
    // isolate the boundary.
    let first = registry.get("customer-1").unwrap().lines()[0].id;
    registry.remove_line("customer-1", first).unwrap();

    let session = registry.get("customer-1").unwrap();
    assert_eq!(session.item_count(), 9);
    assert_eq!(session.quote().amount, 0.0);

    registry.set_line_quantity("customer-1", line, 10).unwrap();
    let session = registry.get("customer-1").unwrap();
    assert_eq!(session.item_count(), 10);
    assert_eq!(session.quote().amount, session.subtotal() * 0.05);
    assert_eq!(session.total(), session.subtotal() * 0.95);
}

#[test]
fn premium_discount_at_exactly_ten_thousand() {
    let mut registry = fresh_registry();
    // 10 x Fish (1kg) at 1000 = exactly 10000
    let line = registry.get("customer-1").unwrap().lines()[0].id;
    registry.set_line_product("customer-1", line, 10).unwrap();
    registry.set_line_quantity("customer-1", line, 10).unwrap();
    registry
        .set_discount("customer-1", Discount::Premium)
        .unwrap();

    let session = registry.get("customer-1").unwrap();
    assert_eq!(session.subtotal(), 10000.0);
    assert_eq!(format_naira(session.quote().amount), "₦700.00");
    assert_eq!(format_naira(session.total()), "₦9300.00");
}

#[test]
fn custom_discount_bounds() {
    let mut registry = fresh_registry();
    let line = registry.get("customer-1").unwrap().lines()[0].id;
    registry.set_line_product("customer-1", line, 1).unwrap();

    registry
        .set_discount("customer-1", Discount::Custom(0.0))
        .unwrap();
    assert_eq!(registry.get("customer-1").unwrap().quote().amount, 0.0);

    registry
        .set_discount("customer-1", Discount::Custom(50.0))
        .unwrap();
    assert_eq!(registry.get("customer-1").unwrap().quote().amount, 400.0);

    registry
        .set_discount("customer-1", Discount::Custom(51.0))
        .unwrap();
    let session = registry.get("customer-1").unwrap();
    assert_eq!(session.quote().amount, 0.0);
    assert_eq!(session.quote().label, "Invalid custom discount (0-50% allowed)");
}

#[test]
fn close_session_protection_follows_product_binding() {
    let mut registry = fresh_registry();
    registry.create_session().unwrap();

    // Rows without a bound product never block closing.
    registry.add_line("customer-2").unwrap();
    registry.close_session("customer-2").unwrap();

    registry.create_session().unwrap();
    let line = registry.add_line("customer-2").unwrap();
    registry.set_line_product("customer-2", line, 3).unwrap();
    assert_matches!(
        registry.close_session("customer-2"),
        Err(PosError::SessionNotEmpty)
    );
}

#[test]
fn full_registry_round_trips_through_the_store() {
    let dir = tempdir().unwrap();
    let mut registry: SessionRegistry = SessionRegistry::load_or_bootstrap(
        Catalog::builtin(),
        PosStore::with_dir(dir.path()),
    );

    registry.set_customer_name("customer-1", "Ada").unwrap();
    let line = registry.get("customer-1").unwrap().lines()[0].id;
    registry.set_line_product("customer-1", line, 2).unwrap();
    registry.set_line_quantity("customer-1", line, 4).unwrap();
    registry
        .set_discount("customer-1", Discount::Custom(10.0))
        .unwrap();

    registry.create_session().unwrap();
    let other = registry.get("customer-2").unwrap().lines()[0].id;
    registry.set_line_product("customer-2", other, 6).unwrap();

    let before = registry.to_persisted();
    let reloaded: SessionRegistry = SessionRegistry::load_or_bootstrap(
        Catalog::builtin(),
        PosStore::with_dir(dir.path()),
    );
    let after = reloaded.to_persisted();

    // Line items and discount selections survive; derived fields are
    // recomputed rather than stored.
    assert_eq!(before.customers, after.customers);
    assert_eq!(before.current_customer_id, after.current_customer_id);
    assert_eq!(reloaded.get("customer-1").unwrap().subtotal(), 2400.0);
    assert_eq!(reloaded.get("customer-1").unwrap().total(), 2160.0);
    assert_eq!(
        reloaded.get("customer-1").unwrap().discount(),
        Discount::Custom(10.0)
    );
}

#[test]
fn malformed_store_contents_bootstrap_fresh() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("customerSessions.json"), "{broken").unwrap();

    let registry: SessionRegistry = SessionRegistry::load_or_bootstrap(
        Catalog::builtin(),
        PosStore::with_dir(dir.path()),
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.active_id(), Some("customer-1"));
}
