mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use shopcart_api::errors::ServiceError;
use uuid::Uuid;

#[tokio::test]
async fn add_or_update_accumulates_deltas() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let product_id = app.seed_product("Coffee Beans", dec!(11.20)).await;

    cart.add_or_update("alice", product_id, 2)
        .await
        .expect("first add should succeed");
    let line = cart
        .add_or_update("alice", product_id, 3)
        .await
        .expect("second add should succeed");

    assert_eq!(line.quantity, 5);

    let view = cart.get_view("alice").await.expect("view should succeed");
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 5);
}

#[tokio::test]
async fn add_then_set_quantity_leaves_single_line() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let product_id = app.seed_product("Espresso Cup", dec!(3.21)).await;

    cart.add_or_update("alice", product_id, 2).await.unwrap();
    cart.add_or_update("alice", product_id, 3).await.unwrap();
    cart.set_quantity("alice", product_id, 1).await.unwrap();

    let view = cart.get_view("alice").await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].product_id, product_id);
    assert_eq!(view.lines[0].quantity, 1);
}

#[tokio::test]
async fn set_quantity_on_missing_line_fails_and_creates_nothing() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let product_id = app.seed_product("French Press", dec!(231.60)).await;

    let result = cart.set_quantity("alice", product_id, 3).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let view = cart.get_view("alice").await.unwrap();
    assert!(view.lines.is_empty());
}

#[tokio::test]
async fn quantity_below_one_is_rejected() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let product_id = app.seed_product("Coffee Beans", dec!(11.20)).await;

    assert!(matches!(
        cart.add_or_update("alice", product_id, 0).await,
        Err(ServiceError::InvalidQuantity(0))
    ));
    assert!(matches!(
        cart.add_or_update("alice", product_id, -4).await,
        Err(ServiceError::InvalidQuantity(-4))
    ));

    cart.add_or_update("alice", product_id, 2).await.unwrap();
    assert!(matches!(
        cart.set_quantity("alice", product_id, 0).await,
        Err(ServiceError::InvalidQuantity(0))
    ));

    // The failed calls changed nothing.
    let view = cart.get_view("alice").await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 2);
}

#[tokio::test]
async fn remove_deletes_line_and_is_idempotent() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let product_id = app.seed_product("Coffee Beans", dec!(11.20)).await;

    // Removing an absent line is a quiet no-op.
    cart.remove("alice", product_id)
        .await
        .expect("remove of missing line should succeed");

    cart.add_or_update("alice", product_id, 2).await.unwrap();
    cart.remove("alice", product_id).await.unwrap();

    let view = cart.get_view("alice").await.unwrap();
    assert!(view.lines.is_empty());
}

#[tokio::test]
async fn clear_empties_cart_and_tolerates_empty_cart() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let beans = app.seed_product("Coffee Beans", dec!(11.20)).await;
    let cup = app.seed_product("Espresso Cup", dec!(3.21)).await;

    cart.clear("alice")
        .await
        .expect("clear of empty cart should succeed");

    cart.add_or_update("alice", beans, 1).await.unwrap();
    cart.add_or_update("alice", cup, 2).await.unwrap();
    cart.clear("alice").await.unwrap();

    let view = cart.get_view("alice").await.unwrap();
    assert!(view.lines.is_empty());
    assert_eq!(view.total, dec!(0));
}

#[tokio::test]
async fn view_prices_lines_against_current_catalog() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let beans = app.seed_product("Coffee Beans", dec!(11.20)).await;
    let cup = app.seed_product("Espresso Cup", dec!(3.21)).await;

    cart.add_or_update("alice", beans, 2).await.unwrap();
    cart.add_or_update("alice", cup, 5).await.unwrap();

    let view = cart.get_view("alice").await.unwrap();
    assert_eq!(view.lines.len(), 2);

    let beans_line = view
        .lines
        .iter()
        .find(|l| l.product_id == beans)
        .expect("beans line present");
    assert_eq!(beans_line.name, "Coffee Beans");
    assert_eq!(beans_line.unit_price, dec!(11.20));
    assert_eq!(beans_line.line_total, dec!(22.40));

    let cup_line = view
        .lines
        .iter()
        .find(|l| l.product_id == cup)
        .expect("cup line present");
    assert_eq!(cup_line.line_total, dec!(16.05));

    assert_eq!(view.total, dec!(38.45));
}

#[tokio::test]
async fn view_fails_loudly_when_a_product_is_missing() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let beans = app.seed_product("Coffee Beans", dec!(11.20)).await;
    let ghost = Uuid::new_v4();

    cart.add_or_update("alice", beans, 1).await.unwrap();
    cart.add_or_update("alice", ghost, 1).await.unwrap();

    let result = cart.get_view("alice").await;
    assert!(matches!(
        result,
        Err(ServiceError::ProductNotFound(id)) if id == ghost
    ));

    // The read must not have dropped anything.
    cart.remove("alice", ghost).await.unwrap();
    let view = cart.get_view("alice").await.unwrap();
    assert_eq!(view.lines.len(), 1);
}

#[tokio::test]
async fn carts_are_isolated_per_owner() {
    let app = TestApp::new().await;
    let cart = &app.state.services.cart;
    let beans = app.seed_product("Coffee Beans", dec!(11.20)).await;

    cart.add_or_update("alice", beans, 2).await.unwrap();

    let bob_view = cart.get_view("bob").await.unwrap();
    assert!(bob_view.lines.is_empty());

    cart.clear("bob").await.unwrap();
    let alice_view = cart.get_view("alice").await.unwrap();
    assert_eq!(alice_view.lines.len(), 1);
}
