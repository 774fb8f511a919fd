pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use cart::{CartService, CartView, PricedCartLine};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::{NewOrder, NewOrderItem, OrderService, OrderWithItems};
