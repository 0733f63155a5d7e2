//! Page objects for the storefront.

mod cart;
mod checkout;
mod login;
mod products;

pub use cart::CartPage;
pub use checkout::{CheckoutPage, CheckoutStep};
pub use login::LoginPage;
pub use products::ProductsPage;
