//! The storefront scenario catalogue.
//!
//! Every scenario starts on a fresh session that already shows the login
//! form. Scenarios are tagged with the page they exercise plus `smoke` or
//! `regression`.

use crate::assertion::Assertion;
use crate::harness::{Scenario, TestSuite};
use crate::page_object::PageObject;
use crate::pages::{CartPage, CheckoutPage, LoginPage, ProductsPage};
use crate::result::ProbeResult;
use crate::session::Session;
use futures::FutureExt;

const BACKPACK: &str = "sauce-labs-backpack";
const BIKE_LIGHT: &str = "sauce-labs-bike-light";
const BOLT_T_SHIRT: &str = "sauce-labs-bolt-t-shirt";

const FIRST_NAME: &str = "Shivansh";
const LAST_NAME: &str = "Bajpai";
const POSTAL_CODE: &str = "208001";

/// Build the full suite in catalogue order
#[must_use]
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("swag-labs");
    for scenario in login_scenarios()
        .into_iter()
        .chain(products_scenarios())
        .chain(cart_scenarios())
        .chain(checkout_scenarios())
    {
        suite.add(scenario);
    }
    suite
}

async fn logged_in(session: Session) -> ProbeResult<ProductsPage> {
    let credentials = session.settings().credentials.clone();
    LoginPage::arrive(session)
        .await?
        .login(&credentials.valid_username, &credentials.valid_password)
        .await
}

// =============================================================================
// Login
// =============================================================================

fn login_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "test_login_page_display",
            &["login", "smoke"],
            "login form shows logo and button",
            |s| login_page_display(s).boxed(),
        ),
        Scenario::new(
            "test_valid_login",
            &["login", "smoke"],
            "valid credentials reach the product listing",
            |s| valid_login(s).boxed(),
        ),
        Scenario::new(
            "test_invalid_username",
            &["login", "regression"],
            "unknown user is refused",
            |s| invalid_username(s).boxed(),
        ),
        Scenario::new(
            "test_invalid_password",
            &["login", "regression"],
            "wrong password is refused",
            |s| invalid_password(s).boxed(),
        ),
        Scenario::new(
            "test_empty_username",
            &["login", "regression"],
            "empty username is refused",
            |s| empty_username(s).boxed(),
        ),
        Scenario::new(
            "test_empty_password",
            &["login", "regression"],
            "empty password is refused",
            |s| empty_password(s).boxed(),
        ),
        Scenario::new(
            "test_empty_credentials",
            &["login", "regression"],
            "empty form is refused",
            |s| empty_credentials(s).boxed(),
        ),
        Scenario::new(
            "test_locked_user_login",
            &["login", "regression"],
            "locked account is refused",
            |s| locked_user_login(s).boxed(),
        ),
    ]
}

async fn refused_login(
    session: Session,
    username: &str,
    password: &str,
    expected: Option<&str>,
) -> ProbeResult<()> {
    let login = LoginPage::arrive(session)
        .await?
        .login_expecting_failure(username, password)
        .await?;
    Assertion::is_true(
        login.is_error_message_displayed().await,
        "Error message should be displayed",
    )
    .check()?;
    Assertion::is_true(
        login.is_login_page_displayed().await,
        "User should stay on the login page",
    )
    .check()?;
    if let Some(expected) = expected {
        Assertion::contains(&login.get_error_message_text().await?, expected).check()?;
    }
    Ok(())
}

async fn login_page_display(session: Session) -> ProbeResult<()> {
    let login = LoginPage::arrive(session).await?;
    Assertion::is_true(
        login.is_login_page_displayed().await,
        "Login page should be displayed with logo and login button",
    )
    .check()
}

async fn valid_login(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    Assertion::is_true(
        products.is_products_page_displayed().await?,
        "User should be redirected to Products page after successful login",
    )
    .check()?;
    Assertion::equals("Products", products.get_page_title_text().await?.as_str()).check()
}

async fn invalid_username(session: Session) -> ProbeResult<()> {
    let credentials = session.settings().credentials.clone();
    refused_login(
        session,
        &credentials.invalid_username,
        &credentials.valid_password,
        Some("Username and password do not match"),
    )
    .await
}

async fn invalid_password(session: Session) -> ProbeResult<()> {
    let credentials = session.settings().credentials.clone();
    refused_login(
        session,
        &credentials.valid_username,
        &credentials.invalid_password,
        None,
    )
    .await
}

async fn empty_username(session: Session) -> ProbeResult<()> {
    let credentials = session.settings().credentials.clone();
    refused_login(
        session,
        "",
        &credentials.valid_password,
        Some("Username is required"),
    )
    .await
}

async fn empty_password(session: Session) -> ProbeResult<()> {
    let credentials = session.settings().credentials.clone();
    refused_login(
        session,
        &credentials.valid_username,
        "",
        Some("Password is required"),
    )
    .await
}

async fn empty_credentials(session: Session) -> ProbeResult<()> {
    refused_login(session, "", "", None).await
}

async fn locked_user_login(session: Session) -> ProbeResult<()> {
    let credentials = session.settings().credentials.clone();
    refused_login(
        session,
        &credentials.locked_username,
        &credentials.valid_password,
        Some("locked out"),
    )
    .await
}

// =============================================================================
// Products
// =============================================================================

fn products_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "test_products_page_display",
            &["products", "smoke"],
            "listing is shown after login",
            |s| products_page_display(s).boxed(),
        ),
        Scenario::new(
            "test_products_are_displayed",
            &["products", "smoke"],
            "all six products are listed",
            |s| products_are_displayed(s).boxed(),
        ),
        Scenario::new(
            "test_add_single_product_to_cart",
            &["products", "smoke"],
            "adding one product shows badge 1",
            |s| add_single_product_to_cart(s).boxed(),
        ),
        Scenario::new(
            "test_add_multiple_products_to_cart",
            &["products", "regression"],
            "adding three products shows badge 3",
            |s| add_multiple_products_to_cart(s).boxed(),
        ),
        Scenario::new(
            "test_add_product_by_name",
            &["products", "regression"],
            "add a product by its slug",
            |s| add_product_by_name(s).boxed(),
        ),
        Scenario::new(
            "test_remove_product_from_products_page",
            &["products", "regression"],
            "removing the only product hides the badge",
            |s| remove_product_from_products_page(s).boxed(),
        ),
        Scenario::new(
            "test_sort_by_name_a_to_z",
            &["products", "regression"],
            "name ascending",
            |s| sort_by_name_a_to_z(s).boxed(),
        ),
        Scenario::new(
            "test_sort_by_name_z_to_a",
            &["products", "regression"],
            "name descending",
            |s| sort_by_name_z_to_a(s).boxed(),
        ),
        Scenario::new(
            "test_sort_by_price_low_to_high",
            &["products", "regression"],
            "price ascending",
            |s| sort_by_price_low_to_high(s).boxed(),
        ),
        Scenario::new(
            "test_sort_by_price_high_to_low",
            &["products", "regression"],
            "price descending",
            |s| sort_by_price_high_to_low(s).boxed(),
        ),
        Scenario::new(
            "test_logout",
            &["products", "regression"],
            "logout returns to the login form",
            |s| logout(s).boxed(),
        ),
    ]
}

async fn products_page_display(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    Assertion::is_true(
        products.is_products_page_displayed().await?,
        "Products page should be displayed after login",
    )
    .check()?;
    Assertion::equals("Products", products.get_page_title_text().await?.as_str()).check()
}

async fn products_are_displayed(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    let count = products.get_product_count().await?;
    Assertion::is_true(count > 0, "At least one product should be displayed").check()?;
    Assertion::equals(&6, &count)
        .context("SauceDemo should display 6 products")
        .check()
}

async fn add_single_product_to_cart(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_first_product_to_cart().await?;
    Assertion::is_true(
        products.is_cart_badge_displayed().await?,
        "Cart badge should appear after adding product",
    )
    .check()?;
    Assertion::equals(&1, &products.get_cart_badge_count().await).check()
}

async fn add_multiple_products_to_cart(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_multiple_products_to_cart(3).await?;
    Assertion::equals(&3, &products.get_cart_badge_count().await)
        .context("Cart badge should show count of 3 after adding 3 products")
        .check()
}

async fn add_product_by_name(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;
    Assertion::equals(&1, &products.get_cart_badge_count().await)
        .context("Cart should have 1 item after adding Sauce Labs Backpack")
        .check()
}

async fn remove_product_from_products_page(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;
    Assertion::equals(&1, &products.get_cart_badge_count().await).check()?;

    products.remove_product_from_cart_by_name(BACKPACK).await?;
    Assertion::is_false(
        products.is_cart_badge_displayed().await?,
        "Cart badge should not be displayed after removing product",
    )
    .check()
}

async fn sort_by_name_a_to_z(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.sort_by_name_a_to_z().await?;
    Assertion::equals(
        "Sauce Labs Backpack",
        products.get_first_product_name().await?.as_str(),
    )
    .context("Products should be sorted A to Z")
    .check()
}

async fn sort_by_name_z_to_a(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.sort_by_name_z_to_a().await?;
    Assertion::contains(&products.get_first_product_name().await?, "Test.allTheThings")
        .context("Products should be sorted Z to A")
        .check()
}

async fn sort_by_price_low_to_high(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.sort_by_price_low_to_high().await?;
    Assertion::equals("$7.99", products.get_first_product_price().await?.as_str())
        .context("Lowest priced item should be first")
        .check()
}

async fn sort_by_price_high_to_low(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.sort_by_price_high_to_low().await?;
    Assertion::equals("$49.99", products.get_first_product_price().await?.as_str())
        .context("Highest priced item should be first")
        .check()
}

async fn logout(session: Session) -> ProbeResult<()> {
    let session = logged_in(session).await?.logout().await?;
    let login = LoginPage::arrive(session).await?;
    Assertion::is_true(
        login.is_login_page_displayed().await,
        "User should be redirected to login page after logout",
    )
    .check()
}

// =============================================================================
// Cart
// =============================================================================

fn cart_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "test_empty_cart_display",
            &["cart", "smoke"],
            "a fresh cart is empty",
            |s| empty_cart_display(s).boxed(),
        ),
        Scenario::new(
            "test_cart_with_products",
            &["cart", "smoke"],
            "cart lists added products",
            |s| cart_with_products(s).boxed(),
        ),
        Scenario::new(
            "test_remove_item_from_cart",
            &["cart", "regression"],
            "remove one of two items",
            |s| remove_item_from_cart(s).boxed(),
        ),
        Scenario::new(
            "test_remove_all_items_from_cart",
            &["cart", "regression"],
            "remove every item",
            |s| remove_all_items_from_cart(s).boxed(),
        ),
        Scenario::new(
            "test_continue_shopping_navigation",
            &["cart", "regression"],
            "continue shopping keeps the cart",
            |s| continue_shopping_navigation(s).boxed(),
        ),
        Scenario::new(
            "test_cart_persistence",
            &["cart", "regression"],
            "cart survives leaving and returning",
            |s| cart_persistence(s).boxed(),
        ),
        Scenario::new(
            "test_cart_icon_updates",
            &["cart", "regression"],
            "badge follows each add",
            |s| cart_icon_updates(s).boxed(),
        ),
    ]
}

async fn empty_cart_display(session: Session) -> ProbeResult<()> {
    let cart = logged_in(session).await?.go_to_cart().await?;
    Assertion::is_true(cart.is_cart_page_displayed().await?, "Cart page should be displayed")
        .check()?;
    Assertion::equals("Your Cart", cart.get_page_title_text().await?.as_str()).check()?;
    Assertion::is_true(cart.is_cart_empty().await?, "Cart should be empty initially").check()
}

async fn cart_with_products(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;
    products.add_product_to_cart_by_name(BIKE_LIGHT).await?;

    let cart = products.go_to_cart().await?;
    Assertion::equals(&2, &cart.get_cart_item_count().await?)
        .context("Cart should have 2 items")
        .check()?;
    for name in ["Sauce Labs Backpack", "Sauce Labs Bike Light"] {
        Assertion::is_true(cart.is_product_in_cart(name).await?, "Product should be in cart")
            .context(name)
            .check()?;
    }
    Ok(())
}

async fn remove_item_from_cart(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;
    products.add_product_to_cart_by_name(BIKE_LIGHT).await?;

    let cart = products.go_to_cart().await?;
    cart.remove_item_by_name(BACKPACK).await?;
    Assertion::equals(&1, &cart.get_cart_item_count().await?)
        .context("Cart should have 1 item after removal")
        .check()?;
    Assertion::is_false(
        cart.is_product_in_cart("Sauce Labs Backpack").await?,
        "Sauce Labs Backpack should be removed from cart",
    )
    .check()?;
    Assertion::is_true(
        cart.is_product_in_cart("Sauce Labs Bike Light").await?,
        "Sauce Labs Bike Light should still be in cart",
    )
    .check()
}

async fn remove_all_items_from_cart(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_multiple_products_to_cart(3).await?;

    let cart = products.go_to_cart().await?;
    cart.remove_all_items().await?;
    Assertion::is_true(
        cart.is_cart_empty().await?,
        "Cart should be empty after removing all items",
    )
    .check()
}

async fn continue_shopping_navigation(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_first_product_to_cart().await?;

    let returned = products.go_to_cart().await?.continue_shopping().await?;
    Assertion::is_true(
        returned.is_products_page_displayed().await?,
        "User should be navigated back to Products page",
    )
    .check()?;
    Assertion::equals(&1, &returned.get_cart_badge_count().await)
        .context("Cart should still have 1 item after returning")
        .check()
}

async fn cart_persistence(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;

    let returned = products.go_to_cart().await?.continue_shopping().await?;
    returned.add_product_to_cart_by_name(BIKE_LIGHT).await?;

    let cart = returned.go_to_cart().await?;
    Assertion::equals(&2, &cart.get_cart_item_count().await?)
        .context("Cart should persist items and have 2 total")
        .check()
}

async fn cart_icon_updates(session: Session) -> ProbeResult<()> {
    let products = logged_in(session).await?;
    Assertion::is_false(
        products.is_cart_badge_displayed().await?,
        "Cart badge should not be visible initially",
    )
    .check()?;

    products.add_first_product_to_cart().await?;
    Assertion::equals(&1, &products.get_cart_badge_count().await).check()?;

    products.add_multiple_products_to_cart(2).await?;
    Assertion::equals(&3, &products.get_cart_badge_count().await)
        .context("Cart badge should update to show 3 items")
        .check()
}

// =============================================================================
// Checkout
// =============================================================================

fn checkout_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "test_checkout_page_display",
            &["checkout", "smoke"],
            "checkout opens at step one",
            |s| checkout_page_display(s).boxed(),
        ),
        Scenario::new(
            "test_valid_checkout_info",
            &["checkout", "smoke"],
            "valid details reach the overview",
            |s| valid_checkout_info(s).boxed(),
        ),
        Scenario::new(
            "test_checkout_empty_first_name",
            &["checkout", "regression"],
            "first name is required",
            |s| checkout_empty_first_name(s).boxed(),
        ),
        Scenario::new(
            "test_checkout_empty_last_name",
            &["checkout", "regression"],
            "last name is required",
            |s| checkout_empty_last_name(s).boxed(),
        ),
        Scenario::new(
            "test_checkout_empty_postal_code",
            &["checkout", "regression"],
            "postal code is required",
            |s| checkout_empty_postal_code(s).boxed(),
        ),
        Scenario::new(
            "test_checkout_overview_summary",
            &["checkout", "regression"],
            "overview shows subtotal, tax and total",
            |s| checkout_overview_summary(s).boxed(),
        ),
        Scenario::new(
            "test_complete_order_flow",
            &["checkout", "smoke"],
            "finish places the order",
            |s| complete_order_flow(s).boxed(),
        ),
        Scenario::new(
            "test_back_home_after_order",
            &["checkout", "regression"],
            "back home shows an empty cart",
            |s| back_home_after_order(s).boxed(),
        ),
        Scenario::new(
            "test_cancel_checkout",
            &["checkout", "regression"],
            "cancel returns to the cart",
            |s| cancel_checkout(s).boxed(),
        ),
        Scenario::new(
            "test_full_e2e_flow",
            &["checkout", "smoke"],
            "login, add three products, check out",
            |s| full_e2e_flow(s).boxed(),
        ),
    ]
}

/// Logged in with the backpack in the cart
async fn with_backpack(session: Session) -> ProbeResult<ProductsPage> {
    let products = logged_in(session).await?;
    products.add_product_to_cart_by_name(BACKPACK).await?;
    Ok(products)
}

async fn at_checkout(session: Session) -> ProbeResult<CheckoutPage> {
    with_backpack(session)
        .await?
        .go_to_cart()
        .await?
        .proceed_to_checkout()
        .await
}

async fn at_overview(session: Session) -> ProbeResult<CheckoutPage> {
    at_checkout(session)
        .await?
        .proceed_to_overview(FIRST_NAME, LAST_NAME, POSTAL_CODE)
        .await
}

async fn missing_field(
    session: Session,
    first_name: &str,
    last_name: &str,
    postal_code: &str,
    expected: &str,
) -> ProbeResult<()> {
    let checkout = at_checkout(session).await?;
    checkout
        .fill_checkout_info(first_name, last_name, postal_code)
        .await?;
    checkout.click_continue().await?;
    Assertion::is_true(checkout.is_error_displayed().await, "Error should be displayed")
        .context(expected)
        .check()?;
    Assertion::is_true(
        checkout.is_checkout_step_one_displayed().await?,
        "User should stay on the checkout information form",
    )
    .check()?;
    Assertion::contains(&checkout.get_error_message_text().await?, expected).check()
}

async fn checkout_page_display(session: Session) -> ProbeResult<()> {
    let checkout = at_checkout(session).await?;
    Assertion::is_true(
        checkout.is_checkout_step_one_displayed().await?,
        "Checkout Step One page should be displayed",
    )
    .check()
}

async fn valid_checkout_info(session: Session) -> ProbeResult<()> {
    let checkout = at_overview(session).await?;
    Assertion::is_true(
        checkout.is_checkout_step_two_displayed().await?,
        "User should proceed to checkout overview",
    )
    .check()
}

async fn checkout_empty_first_name(session: Session) -> ProbeResult<()> {
    missing_field(session, "", LAST_NAME, POSTAL_CODE, "First Name is required").await
}

async fn checkout_empty_last_name(session: Session) -> ProbeResult<()> {
    missing_field(session, FIRST_NAME, "", POSTAL_CODE, "Last Name is required").await
}

async fn checkout_empty_postal_code(session: Session) -> ProbeResult<()> {
    missing_field(session, FIRST_NAME, LAST_NAME, "", "Postal Code is required").await
}

async fn checkout_overview_summary(session: Session) -> ProbeResult<()> {
    let checkout = at_overview(session).await?;
    Assertion::contains(&checkout.get_subtotal().await?, "$")
        .context("Subtotal should display price")
        .check()?;
    Assertion::contains(&checkout.get_tax().await?, "$")
        .context("Tax should display amount")
        .check()?;
    Assertion::contains(&checkout.get_total().await?, "$")
        .context("Total should display final amount")
        .check()
}

async fn complete_order_flow(session: Session) -> ProbeResult<()> {
    let complete = at_overview(session).await?.click_finish().await?;
    Assertion::is_true(
        complete.is_checkout_complete_displayed().await?,
        "Checkout complete page should be displayed",
    )
    .check()?;
    Assertion::is_true(
        complete.is_order_successful().await?,
        "Order should be successful with thank you message",
    )
    .check()?;
    Assertion::contains(&complete.get_complete_header().await?, "Thank you").check()
}

async fn back_home_after_order(session: Session) -> ProbeResult<()> {
    let home = at_overview(session)
        .await?
        .click_finish()
        .await?
        .click_back_home()
        .await?;
    Assertion::is_true(
        home.is_products_page_displayed().await?,
        "User should be redirected to Products page",
    )
    .check()?;
    Assertion::is_false(
        home.is_cart_badge_displayed().await?,
        "Cart should be empty after completing order",
    )
    .check()
}

async fn cancel_checkout(session: Session) -> ProbeResult<()> {
    let cart: CartPage = at_checkout(session).await?.click_cancel().await?.into_cart()?;
    Assertion::is_true(
        cart.is_cart_page_displayed().await?,
        "Cancel should return user to cart page",
    )
    .check()?;
    Assertion::equals(&1, &cart.get_cart_item_count().await?)
        .context("Cart should still have the product")
        .check()
}

async fn full_e2e_flow(session: Session) -> ProbeResult<()> {
    let products = with_backpack(session).await?;
    products.add_product_to_cart_by_name(BIKE_LIGHT).await?;
    products.add_product_to_cart_by_name(BOLT_T_SHIRT).await?;
    Assertion::equals(&3, &products.get_cart_badge_count().await)
        .context("Cart should have 3 items")
        .check()?;

    let cart = products.go_to_cart().await?;
    Assertion::equals(&3, &cart.get_cart_item_count().await?).check()?;

    let overview = cart
        .proceed_to_checkout()
        .await?
        .proceed_to_overview(FIRST_NAME, LAST_NAME, POSTAL_CODE)
        .await?;
    Assertion::contains(&overview.get_total().await?, "$")
        .context("Total should show combined price")
        .check()?;

    let complete = overview.click_finish().await?;
    Assertion::is_true(
        complete.is_order_successful().await?,
        "Order should complete successfully",
    )
    .check()?;

    let home = complete.click_back_home().await?;
    Assertion::is_false(
        home.is_cart_badge_displayed().await?,
        "Cart should be empty after order",
    )
    .check()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::harness::ScenarioFilter;

    #[test]
    fn test_catalogue_counts() {
        let suite = suite();
        assert_eq!(suite.scenario_count(), 36);
        let count = |tag: &str| suite.filtered(&ScenarioFilter::new().with_tag(tag)).scenario_count();
        assert_eq!(count("login"), 8);
        assert_eq!(count("products"), 11);
        assert_eq!(count("cart"), 7);
        assert_eq!(count("checkout"), 10);
        assert_eq!(count("smoke") + count("regression"), 36);
    }

    #[test]
    fn test_names_unique() {
        let suite = suite();
        let mut names: Vec<_> = suite.scenarios().iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), suite.scenario_count());
    }

    #[test]
    fn test_every_scenario_has_a_page_tag() {
        for scenario in suite().scenarios() {
            assert!(
                ["login", "products", "cart", "checkout"]
                    .iter()
                    .any(|t| scenario.has_tag(t)),
                "{} has no page tag",
                scenario.name
            );
        }
    }
}
