//! Product listing (`inventory.html`).

use super::CartPage;
use crate::base_page::BasePage;
use crate::locator::{product_slug, By, Locator};
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::url_path;

/// Page object for the product listing
#[derive(Debug, Clone)]
pub struct ProductsPage {
    base: BasePage,
}

impl ProductsPage {
    // =========================================================================
    // Locators
    // =========================================================================

    pub const PAGE_TITLE: Locator = Locator::class_name("title");
    pub const PRODUCT_ITEMS: Locator = Locator::class_name("inventory_item");
    pub const PRODUCT_NAMES: Locator = Locator::class_name("inventory_item_name");
    pub const PRODUCT_PRICES: Locator = Locator::class_name("inventory_item_price");
    pub const ADD_TO_CART_BUTTONS: Locator = Locator::css("button[id^='add-to-cart']");
    pub const REMOVE_BUTTONS: Locator = Locator::css("button[id^='remove']");
    pub const CART_BADGE: Locator = Locator::class_name("shopping_cart_badge");
    pub const CART_LINK: Locator = Locator::class_name("shopping_cart_link");
    pub const SORT_DROPDOWN: Locator = Locator::class_name("product_sort_container");
    pub const BURGER_MENU_BUTTON: Locator = Locator::id("react-burger-menu-btn");
    pub const LOGOUT_LINK: Locator = Locator::id("logout_sidebar_link");

    /// `add-to-cart-<slug>` button for a product name
    #[must_use]
    pub fn add_to_cart_button(product_name: &str) -> Locator {
        Locator::dynamic(By::Id, format!("add-to-cart-{}", product_slug(product_name)))
    }

    /// `remove-<slug>` button for a product name
    #[must_use]
    pub fn remove_button(product_name: &str) -> Locator {
        Locator::dynamic(By::Id, format!("remove-{}", product_slug(product_name)))
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn get_page_title_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::PAGE_TITLE).await
    }

    /// Products currently listed
    pub async fn get_product_count(&self) -> ProbeResult<usize> {
        Ok(self.base.get_elements(&Self::PRODUCT_ITEMS).await?.len())
    }

    /// Click the first "Add to cart" button, if any
    pub async fn add_first_product_to_cart(&self) -> ProbeResult<()> {
        if let Some(button) = self
            .base
            .get_elements(&Self::ADD_TO_CART_BUTTONS)
            .await?
            .first()
        {
            button.click().await?;
        }
        Ok(())
    }

    pub async fn add_product_to_cart_by_name(&self, product_name: &str) -> ProbeResult<()> {
        tracing::info!(product = product_name, "adding to cart");
        self.base
            .click(&Self::add_to_cart_button(product_name))
            .await
    }

    pub async fn remove_product_from_cart_by_name(&self, product_name: &str) -> ProbeResult<()> {
        tracing::info!(product = product_name, "removing from cart");
        self.base.click(&Self::remove_button(product_name)).await
    }

    /// Add up to `count` products.
    ///
    /// Iteration `i` re-reads the "Add to cart" buttons and, if more than `i`
    /// remain, clicks the first of them.
    pub async fn add_multiple_products_to_cart(&self, count: usize) -> ProbeResult<()> {
        for i in 0..count {
            let buttons = self.base.get_elements(&Self::ADD_TO_CART_BUTTONS).await?;
            if i < buttons.len() {
                buttons[0].click().await?;
            }
        }
        Ok(())
    }

    pub async fn go_to_cart(self) -> ProbeResult<CartPage> {
        self.base.click(&Self::CART_LINK).await?;
        CartPage::arrive(self.into_session()).await
    }

    /// Choose a sort option by its value (`az`, `za`, `lohi`, `hilo`)
    pub async fn sort_by_option(&self, option_value: &str) -> ProbeResult<()> {
        self.base
            .select_by_value(&Self::SORT_DROPDOWN, option_value)
            .await
    }

    pub async fn sort_by_price_low_to_high(&self) -> ProbeResult<()> {
        self.sort_by_option("lohi").await
    }

    pub async fn sort_by_price_high_to_low(&self) -> ProbeResult<()> {
        self.sort_by_option("hilo").await
    }

    pub async fn sort_by_name_a_to_z(&self) -> ProbeResult<()> {
        self.sort_by_option("az").await
    }

    pub async fn sort_by_name_z_to_a(&self) -> ProbeResult<()> {
        self.sort_by_option("za").await
    }

    /// Log out through the side menu.
    ///
    /// No page object is returned; build a `LoginPage` from the session.
    pub async fn logout(self) -> ProbeResult<Session> {
        self.base.click(&Self::BURGER_MENU_BUTTON).await?;
        self.base
            .wait()
            .wait_for_element_clickable(&Self::LOGOUT_LINK)
            .await?;
        self.base.click(&Self::LOGOUT_LINK).await?;
        tracing::info!("logged out");
        Ok(self.into_session())
    }

    // =========================================================================
    // Verifications
    // =========================================================================

    pub async fn is_products_page_displayed(&self) -> ProbeResult<bool> {
        Ok(url_path(&self.base.current_url().await?).contains("inventory")
            && self.get_page_title_text().await? == "Products")
    }

    /// Number on the cart badge; 0 when there is no badge or it cannot be read
    pub async fn get_cart_badge_count(&self) -> u32 {
        if !self
            .base
            .is_element_present(&Self::CART_BADGE)
            .await
            .unwrap_or(false)
        {
            return 0;
        }
        match self.base.get_text(&Self::CART_BADGE).await {
            Ok(text) => parse_badge(&text),
            Err(e) => {
                tracing::warn!(error = %e, "cart badge unreadable");
                0
            }
        }
    }

    pub async fn is_cart_badge_displayed(&self) -> ProbeResult<bool> {
        self.base.is_element_present(&Self::CART_BADGE).await
    }

    /// Name of the first listed product, empty if none
    pub async fn get_first_product_name(&self) -> ProbeResult<String> {
        Ok(self
            .get_all_product_names()
            .await?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    /// Price label of the first listed product, empty if none
    pub async fn get_first_product_price(&self) -> ProbeResult<String> {
        Ok(self
            .get_all_product_prices()
            .await?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    pub async fn get_all_product_names(&self) -> ProbeResult<Vec<String>> {
        self.base.texts(&Self::PRODUCT_NAMES).await
    }

    pub async fn get_all_product_prices(&self) -> ProbeResult<Vec<String>> {
        self.base.texts(&Self::PRODUCT_PRICES).await
    }
}

impl PageObject for ProductsPage {
    fn page_name(&self) -> &'static str {
        "ProductsPage"
    }

    fn url_fragment(&self) -> Option<&'static str> {
        Some("inventory")
    }

    fn ready_locator(&self) -> Locator {
        Self::SORT_DROPDOWN
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn from_session(session: Session) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    fn into_session(self) -> Session {
        self.base.into_session()
    }
}

fn parse_badge(text: &str) -> u32 {
    text.trim().parse().unwrap_or_else(|e| {
        tracing::warn!(text, error = %e, "cart badge is not a number");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_badge() {
        assert_eq!(parse_badge(" 3 "), 3);
        assert_eq!(parse_badge("6"), 6);
    }

    #[test]
    fn test_non_numeric_badge_counts_as_zero() {
        assert_eq!(parse_badge("many"), 0);
        assert_eq!(parse_badge(""), 0);
        assert_eq!(parse_badge("-1"), 0);
    }

    #[test]
    fn test_slug_buttons() {
        assert_eq!(
            ProductsPage::add_to_cart_button("Sauce Labs Bike Light").value(),
            "add-to-cart-sauce-labs-bike-light"
        );
        assert_eq!(
            ProductsPage::remove_button("Test.allTheThings() T-Shirt (Red)").value(),
            "remove-test.allthethings()-t-shirt-(red)"
        );
    }
}
