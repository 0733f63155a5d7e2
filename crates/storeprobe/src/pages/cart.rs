//! Cart contents (`cart.html`).

use super::{CheckoutPage, ProductsPage};
use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::url_path;

/// Page object for the cart
#[derive(Debug, Clone)]
pub struct CartPage {
    base: BasePage,
}

impl CartPage {
    // =========================================================================
    // Locators
    // =========================================================================

    pub const PAGE_TITLE: Locator = Locator::class_name("title");
    pub const CART_ITEMS: Locator = Locator::class_name("cart_item");
    pub const CART_ITEM_NAMES: Locator = Locator::class_name("inventory_item_name");
    pub const CART_ITEM_PRICES: Locator = Locator::class_name("inventory_item_price");
    pub const REMOVE_BUTTONS: Locator = Locator::css("button[id^='remove']");
    pub const CONTINUE_SHOPPING_BUTTON: Locator = Locator::id("continue-shopping");
    pub const CHECKOUT_BUTTON: Locator = Locator::id("checkout");
    pub const CART_QUANTITY: Locator = Locator::class_name("cart_quantity");

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn get_page_title_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::PAGE_TITLE).await
    }

    pub async fn get_cart_item_count(&self) -> ProbeResult<usize> {
        Ok(self.base.get_elements(&Self::CART_ITEMS).await?.len())
    }

    pub async fn get_cart_item_names(&self) -> ProbeResult<Vec<String>> {
        self.base.texts(&Self::CART_ITEM_NAMES).await
    }

    pub async fn get_cart_item_prices(&self) -> ProbeResult<Vec<String>> {
        self.base.texts(&Self::CART_ITEM_PRICES).await
    }

    pub async fn remove_first_item(&self) -> ProbeResult<()> {
        if let Some(button) = self.base.get_elements(&Self::REMOVE_BUTTONS).await?.first() {
            button.click().await?;
        }
        Ok(())
    }

    pub async fn remove_item_by_name(&self, product_name: &str) -> ProbeResult<()> {
        self.base
            .click(&ProductsPage::remove_button(product_name))
            .await
    }

    /// Click "Remove" until no remove button is left
    pub async fn remove_all_items(&self) -> ProbeResult<()> {
        let mut buttons = self.base.get_elements(&Self::REMOVE_BUTTONS).await?;
        while let Some(first) = buttons.first() {
            let before = buttons.len();
            first.click().await?;
            buttons = self.base.get_elements(&Self::REMOVE_BUTTONS).await?;
            if buttons.len() >= before {
                return Err(ProbeError::InvalidState {
                    message: format!("cart still lists {} removable items", buttons.len()),
                });
            }
        }
        Ok(())
    }

    pub async fn continue_shopping(self) -> ProbeResult<ProductsPage> {
        self.base.click(&Self::CONTINUE_SHOPPING_BUTTON).await?;
        ProductsPage::arrive(self.into_session()).await
    }

    pub async fn proceed_to_checkout(self) -> ProbeResult<CheckoutPage> {
        self.base.click(&Self::CHECKOUT_BUTTON).await?;
        CheckoutPage::arrive(self.into_session()).await
    }

    // =========================================================================
    // Verifications
    // =========================================================================

    pub async fn is_cart_page_displayed(&self) -> ProbeResult<bool> {
        Ok(url_path(&self.base.current_url().await?).contains("cart")
            && self.get_page_title_text().await? == "Your Cart")
    }

    pub async fn is_cart_empty(&self) -> ProbeResult<bool> {
        Ok(self.get_cart_item_count().await? == 0)
    }

    pub async fn is_product_in_cart(&self, product_name: &str) -> ProbeResult<bool> {
        Ok(self
            .get_cart_item_names()
            .await?
            .iter()
            .any(|name| name == product_name))
    }
}

impl PageObject for CartPage {
    fn page_name(&self) -> &'static str {
        "CartPage"
    }

    fn url_fragment(&self) -> Option<&'static str> {
        Some("cart")
    }

    fn ready_locator(&self) -> Locator {
        Self::CHECKOUT_BUTTON
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
