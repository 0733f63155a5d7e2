//! Checkout flow: information form, order overview and confirmation.

use super::{CartPage, ProductsPage};
use crate::base_page::BasePage;
use crate::locator::Locator;
use crate::page_object::{Page, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{url_path, Condition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which checkout screen a [`CheckoutPage`] stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// `checkout-step-one.html`: shipping information
    StepOne,
    /// `checkout-step-two.html`: order overview
    StepTwo,
    /// `checkout-complete.html`: confirmation
    Complete,
}

impl CheckoutStep {
    /// URL fragment of this step
    #[must_use]
    pub const fn url_fragment(self) -> &'static str {
        match self {
            Self::StepOne => "checkout-step-one",
            Self::StepTwo => "checkout-step-two",
            Self::Complete => "checkout-complete",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StepOne => "step one",
            Self::StepTwo => "step two",
            Self::Complete => "complete",
        })
    }
}

/// Page object for all three checkout screens
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    base: BasePage,
    step: CheckoutStep,
}

impl CheckoutPage {
    // =========================================================================
    // Locators: step one
    // =========================================================================

    pub const PAGE_TITLE: Locator = Locator::class_name("title");
    pub const FIRST_NAME_INPUT: Locator = Locator::id("first-name");
    pub const LAST_NAME_INPUT: Locator = Locator::id("last-name");
    pub const POSTAL_CODE_INPUT: Locator = Locator::id("postal-code");
    pub const CONTINUE_BUTTON: Locator = Locator::id("continue");
    pub const CANCEL_BUTTON: Locator = Locator::id("cancel");
    pub const ERROR_MESSAGE: Locator = Locator::css("[data-test='error']");

    // =========================================================================
    // Locators: step two (overview)
    // =========================================================================

    pub const SUMMARY_SUBTOTAL: Locator = Locator::class_name("summary_subtotal_label");
    pub const SUMMARY_TAX: Locator = Locator::class_name("summary_tax_label");
    pub const SUMMARY_TOTAL: Locator = Locator::class_name("summary_total_label");
    pub const FINISH_BUTTON: Locator = Locator::id("finish");

    // =========================================================================
    // Locators: complete
    // =========================================================================

    pub const COMPLETE_HEADER: Locator = Locator::class_name("complete-header");
    pub const COMPLETE_TEXT: Locator = Locator::class_name("complete-text");
    pub const BACK_HOME_BUTTON: Locator = Locator::id("back-to-products");

    /// Bind to a session that is on `step`
    #[must_use]
    pub fn at_step(session: Session, step: CheckoutStep) -> Self {
        Self {
            base: BasePage::new(session),
            step,
        }
    }

    /// Step this page object stands for
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    // =========================================================================
    // Step one
    // =========================================================================

    pub async fn enter_first_name(&self, first_name: &str) -> ProbeResult<()> {
        self.base.type_text(&Self::FIRST_NAME_INPUT, first_name).await
    }

    pub async fn enter_last_name(&self, last_name: &str) -> ProbeResult<()> {
        self.base.type_text(&Self::LAST_NAME_INPUT, last_name).await
    }

    pub async fn enter_postal_code(&self, postal_code: &str) -> ProbeResult<()> {
        self.base
            .type_text(&Self::POSTAL_CODE_INPUT, postal_code)
            .await
    }

    pub async fn fill_checkout_info(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> ProbeResult<()> {
        self.enter_first_name(first_name).await?;
        self.enter_last_name(last_name).await?;
        self.enter_postal_code(postal_code).await
    }

    pub async fn click_continue(&self) -> ProbeResult<()> {
        self.base.click(&Self::CONTINUE_BUTTON).await
    }

    /// Leave checkout. Step one returns to the cart, the overview to the
    /// product listing.
    pub async fn click_cancel(self) -> ProbeResult<Page> {
        self.base.click(&Self::CANCEL_BUTTON).await?;
        let target = self
            .base
            .wait()
            .wait_for_any(&[
                Condition::PathContains("cart".to_string()),
                Condition::PathContains("inventory".to_string()),
            ])
            .await?;
        let session = self.into_session();
        Ok(if target == 0 {
            CartPage::arrive(session).await?.into()
        } else {
            ProductsPage::arrive(session).await?.into()
        })
    }

    /// Fill the form and continue.
    ///
    /// Resolves as soon as either the overview loads or the form shows a
    /// validation error. In the error case the returned page is still at
    /// [`CheckoutStep::StepOne`].
    pub async fn proceed_to_overview(
        self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> ProbeResult<Self> {
        self.require(CheckoutStep::StepOne)?;
        self.fill_checkout_info(first_name, last_name, postal_code)
            .await?;
        self.click_continue().await?;

        let outcome = self
            .base
            .wait()
            .wait_for_any(&[
                Condition::PathContains(CheckoutStep::StepTwo.url_fragment().to_string()),
                Condition::Visible(Self::ERROR_MESSAGE),
            ])
            .await?;

        if outcome == 0 {
            let overview = Self::at_step(self.into_session(), CheckoutStep::StepTwo);
            overview.wait_until_loaded().await?;
            Ok(overview)
        } else {
            tracing::info!("checkout information rejected");
            Ok(self)
        }
    }

    // =========================================================================
    // Step two
    // =========================================================================

    pub async fn get_subtotal(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::SUMMARY_SUBTOTAL).await
    }

    pub async fn get_tax(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::SUMMARY_TAX).await
    }

    pub async fn get_total(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::SUMMARY_TOTAL).await
    }

    pub async fn click_finish(self) -> ProbeResult<Self> {
        self.base.click(&Self::FINISH_BUTTON).await?;
        let complete = Self::at_step(self.into_session(), CheckoutStep::Complete);
        complete.wait_until_loaded().await?;
        tracing::info!("order placed");
        Ok(complete)
    }

    // =========================================================================
    // Complete
    // =========================================================================

    pub async fn get_complete_header(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::COMPLETE_HEADER).await
    }

    pub async fn get_complete_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::COMPLETE_TEXT).await
    }

    pub async fn click_back_home(self) -> ProbeResult<ProductsPage> {
        self.base.click(&Self::BACK_HOME_BUTTON).await?;
        ProductsPage::arrive(self.into_session()).await
    }

    // =========================================================================
    // Verifications
    // =========================================================================

    pub async fn get_page_title_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::PAGE_TITLE).await
    }

    pub async fn is_checkout_step_one_displayed(&self) -> ProbeResult<bool> {
        self.url_contains(CheckoutStep::StepOne).await
    }

    pub async fn is_checkout_step_two_displayed(&self) -> ProbeResult<bool> {
        self.url_contains(CheckoutStep::StepTwo).await
    }

    pub async fn is_checkout_complete_displayed(&self) -> ProbeResult<bool> {
        self.url_contains(CheckoutStep::Complete).await
    }

    pub async fn is_order_successful(&self) -> ProbeResult<bool> {
        Ok(self
            .get_complete_header()
            .await?
            .contains("Thank you for your order"))
    }

    pub async fn is_error_displayed(&self) -> bool {
        self.base.is_displayed(&Self::ERROR_MESSAGE).await
    }

    pub async fn get_error_message_text(&self) -> ProbeResult<String> {
        self.base.get_text(&Self::ERROR_MESSAGE).await
    }

    async fn url_contains(&self, step: CheckoutStep) -> ProbeResult<bool> {
        let url = self.base.current_url().await?;
        Ok(url_path(&url).contains(step.url_fragment()))
    }

    fn require(&self, step: CheckoutStep) -> ProbeResult<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(ProbeError::InvalidState {
                message: format!("checkout is at {}, expected {step}", self.step),
            })
        }
    }
}

impl PageObject for CheckoutPage {
    fn page_name(&self) -> &'static str {
        "CheckoutPage"
    }

    fn url_fragment(&self) -> Option<&'static str> {
        Some(self.step.url_fragment())
    }

    fn ready_locator(&self) -> Locator {
        match self.step {
            CheckoutStep::StepOne => Self::FIRST_NAME_INPUT,
            CheckoutStep::StepTwo => Self::FINISH_BUTTON,
            CheckoutStep::Complete => Self::COMPLETE_HEADER,
        }
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    /// Checkout is entered at step one
    fn from_session(session: Session) -> Self {
        Self::at_step(session, CheckoutStep::StepOne)
    }

    fn into_session(self) -> Session {
        self.base.into_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_fragments() {
        assert_eq!(CheckoutStep::StepOne.url_fragment(), "checkout-step-one");
        assert_eq!(CheckoutStep::StepTwo.url_fragment(), "checkout-step-two");
        assert_eq!(CheckoutStep::Complete.url_fragment(), "checkout-complete");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(CheckoutStep::StepTwo.to_string(), "step two");
    }
}
