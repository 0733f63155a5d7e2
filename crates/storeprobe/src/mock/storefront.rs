//! In-process model of the Swag Labs storefront.
//!
//! Holds the application state (session user, cart, sort order, form fields,
//! error banner) and renders it into a flat list of [`Node`]s carrying the
//! same ids, classes and `data-test` attributes as the real site. Locators are
//! resolved against that render.

use crate::locator::{product_slug, By, Locator};
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Password every demo account shares
pub const DEMO_PASSWORD: &str = "secret_sauce";

/// Accounts the storefront recognises
pub const DEMO_USERS: [&str; 6] = [
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

const LOCKED_USER: &str = "locked_out_user";
const TAX_PERCENT: u32 = 8;

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Price in cents
    pub price_cents: u32,
}

impl Product {
    /// Price as shown on the site (`$29.99`)
    #[must_use]
    pub fn price_label(&self) -> String {
        money(self.price_cents)
    }
}

/// The six products, in name order
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
        price_cents: 2999,
    },
    Product {
        name: "Sauce Labs Bike Light",
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night.",
        price_cents: 999,
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
        price_cents: 1599,
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        description: "A midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
        price_cents: 4999,
    },
    Product {
        name: "Sauce Labs Onesie",
        description: "Rib snap infant onesie for the junior automation engineer in development.",
        price_cents: 799,
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests.",
        price_cents: 1599,
    },
];

fn money(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Which page the storefront is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login form
    Login,
    /// Product listing
    Inventory,
    /// Cart contents
    Cart,
    /// Shipping information form
    CheckoutStepOne,
    /// Order overview
    CheckoutStepTwo,
    /// Order confirmation
    CheckoutComplete,
}

impl Screen {
    /// Path relative to the site origin
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "",
            Self::Inventory => "inventory.html",
            Self::Cart => "cart.html",
            Self::CheckoutStepOne => "checkout-step-one.html",
            Self::CheckoutStepTwo => "checkout-step-two.html",
            Self::CheckoutComplete => "checkout-complete.html",
        }
    }

    /// Text of the `title` header, absent on the login page
    #[must_use]
    pub const fn heading(self) -> Option<&'static str> {
        match self {
            Self::Login => None,
            Self::Inventory => Some("Products"),
            Self::Cart => Some("Your Cart"),
            Self::CheckoutStepOne => Some("Checkout: Your Information"),
            Self::CheckoutStepTwo => Some("Checkout: Overview"),
            Self::CheckoutComplete => Some("Checkout: Complete!"),
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        [
            Self::Inventory,
            Self::Cart,
            Self::CheckoutStepOne,
            Self::CheckoutStepTwo,
            Self::CheckoutComplete,
        ]
        .into_iter()
        .find(|s| s.path() == path)
        .or_else(|| matches!(path, "" | "index.html").then_some(Self::Login))
    }
}

/// Product ordering on the inventory page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Name (A to Z)
    #[default]
    NameAsc,
    /// Name (Z to A)
    NameDesc,
    /// Price (low to high)
    PriceAsc,
    /// Price (high to low)
    PriceDesc,
}

impl SortOrder {
    /// Parse a `<select>` option value
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "az" => Some(Self::NameAsc),
            "za" => Some(Self::NameDesc),
            "lohi" => Some(Self::PriceAsc),
            "hilo" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    /// Visible option label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Name (A to Z)",
            Self::NameDesc => "Name (Z to A)",
            Self::PriceAsc => "Price (low to high)",
            Self::PriceDesc => "Price (high to low)",
        }
    }

    fn arrange(self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..CATALOG.len()).collect();
        match self {
            Self::NameAsc => order.sort_by_key(|&i| CATALOG[i].name),
            Self::NameDesc => order.sort_by(|&a, &b| CATALOG[b].name.cmp(CATALOG[a].name)),
            Self::PriceAsc => order.sort_by_key(|&i| CATALOG[i].price_cents),
            Self::PriceDesc => {
                order.sort_by(|&a, &b| CATALOG[b].price_cents.cmp(&CATALOG[a].price_cents));
            }
        }
        order
    }
}

/// Text inputs the storefront tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `user-name`
    Username,
    /// `password`
    Password,
    /// `first-name`
    FirstName,
    /// `last-name`
    LastName,
    /// `postal-code`
    PostalCode,
}

impl Field {
    /// Element id of the input
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Username => "user-name",
            Self::Password => "password",
            Self::FirstName => "first-name",
            Self::LastName => "last-name",
            Self::PostalCode => "postal-code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Login,
    AddToCart(usize),
    Remove(usize),
    OpenCart,
    OpenMenu,
    CloseMenu,
    AllItems,
    Logout,
    ResetApp,
    ContinueShopping,
    Checkout,
    Continue,
    Cancel,
    Finish,
    BackHome,
    DismissError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Static,
    Input(Field),
    Select,
    Button(Action),
}

/// One rendered element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Identity within one screen; a vanished key means a stale handle
    pub key: String,
    /// Tag name
    pub tag: &'static str,
    /// `id` attribute
    pub id: Option<String>,
    /// `class` attribute entries
    pub classes: Vec<&'static str>,
    /// `data-test` attribute
    pub data_test: Option<String>,
    /// Rendered text (empty for inputs)
    pub text: String,
    /// Visible on screen
    pub displayed: bool,
    /// Accepts interaction
    pub enabled: bool,
    kind: NodeKind,
}

impl Node {
    fn new(tag: &'static str, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tag,
            id: None,
            classes: Vec::new(),
            data_test: None,
            text: String::new(),
            displayed: true,
            enabled: true,
            kind: NodeKind::Static,
        }
    }

    fn with_id(tag: &'static str, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut node = Self::new(tag, id.clone());
        node.data_test = Some(id.clone());
        node.id = Some(id);
        node
    }

    fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn data_test(mut self, value: impl Into<String>) -> Self {
        self.data_test = Some(value.into());
        self
    }

    fn shown(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    const fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    fn attr(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => (!self.classes.is_empty()).then(|| self.classes.join(" ")),
            "data-test" => self.data_test.clone(),
            _ => None,
        }
    }

    fn matches(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(match locator.by() {
            By::Id => self.id.as_deref() == Some(locator.value()),
            By::ClassName => self.classes.contains(&locator.value()),
            By::Css => CssSelector::parse(locator.value())?.matches(self),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Word(String),
}

/// The compound selectors the page objects use: `tag#id.class[attr='v']`.
/// Combinators are rejected.
#[derive(Debug, Default)]
struct CssSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

impl CssSelector {
    fn parse(selector: &str) -> ProbeResult<Self> {
        let unsupported = || ProbeError::driver(format!("unsupported selector: {selector}"));
        let mut parsed = Self::default();
        let mut rest = selector.trim();
        if rest.is_empty() {
            return Err(unsupported());
        }

        let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(unsupported());
            }
            parsed.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body.find(['#', '.', '[']).unwrap_or(body.len());
                    let name = &body[..end];
                    if name.is_empty() || name.contains(char::is_whitespace) {
                        return Err(unsupported());
                    }
                    if first == '#' {
                        parsed.id = Some(name.to_string());
                    } else {
                        parsed.classes.push(name.to_string());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let end = rest.find(']').ok_or_else(unsupported)?;
                    parsed.attrs.push(Self::parse_attr(&rest[1..end]).ok_or_else(unsupported)?);
                    rest = &rest[end + 1..];
                }
                _ => return Err(unsupported()),
            }
        }
        Ok(parsed)
    }

    fn parse_attr(body: &str) -> Option<(String, AttrOp)> {
        let unquote = |v: &str| {
            let v = v.trim();
            v.strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| v.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .unwrap_or(v)
                .replace("\\\"", "\"")
                .replace("\\\\", "\\")
        };
        let Some(eq) = body.find('=') else {
            let name = body.trim();
            return (!name.is_empty()).then(|| (name.to_string(), AttrOp::Exists));
        };
        let value = unquote(&body[eq + 1..]);
        let (name, op) = match body[..eq].trim_end() {
            n if n.ends_with('^') => (&n[..n.len() - 1], AttrOp::Prefix(value)),
            n if n.ends_with('~') => (&n[..n.len() - 1], AttrOp::Word(value)),
            n => (n, AttrOp::Equals(value)),
        };
        Some((name.trim().to_string(), op))
    }

    fn matches(&self, node: &Node) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != node.tag) {
            return false;
        }
        if self.id.is_some() && self.id != node.id {
            return false;
        }
        if !self.classes.iter().all(|c| node.classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, op)| {
            let Some(actual) = node.attr(name) else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => actual == *v,
                AttrOp::Prefix(v) => actual.starts_with(v.as_str()),
                AttrOp::Word(v) => actual.split_whitespace().any(|w| w == v),
            }
        })
    }
}

/// Simulated storefront state.
#[derive(Debug)]
pub struct Storefront {
    origin: String,
    screen: Screen,
    user: Option<String>,
    cart: Vec<usize>,
    sort: SortOrder,
    menu_open: bool,
    fields: HashMap<Field, String>,
    error: Option<String>,
    epoch: u64,
    shown_at: Instant,
    render_delay: Duration,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}

impl Storefront {
    /// Origin used until the first navigation
    pub const BASE_URL: &'static str = "https://www.saucedemo.com/";

    /// Fresh storefront on the login page
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Self::BASE_URL.to_string(),
            screen: Screen::Login,
            user: None,
            cart: Vec::new(),
            sort: SortOrder::default(),
            menu_open: false,
            fields: HashMap::new(),
            error: None,
            epoch: 0,
            shown_at: Instant::now(),
            render_delay: Duration::ZERO,
        }
    }

    /// Hide every element for `delay` after each page change
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Page being shown
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Increments on every page change
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Products in the cart, in the order added
    #[must_use]
    pub fn cart(&self) -> Vec<&'static str> {
        self.cart.iter().map(|&i| CATALOG[i].name).collect()
    }

    /// Logged-in account
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Current value of a text input
    #[must_use]
    pub fn field_value(&self, field: Field) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    /// Absolute URL of the current page
    #[must_use]
    pub fn current_url(&self) -> String {
        format!("{}{}", self.origin, self.screen.path())
    }

    /// Document title
    #[must_use]
    pub const fn title(&self) -> &'static str {
        "Swag Labs"
    }

    /// Load a URL, honouring the login guard
    pub fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        let (origin, path) = split_url(url);
        let screen = Screen::from_path(&path).ok_or_else(|| ProbeError::Navigation {
            url: url.to_string(),
            message: "404 Not Found".to_string(),
        })?;
        self.origin = origin;
        if screen != Screen::Login && self.user.is_none() {
            self.show(Screen::Login);
            self.error = Some(format!(
                "Epic sadface: You can only access '/{}' when you are logged in.",
                screen.path()
            ));
            return Ok(());
        }
        self.show(screen);
        Ok(())
    }

    fn show(&mut self, screen: Screen) {
        tracing::trace!(?screen, "storefront page change");
        if matches!(screen, Screen::Login | Screen::CheckoutStepOne) {
            self.fields.clear();
        }
        self.screen = screen;
        self.error = None;
        self.menu_open = false;
        self.epoch += 1;
        self.shown_at = Instant::now();
    }

    /// Elements matching `locator` in the current render
    pub fn find(&self, locator: &Locator) -> ProbeResult<Vec<Node>> {
        let mut found = Vec::new();
        for node in self.render() {
            if node.matches(locator)? {
                found.push(node);
            }
        }
        Ok(found)
    }

    /// Node with `key` if it is still rendered
    #[must_use]
    pub fn node(&self, key: &str) -> Option<Node> {
        self.render().into_iter().find(|n| n.key == key)
    }

    /// Click the element with `key`
    pub fn click(&mut self, key: &str) -> ProbeResult<()> {
        let node = self.interactable(key)?;
        match node.kind {
            NodeKind::Button(action) => self.perform(action),
            NodeKind::Static | NodeKind::Input(_) | NodeKind::Select => {}
        }
        Ok(())
    }

    /// Empty a text input
    pub fn clear(&mut self, key: &str) -> ProbeResult<()> {
        let field = self.input(key)?;
        self.fields.insert(field, String::new());
        Ok(())
    }

    /// Append text to an input
    pub fn send_keys(&mut self, key: &str, text: &str) -> ProbeResult<()> {
        let field = self.input(key)?;
        self.fields.entry(field).or_default().push_str(text);
        Ok(())
    }

    /// Choose a sort option
    pub fn select(&mut self, key: &str, value: &str) -> ProbeResult<()> {
        let node = self.interactable(key)?;
        if node.kind != NodeKind::Select {
            return Err(ProbeError::driver(format!(
                "Select only works on <select> elements, not on <{}>",
                node.tag
            )));
        }
        self.sort = SortOrder::from_value(value).ok_or_else(|| ProbeError::NoSuchOption {
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn interactable(&self, key: &str) -> ProbeResult<Node> {
        let node = self.node(key).ok_or_else(|| ProbeError::StaleElement {
            locator: key.to_string(),
        })?;
        if !node.displayed || !node.enabled {
            return Err(ProbeError::driver(format!(
                "element not interactable: {key}"
            )));
        }
        Ok(node)
    }

    fn input(&self, key: &str) -> ProbeResult<Field> {
        match self.interactable(key)?.kind {
            NodeKind::Input(field) => Ok(field),
            _ => Err(ProbeError::driver(format!("invalid element state: {key} is not editable"))),
        }
    }

    fn perform(&mut self, action: Action) {
        tracing::trace!(?action, "storefront action");
        match action {
            Action::Login => self.login(),
            Action::AddToCart(index) => {
                if !self.cart.contains(&index) {
                    self.cart.push(index);
                }
            }
            Action::Remove(index) => self.cart.retain(|&i| i != index),
            Action::OpenCart => self.show(Screen::Cart),
            Action::OpenMenu => self.menu_open = true,
            Action::CloseMenu => self.menu_open = false,
            Action::AllItems | Action::ContinueShopping | Action::BackHome => {
                self.show(Screen::Inventory);
            }
            Action::Logout => {
                self.user = None;
                self.show(Screen::Login);
            }
            Action::ResetApp => {
                self.cart.clear();
                self.sort = SortOrder::default();
            }
            Action::Checkout => self.show(Screen::CheckoutStepOne),
            Action::Continue => self.submit_information(),
            Action::Cancel => match self.screen {
                Screen::CheckoutStepOne => self.show(Screen::Cart),
                _ => self.show(Screen::Inventory),
            },
            Action::Finish => {
                self.cart.clear();
                self.show(Screen::CheckoutComplete);
            }
            Action::DismissError => self.error = None,
        }
    }

    fn login(&mut self) {
        let username = self.field_value(Field::Username).to_string();
        let password = self.field_value(Field::Password).to_string();
        let error = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if !DEMO_USERS.contains(&username.as_str()) || password != DEMO_PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if username == LOCKED_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else {
            None
        };

        match error {
            Some(message) => self.error = Some(message.to_string()),
            None => {
                self.user = Some(username);
                self.show(Screen::Inventory);
            }
        }
    }

    fn submit_information(&mut self) {
        let missing = [
            (Field::FirstName, "Error: First Name is required"),
            (Field::LastName, "Error: Last Name is required"),
            (Field::PostalCode, "Error: Postal Code is required"),
        ]
        .into_iter()
        .find(|(field, _)| self.field_value(*field).is_empty());

        match missing {
            Some((_, message)) => self.error = Some(message.to_string()),
            None => self.show(Screen::CheckoutStepTwo),
        }
    }

    /// Item total, tax and total in cents
    #[must_use]
    pub fn summary(&self) -> (u32, u32, u32) {
        let subtotal: u32 = self.cart.iter().map(|&i| CATALOG[i].price_cents).sum();
        let tax = (subtotal * TAX_PERCENT + 50) / 100;
        (subtotal, tax, subtotal + tax)
    }

    /// Render the current page. Empty while the render delay is running.
    #[must_use]
    pub fn render(&self) -> Vec<Node> {
        if self.shown_at.elapsed() < self.render_delay {
            return Vec::new();
        }
        let mut nodes = Vec::new();
        match self.screen {
            Screen::Login => self.render_login(&mut nodes),
            screen => {
                self.render_header(screen, &mut nodes);
                match screen {
                    Screen::Inventory => self.render_inventory(&mut nodes),
                    Screen::Cart => self.render_cart(&mut nodes),
                    Screen::CheckoutStepOne => self.render_information(&mut nodes),
                    Screen::CheckoutStepTwo => self.render_overview(&mut nodes),
                    Screen::CheckoutComplete => render_complete(&mut nodes),
                    Screen::Login => {}
                }
            }
        }
        nodes
    }

    fn render_error(&self, nodes: &mut Vec<Node>) {
        if let Some(error) = &self.error {
            nodes.push(Node::new("h3", "error").data_test("error").text(error.clone()));
            nodes.push(
                Node::new("button", "error-button")
                    .class("error-button")
                    .kind(NodeKind::Button(Action::DismissError)),
            );
        }
    }

    fn render_input(&self, field: Field, nodes: &mut Vec<Node>) {
        let mut node = Node::with_id("input", field.id()).kind(NodeKind::Input(field));
        if self.error.is_some() {
            node = node.class("error");
        }
        nodes.push(node.class("input_error").class("form_input"));
    }

    fn render_login(&self, nodes: &mut Vec<Node>) {
        nodes.push(Node::new("div", "login_logo").class("login_logo").text("Swag Labs"));
        self.render_input(Field::Username, nodes);
        self.render_input(Field::Password, nodes);
        self.render_error(nodes);
        nodes.push(
            Node::with_id("input", "login-button")
                .class("submit-button")
                .class("btn_action")
                .kind(NodeKind::Button(Action::Login)),
        );
    }

    fn render_header(&self, screen: Screen, nodes: &mut Vec<Node>) {
        nodes.push(Node::new("div", "app_logo").class("app_logo").text("Swag Labs"));
        nodes.push(
            Node::with_id("button", "react-burger-menu-btn")
                .text("Open Menu")
                .kind(NodeKind::Button(Action::OpenMenu)),
        );
        for (id, label, action) in [
            ("inventory_sidebar_link", "All Items", Action::AllItems),
            ("about_sidebar_link", "About", Action::AllItems),
            ("logout_sidebar_link", "Logout", Action::Logout),
            ("reset_sidebar_link", "Reset App State", Action::ResetApp),
        ] {
            nodes.push(
                Node::with_id("a", id)
                    .class("bm-item")
                    .class("menu-item")
                    .text(label)
                    .shown(self.menu_open)
                    .kind(NodeKind::Button(action)),
            );
        }
        nodes.push(
            Node::with_id("button", "react-burger-cross-btn")
                .text("Close Menu")
                .shown(self.menu_open)
                .kind(NodeKind::Button(Action::CloseMenu)),
        );
        nodes.push(
            Node::new("a", "shopping_cart_link")
                .class("shopping_cart_link")
                .data_test("shopping-cart-link")
                .kind(NodeKind::Button(Action::OpenCart)),
        );
        if !self.cart.is_empty() {
            nodes.push(
                Node::new("span", "shopping_cart_badge")
                    .class("shopping_cart_badge")
                    .data_test("shopping-cart-badge")
                    .text(self.cart.len().to_string()),
            );
        }
        if let Some(heading) = screen.heading() {
            nodes.push(Node::new("span", "title").class("title").data_test("title").text(heading));
        }
    }

    fn render_inventory(&self, nodes: &mut Vec<Node>) {
        nodes.push(
            Node::new("select", "product_sort_container")
                .class("product_sort_container")
                .data_test("product-sort-container")
                .kind(NodeKind::Select),
        );
        nodes.push(Node::new("span", "active_option").class("active_option").text(self.sort.label()));
        for index in self.sort.arrange() {
            let slug = product_slug(CATALOG[index].name);
            nodes.push(Node::new("div", format!("item:{slug}")).class("inventory_item"));
            render_item(index, nodes);
            nodes.push(self.cart_button(index));
        }
    }

    fn cart_button(&self, index: usize) -> Node {
        let slug = product_slug(CATALOG[index].name);
        if self.cart.contains(&index) {
            Node::with_id("button", format!("remove-{slug}"))
                .class("btn")
                .class("btn_secondary")
                .class("btn_inventory")
                .text("Remove")
                .kind(NodeKind::Button(Action::Remove(index)))
        } else {
            Node::with_id("button", format!("add-to-cart-{slug}"))
                .class("btn")
                .class("btn_primary")
                .class("btn_inventory")
                .text("Add to cart")
                .kind(NodeKind::Button(Action::AddToCart(index)))
        }
    }

    fn render_cart_items(&self, removable: bool, nodes: &mut Vec<Node>) {
        for &index in &self.cart {
            let slug = product_slug(CATALOG[index].name);
            nodes.push(Node::new("div", format!("cart_item:{slug}")).class("cart_item"));
            nodes.push(Node::new("div", format!("qty:{slug}")).class("cart_quantity").text("1"));
            render_item(index, nodes);
            if removable {
                nodes.push(self.cart_button(index));
            }
        }
    }

    fn render_cart(&self, nodes: &mut Vec<Node>) {
        self.render_cart_items(true, nodes);
        nodes.push(
            Node::with_id("button", "continue-shopping")
                .class("btn_secondary")
                .text("Continue Shopping")
                .kind(NodeKind::Button(Action::ContinueShopping)),
        );
        nodes.push(
            Node::with_id("button", "checkout")
                .class("btn_action")
                .text("Checkout")
                .kind(NodeKind::Button(Action::Checkout)),
        );
    }

    fn render_information(&self, nodes: &mut Vec<Node>) {
        self.render_input(Field::FirstName, nodes);
        self.render_input(Field::LastName, nodes);
        self.render_input(Field::PostalCode, nodes);
        self.render_error(nodes);
        nodes.push(
            Node::with_id("button", "cancel")
                .class("btn_secondary")
                .text("Cancel")
                .kind(NodeKind::Button(Action::Cancel)),
        );
        nodes.push(
            Node::with_id("input", "continue")
                .class("submit-button")
                .class("btn_primary")
                .kind(NodeKind::Button(Action::Continue)),
        );
    }

    fn render_overview(&self, nodes: &mut Vec<Node>) {
        self.render_cart_items(false, nodes);
        let (subtotal, tax, total) = self.summary();
        nodes.push(
            Node::new("div", "summary_subtotal_label")
                .class("summary_subtotal_label")
                .text(format!("Item total: {}", money(subtotal))),
        );
        nodes.push(
            Node::new("div", "summary_tax_label")
                .class("summary_tax_label")
                .text(format!("Tax: {}", money(tax))),
        );
        nodes.push(
            Node::new("div", "summary_total_label")
                .class("summary_info_label")
                .class("summary_total_label")
                .text(format!("Total: {}", money(total))),
        );
        nodes.push(
            Node::with_id("button", "cancel")
                .class("btn_secondary")
                .text("Cancel")
                .kind(NodeKind::Button(Action::Cancel)),
        );
        nodes.push(
            Node::with_id("button", "finish")
                .class("btn_action")
                .text("Finish")
                .kind(NodeKind::Button(Action::Finish)),
        );
    }
}

fn render_item(index: usize, nodes: &mut Vec<Node>) {
    let product = &CATALOG[index];
    let slug = product_slug(product.name);
    nodes.push(
        Node::new("div", format!("name:{slug}"))
            .class("inventory_item_name")
            .text(product.name),
    );
    nodes.push(
        Node::new("div", format!("desc:{slug}"))
            .class("inventory_item_desc")
            .text(product.description),
    );
    nodes.push(
        Node::new("div", format!("price:{slug}"))
            .class("inventory_item_price")
            .text(product.price_label()),
    );
}

fn render_complete(nodes: &mut Vec<Node>) {
    nodes.push(Node::new("img", "pony_express").class("pony_express"));
    nodes.push(
        Node::new("h2", "complete-header")
            .class("complete-header")
            .text("Thank you for your order!"),
    );
    nodes.push(
        Node::new("div", "complete-text")
            .class("complete-text")
            .text("Your order has been dispatched, and will arrive just as fast as the pony can get there!"),
    );
    nodes.push(
        Node::with_id("button", "back-to-products")
            .class("btn_primary")
            .text("Back Home")
            .kind(NodeKind::Button(Action::BackHome)),
    );
}

/// Split into (`scheme://host/`, path without query or fragment)
fn split_url(url: &str) -> (String, String) {
    let (scheme, rest) = url.split_once("://").unwrap_or(("", url));
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let origin = if scheme.is_empty() {
        format!("{host}/")
    } else {
        format!("{scheme}://{host}/")
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    (origin, path.trim_start_matches('/').to_string())
}
