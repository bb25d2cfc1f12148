//! Cart Hooks
//!
//! A small stand-in for a host platform's cart hooks. Listeners subscribe to a hook with a
//! priority, and a recalculation pass calls them in ascending priority order with a fresh
//! [`FeeLedger`]. Because every pass starts from an empty ledger, running the same pass twice
//! never stacks fees.

use std::fmt;

use rusty_money::MoneyError;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    cart::Cart,
    discounts::DiscountError,
    fees::FeeLedger,
    policy::DiscountPolicy,
    products::ShippingCategories,
};

/// Priority the discount listener registers at, late in fee calculation.
pub const DISCOUNT_PRIORITY: i32 = 20;

/// Errors raised while running a recalculation pass.
#[derive(Debug, Error)]
pub enum HookError {
    /// A listener failed to compute its discount.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Points in the cart lifecycle listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartHook {
    /// Fired while the cart totals are recalculated, once item prices are final.
    CalculateFees,
}

impl fmt::Display for CartHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartHook::CalculateFees => f.write_str("cart_calculate_fees"),
        }
    }
}

/// Where the recalculation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    admin: bool,
    ajax: bool,
}

impl RequestContext {
    /// A request from an administrative backend screen.
    pub const ADMIN: Self = Self::new(true, false);

    /// An asynchronous in-page update issued from an administrative screen.
    pub const ADMIN_AJAX: Self = Self::new(true, true);

    /// A normal storefront request.
    pub const STOREFRONT: Self = Self::new(false, false);

    /// Create a context from its flags.
    pub const fn new(admin: bool, ajax: bool) -> Self {
        Self { admin, ajax }
    }

    /// Whether the request came from an administrative backend.
    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    /// Whether the request is an asynchronous in-page update.
    pub const fn is_ajax(&self) -> bool {
        self.ajax
    }

    /// Admin page loads that aren't ajax updates must not recompute cart fees.
    pub const fn allows_fee_calculation(&self) -> bool {
        !self.admin || self.ajax
    }
}

/// Observer invoked by [`HookRegistry`] during a recalculation pass.
pub trait CartListener: fmt::Debug {
    /// Add any fees this listener contributes for `cart` to `fees`.
    ///
    /// # Errors
    ///
    /// Returns a [`HookError`] if the listener cannot compute its fees.
    fn calculate_fees<'a>(
        &self,
        request: &RequestContext,
        cart: &Cart<'a>,
        fees: &mut FeeLedger<'a>,
    ) -> Result<(), HookError>;
}

#[derive(Debug)]
struct Subscription {
    hook: CartHook,
    priority: i32,
    listener: Box<dyn CartListener>,
}

/// Listeners subscribed to cart hooks.
#[derive(Debug, Default)]
pub struct HookRegistry {
    subscriptions: SmallVec<[Subscription; 4]>,
}

impl HookRegistry {
    /// Create a registry with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `hook`. Lower priorities run first; equal priorities run in
    /// subscription order.
    pub fn subscribe(&mut self, hook: CartHook, priority: i32, listener: Box<dyn CartListener>) {
        debug!(%hook, priority, ?listener, "subscribing cart listener");

        let pos = self
            .subscriptions
            .iter()
            .position(|sub| sub.priority > priority)
            .unwrap_or(self.subscriptions.len());

        self.subscriptions.insert(
            pos,
            Subscription {
                hook,
                priority,
                listener,
            },
        );
    }

    /// Number of listeners subscribed to `hook`.
    pub fn listener_count(&self, hook: CartHook) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.hook == hook)
            .count()
    }

    /// Run one fee calculation pass for `cart`, returning the fees collected.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`] raised by a listener.
    pub fn calculate_fees<'a>(
        &self,
        request: &RequestContext,
        cart: &Cart<'a>,
    ) -> Result<FeeLedger<'a>, HookError> {
        let mut fees = FeeLedger::new(cart.currency());

        for sub in self
            .subscriptions
            .iter()
            .filter(|sub| sub.hook == CartHook::CalculateFees)
        {
            trace!(priority = sub.priority, listener = ?sub.listener, "running cart listener");

            sub.listener.calculate_fees(request, cart, &mut fees)?;
        }

        Ok(fees)
    }
}

/// Cart listener applying a [`DiscountPolicy`] during fee calculation.
pub struct CartDiscounts<C> {
    policy: DiscountPolicy,
    categories: C,
}

impl<C> fmt::Debug for CartDiscounts<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartDiscounts")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<C: ShippingCategories + 'static> CartDiscounts<C> {
    /// Create the listener from a policy and the catalog used to look up shipping categories.
    pub fn new(policy: DiscountPolicy, categories: C) -> Self {
        Self { policy, categories }
    }

    /// The policy this listener applies.
    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    /// Subscribe this listener to [`CartHook::CalculateFees`] at [`DISCOUNT_PRIORITY`].
    pub fn register(self, registry: &mut HookRegistry) {
        registry.subscribe(CartHook::CalculateFees, DISCOUNT_PRIORITY, Box::new(self));
    }
}

impl<C: ShippingCategories> CartListener for CartDiscounts<C> {
    fn calculate_fees<'a>(
        &self,
        request: &RequestContext,
        cart: &Cart<'a>,
        fees: &mut FeeLedger<'a>,
    ) -> Result<(), HookError> {
        if !request.allows_fee_calculation() {
            debug!(?request, "skipping cart discounts for admin request");
            return Ok(());
        }

        if cart.is_empty() {
            debug!("skipping cart discounts for empty cart");
            return Ok(());
        }

        if let Some(fee) = self.policy.evaluate(cart, &self.categories)? {
            fees.add_fee(fee);
        }

        Ok(())
    }
}
