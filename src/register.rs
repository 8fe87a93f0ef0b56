use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainError;
use crate::domain::session::Session;

/// State owned by the single register: its cart, its session and the
/// checkout-in-flight flag.
#[derive(Debug)]
pub struct Register {
    cart: Mutex<Cart>,
    session: Mutex<Session>,
    checkout_in_flight: AtomicBool,
}

impl Register {
    pub fn new(session: Session) -> Self {
        Self {
            cart: Mutex::new(Cart::new()),
            session: Mutex::new(session),
            checkout_in_flight: AtomicBool::new(false),
        }
    }

    pub fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn require_authenticated(&self) -> Result<(), DomainError> {
        self.session().require_authenticated()
    }

    pub fn require_analytics(&self) -> Result<(), DomainError> {
        self.session().require_analytics()
    }

    /// Removes the lines a completed checkout sold. Lines added while the
    /// sale was being recorded stay in the cart.
    pub fn settle_checkout(&self, sold: &[Uuid]) {
        let mut cart = self.cart();
        for cart_id in sold {
            cart.remove_item(*cart_id);
        }
    }

    /// Claims the checkout slot until the returned guard is dropped.
    pub fn begin_checkout(&self) -> Result<CheckoutGuard<'_>, DomainError> {
        self.checkout_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DomainError::CheckoutInProgress)?;
        Ok(CheckoutGuard {
            flag: &self.checkout_in_flight,
        })
    }
}

#[derive(Debug)]
pub struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
