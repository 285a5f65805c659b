use std::fmt::Debug;

use bonus_common::Points;
use log::{debug, info};

use crate::{
    db_types::{Balance, LedgerEntry, OrderNumber, UserId, Withdrawal},
    LedgerApiError, LedgerManagement,
};

/// `LedgerApi` exposes balances and withdrawals, all derived from the append-only ledger.
pub struct LedgerApi<B> {
    db: B,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for LedgerApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn balance(&self, user: UserId) -> Result<Balance, LedgerApiError> {
        self.db.fetch_balance(user).await
    }

    /// Spends `sum` points against the order number `order`.
    ///
    /// The number only has to be well-formed; it need not have been submitted by anyone. Fails with
    /// [`LedgerApiError::InsufficientFunds`] if the balance does not cover `sum`, and with
    /// [`LedgerApiError::InvalidAmount`] if `sum` is not positive.
    pub async fn withdraw(&self, user: UserId, order: &str, sum: Points) -> Result<LedgerEntry, LedgerApiError> {
        let order = OrderNumber::parse(order)?;
        if !sum.is_positive() {
            return Err(LedgerApiError::InvalidAmount(sum));
        }
        let entry = self.db.debit(user, &order, sum).await?;
        info!("📒️ User {user} withdrew {sum} against order {order}");
        Ok(entry)
    }

    /// The user's withdrawals, oldest first. Fails with [`LedgerApiError::NoData`] if there are none.
    pub async fn withdrawals(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerApiError> {
        let withdrawals = self.db.fetch_withdrawals(user).await?;
        debug!("📒️ User {user} has {} withdrawals", withdrawals.len());
        if withdrawals.is_empty() {
            return Err(LedgerApiError::NoData);
        }
        Ok(withdrawals)
    }

    /// Awards `amount` points for `order`. Each order can be credited once.
    ///
    /// Accruals normally arrive through [`crate::ReconciliationApi`], which credits inside the status transaction. This
    /// is the direct route, for manual adjustments.
    pub async fn credit(&self, user: UserId, order: &OrderNumber, amount: Points) -> Result<LedgerEntry, LedgerApiError> {
        if !amount.is_positive() {
            return Err(LedgerApiError::InvalidAmount(amount));
        }
        let entry = self.db.credit(user, order, amount).await?;
        info!("📒️ Credited {amount} to user {user} for order {order}");
        Ok(entry)
    }

    pub async fn ledger_entries(&self, user: UserId) -> Result<Vec<LedgerEntry>, LedgerApiError> {
        self.db.fetch_ledger_entries(user).await
    }
}
