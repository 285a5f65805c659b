use bonus_common::Points;

use crate::{
    db_types::{Balance, LedgerEntry, OrderNumber, UserId, Withdrawal},
    LedgerApiError,
};

/// The `LedgerManagement` trait defines behaviour for the append-only points ledger.
///
/// Entries are never updated or deleted. Balances are always derived from the entries.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Appends a credit of `amount` (which must be positive) for `order`. An order can be credited at most once; a
    /// second credit returns [`LedgerApiError::AlreadyCredited`].
    async fn credit(&self, user: UserId, order: &OrderNumber, amount: Points) -> Result<LedgerEntry, LedgerApiError>;

    /// Appends a debit of `amount` (which must be positive; the stored entry is negative) for `order`.
    ///
    /// The balance check and the append happen in a single atomic step, so concurrent debits can never drive the
    /// balance below zero. If the balance does not cover `amount`, [`LedgerApiError::InsufficientFunds`] is
    /// returned and nothing is written.
    async fn debit(&self, user: UserId, order: &OrderNumber, amount: Points) -> Result<LedgerEntry, LedgerApiError>;

    async fn fetch_balance(&self, user: UserId) -> Result<Balance, LedgerApiError>;

    /// The user's debits, oldest first.
    async fn fetch_withdrawals(&self, user: UserId) -> Result<Vec<Withdrawal>, LedgerApiError>;

    /// Every ledger entry for the user, oldest first.
    async fn fetch_ledger_entries(&self, user: UserId) -> Result<Vec<LedgerEntry>, LedgerApiError>;
}
