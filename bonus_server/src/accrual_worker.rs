//! The accrual poller.
//!
//! Once per interval, the poller asks the accrual service about every order that is still `NEW` or `PROCESSING`, one
//! order at a time, and feeds each reply into the order status machine. A `PROCESSED` reply credits the owner.
//!
//! * A rate-limited reply aborts the rest of the cycle. If the service said when to come back (`Retry-After`), cycles
//!   are skipped until then.
//! * Any other failure is logged and only affects the order in question.
//! * Cycles never overlap: the next tick is only awaited once the current cycle is done.
use std::time::Duration;

use accrual_client::{AccrualApi, AccrualApiError, AccrualProvider, AccrualReply, MAX_RETRY_AFTER};
use bonus_engine::{
    db_types::OrderSummary,
    order_objects::TransitionOutcome,
    AccrualReconciliation,
    ReconciliationApi,
    ReconciliationError,
    SqliteDatabase,
};
use log::*;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// What a single poll cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Orders that the accrual service was asked about
    pub checked: usize,
    /// Orders whose status changed
    pub updated: usize,
    pub unchanged: usize,
    /// Orders the accrual service has not heard of yet
    pub not_registered: usize,
    pub failed: usize,
    /// The service rate limited us and the rest of the cycle was skipped.
    pub rate_limited: bool,
    pub retry_after: Option<Duration>,
}

enum OrderResult {
    Updated(TransitionOutcome),
    Unchanged,
    NotRegistered,
    Failed,
    RateLimited(Option<Duration>),
}

/// Starts the accrual poller. It runs until `true` is sent on the `shutdown` channel, or the sender is dropped.
///
/// The in-flight order is always finished before the worker stops.
pub fn start_accrual_worker(
    api: ReconciliationApi<SqliteDatabase>,
    provider: AccrualApi,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut resume_at: Option<Instant> = None;
        info!("🕰️ Accrual poller started. Polling every {} ms", interval.as_millis());
        loop {
            tokio::select! {
                _ = timer.tick() => {},
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                },
            }
            if let Some(deadline) = resume_at {
                if Instant::now() < deadline {
                    trace!("🕰️ Accrual service asked us to back off. Skipping this cycle");
                    continue;
                }
                resume_at = None;
            }
            let report = run_cycle(&api, &provider, &shutdown).await;
            if report.checked > 0 {
                debug!("🕰️ Accrual poll cycle complete. {report:?}");
            }
            if report.rate_limited {
                resume_at = report.retry_after.and_then(|d| backoff_deadline(Instant::now(), d));
            }
            if *shutdown.borrow() {
                break;
            }
        }
        info!("🕰️ Accrual poller stopped");
    })
}

/// When polling may resume after the accrual service asked us to wait `retry_after`. The wait is capped at
/// [`MAX_RETRY_AFTER`]. `None` means "at the next tick".
fn backoff_deadline(now: Instant, retry_after: Duration) -> Option<Instant> {
    now.checked_add(retry_after.min(MAX_RETRY_AFTER))
}

/// Runs one poll cycle over every pending order. The shutdown flag is checked before each order.
pub async fn run_cycle<B, P>(
    api: &ReconciliationApi<B>,
    provider: &P,
    shutdown: &watch::Receiver<bool>,
) -> CycleReport
where
    B: AccrualReconciliation,
    P: AccrualProvider,
{
    let mut report = CycleReport::default();
    let pending = match api.pending_orders().await {
        Ok(orders) => orders,
        Err(e) => {
            error!("🕰️ Could not fetch pending orders. {e}");
            return report;
        },
    };
    trace!("🕰️ {} orders awaiting an accrual", pending.len());
    for order in pending {
        if *shutdown.borrow() {
            info!("🕰️ Shutdown requested. Ending the accrual poll cycle early");
            break;
        }
        report.checked += 1;
        match poll_order(api, provider, &order).await {
            OrderResult::Updated(outcome) => {
                trace!("🕰️ Order {} updated: {outcome:?}", order.number);
                report.updated += 1;
            },
            OrderResult::Unchanged => report.unchanged += 1,
            OrderResult::NotRegistered => report.not_registered += 1,
            OrderResult::Failed => report.failed += 1,
            OrderResult::RateLimited(retry_after) => {
                warn!(
                    "🕰️ The accrual service is rate limiting us. Abandoning this cycle. Retry after: {}",
                    retry_after.map(|d| format!("{} s", d.as_secs())).unwrap_or_else(|| "next cycle".into())
                );
                report.rate_limited = true;
                report.retry_after = retry_after;
                break;
            },
        }
    }
    report
}

async fn poll_order<B, P>(api: &ReconciliationApi<B>, provider: &P, order: &OrderSummary) -> OrderResult
where
    B: AccrualReconciliation,
    P: AccrualProvider,
{
    let number = &order.number;
    let reply = match provider.fetch_order_accrual(number.as_str()).await {
        Ok(AccrualReply::Found(reply)) => reply,
        Ok(AccrualReply::NotRegistered) => {
            trace!("🕰️ Order {number} is not registered with the accrual service yet");
            return OrderResult::NotRegistered;
        },
        Err(AccrualApiError::RateLimited { retry_after }) => return OrderResult::RateLimited(retry_after),
        Err(e) if e.is_transient() => {
            debug!("🕰️ Could not poll order {number}. Will try again next cycle. {e}");
            return OrderResult::Failed;
        },
        Err(e) => {
            warn!("🕰️ Could not poll order {number}. {e}");
            return OrderResult::Failed;
        },
    };
    if reply.order != number.as_str() {
        warn!("🕰️ Asked the accrual service about order {number}, but it replied about order {}", reply.order);
        return OrderResult::Failed;
    }
    match api.apply_accrual(number, reply.status, reply.accrual).await {
        Ok(outcome) if outcome.is_change() => OrderResult::Updated(outcome),
        Ok(_) => OrderResult::Unchanged,
        Err(ReconciliationError::NegativeAccrual { .. }) => OrderResult::Failed,
        Err(e) => {
            error!("🕰️ Could not apply the accrual reply for order {number}. {e}");
            OrderResult::Failed
        },
    }
}
