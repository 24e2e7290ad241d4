//! In-memory ledger for tests, demos and single-process runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use duel_core::{ActorId, HoldId};

use super::{BalanceLedger, LedgerError, LedgerResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum HoldState {
    Open,
    Released,
    Committed(ActorId),
}

#[derive(Debug)]
struct Hold {
    owner: ActorId,
    amount: u64,
    state: HoldState,
}

#[derive(Debug, Default)]
struct Books {
    balances: HashMap<ActorId, u64>,
    holds: HashMap<HoldId, Hold>,
    next_hold: u64,
}

/// [`BalanceLedger`] over process memory.
///
/// [`inject_failures`](Self::inject_failures) makes the next `release` or
/// `commit` calls fail with [`LedgerError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    books: Mutex<Books>,
    failures: AtomicU32,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances<I, A>(balances: I) -> Self
    where
        I: IntoIterator<Item = (A, u64)>,
        A: Into<ActorId>,
    {
        let ledger = Self::new();
        for (actor, amount) in balances {
            ledger.deposit(actor, amount);
        }
        ledger
    }

    pub fn deposit(&self, actor: impl Into<ActorId>, amount: u64) {
        let mut books = self.books();
        let balance = books.balances.entry(actor.into()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Spendable balance without going through the async trait.
    pub fn available(&self, actor: &ActorId) -> u64 {
        self.books().balances.get(actor).copied().unwrap_or_default()
    }

    /// Sum of all funds in open holds.
    pub fn escrowed_total(&self) -> u64 {
        self.books()
            .holds
            .values()
            .filter(|hold| hold.state == HoldState::Open)
            .map(|hold| hold.amount)
            .sum()
    }

    pub fn open_holds(&self) -> usize {
        self.books()
            .holds
            .values()
            .filter(|hold| hold.state == HoldState::Open)
            .count()
    }

    pub fn inject_failures(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn books(&self) -> MutexGuard<'_, Books> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> LedgerResult<()> {
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match injected {
            Ok(_) => Err(LedgerError::Unavailable("injected failure".into())),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl BalanceLedger for InMemoryLedger {
    async fn balance(&self, actor: &ActorId) -> LedgerResult<u64> {
        Ok(self.available(actor))
    }

    async fn hold(&self, actor: &ActorId, amount: u64) -> LedgerResult<HoldId> {
        let mut books = self.books();
        let available = books.balances.get(actor).copied().unwrap_or_default();
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                actor: actor.clone(),
                required: amount,
                available,
            });
        }
        books.balances.insert(actor.clone(), available - amount);

        books.next_hold += 1;
        let id = HoldId(books.next_hold);
        books.holds.insert(
            id,
            Hold {
                owner: actor.clone(),
                amount,
                state: HoldState::Open,
            },
        );
        Ok(id)
    }

    async fn release(&self, hold: HoldId) -> LedgerResult<()> {
        self.take_failure()?;
        let mut books = self.books();
        let entry = books
            .holds
            .get_mut(&hold)
            .ok_or(LedgerError::UnknownHold(hold))?;
        match &entry.state {
            HoldState::Released => return Ok(()),
            HoldState::Committed(_) => {
                return Err(LedgerError::HoldFinalized {
                    hold,
                    state: "committed",
                });
            }
            HoldState::Open => {}
        }
        entry.state = HoldState::Released;
        let (owner, amount) = (entry.owner.clone(), entry.amount);
        let balance = books.balances.entry(owner).or_default();
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    async fn commit(&self, hold: HoldId, destination: &ActorId) -> LedgerResult<()> {
        self.take_failure()?;
        let mut books = self.books();
        let entry = books
            .holds
            .get_mut(&hold)
            .ok_or(LedgerError::UnknownHold(hold))?;
        match &entry.state {
            HoldState::Committed(to) if to == destination => return Ok(()),
            HoldState::Committed(_) => {
                return Err(LedgerError::HoldFinalized {
                    hold,
                    state: "committed elsewhere",
                });
            }
            HoldState::Released => {
                return Err(LedgerError::HoldFinalized {
                    hold,
                    state: "released",
                });
            }
            HoldState::Open => {}
        }
        entry.state = HoldState::Committed(destination.clone());
        let amount = entry.amount;
        let balance = books.balances.entry(destination.clone()).or_default();
        *balance = balance.saturating_add(amount);
        Ok(())
    }
}
