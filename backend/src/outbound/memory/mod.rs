//! In-process credential store and ledger.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. Each account owns its own ledger mutex, so mutations for one user
//! are serialised while different users never wait on each other. The
//! account directory lock is only held long enough to look an account up,
//! except during registration, which holds it together with the device lock
//! so an account never appears without its first device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use crate::domain::ports::{
    DeviceRepository, DeviceRepositoryError, LedgerRepository, LedgerRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Device, DeviceId, Email, LedgerReceipt, Money, PasswordHash, PushAddress, Transaction,
    TransactionKind, User, UserCredentials, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

struct LedgerState {
    balance: Money,
    updated_at: DateTime<Utc>,
    /// Append-only, oldest first.
    transactions: Vec<Transaction>,
}

struct Account {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
    ledger: Mutex<LedgerState>,
}

impl Account {
    fn lock_ledger(&self) -> Option<MutexGuard<'_, LedgerState>> {
        self.ledger.lock().ok()
    }

    fn snapshot(&self, ledger: &LedgerState) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            balance: ledger.balance,
            created_at: self.created_at,
            updated_at: ledger.updated_at,
        }
    }
}

#[derive(Default)]
struct Directory {
    by_id: HashMap<Uuid, Arc<Account>>,
    by_email: HashMap<String, Uuid>,
}

/// Thread-safe store implementing the user, device and ledger ports.
pub struct InMemoryStore {
    directory: RwLock<Directory>,
    devices: Mutex<HashMap<Uuid, Vec<Device>>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty store with an explicit clock.
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            directory: RwLock::new(Directory::default()),
            devices: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Flag a device as verified.
    ///
    /// Stands in for the out-of-band administrative verification. Returns
    /// `false` when no such device exists.
    pub fn mark_device_verified(&self, user_id: &UserId, device_id: &DeviceId) -> bool {
        let Ok(mut devices) = self.devices.lock() else {
            return false;
        };
        let now = self.clock.utc();
        devices
            .get_mut(user_id.as_uuid())
            .and_then(|list| list.iter_mut().find(|device| &device.device_id == device_id))
            .map(|device| {
                device.is_verified = true;
                device.updated_at = now;
            })
            .is_some()
    }

    fn account(&self, user_id: &UserId) -> Result<Option<Arc<Account>>, String> {
        let directory = self.directory.read().map_err(|_| POISONED.to_owned())?;
        Ok(directory.by_id.get(user_id.as_uuid()).cloned())
    }

    fn ledger_account(&self, user_id: &UserId) -> Result<Arc<Account>, LedgerRepositoryError> {
        self.account(user_id)
            .map_err(LedgerRepositoryError::query)?
            .ok_or_else(LedgerRepositoryError::user_not_found)
    }

    fn lock_devices(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<Uuid, Vec<Device>>>, DeviceRepositoryError> {
        self.devices
            .lock()
            .map_err(|_| DeviceRepositoryError::query(POISONED))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
        device_id: &DeviceId,
        push_address: Option<PushAddress>,
    ) -> Result<User, UserRepositoryError> {
        let mut directory = self
            .directory
            .write()
            .map_err(|_| UserRepositoryError::query(POISONED))?;
        if directory.by_email.contains_key(email.as_ref()) {
            return Err(UserRepositoryError::duplicate_email(email.as_ref()));
        }
        let mut devices = self
            .devices
            .lock()
            .map_err(|_| UserRepositoryError::query(POISONED))?;
        let now = self.clock.utc();
        let account = Arc::new(Account {
            id: UserId::random(),
            email: email.clone(),
            password_hash: password_hash.clone(),
            created_at: now,
            ledger: Mutex::new(LedgerState {
                balance: Money::ZERO,
                updated_at: now,
                transactions: Vec::new(),
            }),
        });
        let user = User {
            id: account.id.clone(),
            email: email.clone(),
            balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        };
        devices.insert(
            *account.id.as_uuid(),
            vec![Device {
                id: Uuid::new_v4(),
                user_id: account.id.clone(),
                device_id: device_id.clone(),
                is_verified: false,
                push_address,
                created_at: now,
                updated_at: now,
            }],
        );
        directory
            .by_email
            .insert(email.as_ref().to_owned(), *account.id.as_uuid());
        directory.by_id.insert(*account.id.as_uuid(), account);
        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let account = {
            let directory = self
                .directory
                .read()
                .map_err(|_| UserRepositoryError::query(POISONED))?;
            directory
                .by_email
                .get(email.as_ref())
                .and_then(|id| directory.by_id.get(id))
                .cloned()
        };
        let Some(account) = account else {
            return Ok(None);
        };
        let ledger = account
            .lock_ledger()
            .ok_or_else(|| UserRepositoryError::query(POISONED))?;
        Ok(Some(UserCredentials {
            user: account.snapshot(&ledger),
            password_hash: account.password_hash.clone(),
        }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let Some(account) = self.account(id).map_err(UserRepositoryError::query)? else {
            return Ok(None);
        };
        let ledger = account
            .lock_ledger()
            .ok_or_else(|| UserRepositoryError::query(POISONED))?;
        Ok(Some(account.snapshot(&ledger)))
    }
}

#[async_trait]
impl DeviceRepository for InMemoryStore {
    async fn find(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
    ) -> Result<Option<Device>, DeviceRepositoryError> {
        let devices = self.lock_devices()?;
        Ok(devices.get(user_id.as_uuid()).and_then(|list| {
            list.iter()
                .find(|device| &device.device_id == device_id)
                .cloned()
        }))
    }

    async fn update_push_address(
        &self,
        device: &Device,
        address: &PushAddress,
    ) -> Result<bool, DeviceRepositoryError> {
        let mut devices = self.lock_devices()?;
        let now = self.clock.utc();
        let Some(stored) = devices
            .get_mut(device.user_id.as_uuid())
            .and_then(|list| list.iter_mut().find(|candidate| candidate.id == device.id))
        else {
            return Ok(false);
        };
        if !stored.push_address_differs(address) {
            return Ok(false);
        }
        stored.push_address = Some(address.clone());
        stored.updated_at = now;
        Ok(true)
    }

    async fn push_addresses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushAddress>, DeviceRepositoryError> {
        let devices = self.lock_devices()?;
        Ok(devices
            .get(user_id.as_uuid())
            .map(|list| {
                list.iter()
                    .filter_map(|device| device.push_address.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn balance(&self, user_id: &UserId) -> Result<Money, LedgerRepositoryError> {
        let account = self.ledger_account(user_id)?;
        let ledger = account
            .lock_ledger()
            .ok_or_else(|| LedgerRepositoryError::query(POISONED))?;
        Ok(ledger.balance)
    }

    async fn apply(
        &self,
        user_id: &UserId,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerRepositoryError> {
        let account = self.ledger_account(user_id)?;
        let mut ledger = account
            .lock_ledger()
            .ok_or_else(|| LedgerRepositoryError::query(POISONED))?;
        let balance = match kind {
            TransactionKind::Deposit => ledger
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerRepositoryError::query("balance overflow"))?,
            TransactionKind::Withdraw => {
                if amount > ledger.balance {
                    return Err(LedgerRepositoryError::insufficient_balance());
                }
                ledger
                    .balance
                    .checked_sub(amount)
                    .ok_or_else(|| LedgerRepositoryError::query("balance underflow"))?
            }
        };
        let now = self.clock.utc();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            kind,
            amount,
            created_at: now,
        };
        ledger.balance = balance;
        ledger.updated_at = now;
        ledger.transactions.push(transaction.clone());
        Ok(LedgerReceipt {
            transaction,
            balance,
        })
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<Transaction>, LedgerRepositoryError> {
        let account = self.ledger_account(user_id)?;
        let ledger = account
            .lock_ledger()
            .ok_or_else(|| LedgerRepositoryError::query(POISONED))?;
        let mut history: Vec<Transaction> = ledger.transactions.iter().rev().cloned().collect();
        // Stable sort keeps newest-inserted first among equal timestamps.
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(history)
    }
}
