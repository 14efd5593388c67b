use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{Account, Contact, InboundMessage, NewAccount, OutboundMessage};
use crate::db::store::UserStore;
use crate::error::StoreError;

/// In-memory `UserStore` used by the test suites and for running the server
/// without Postgres. The lock is only held across non-awaiting sections.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<String, Account>,
    messages: Vec<StoredMessage>,
    next_message_id: i64,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    id: i64,
    from_username: String,
    to_username: String,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a message between two existing accounts and returns its id.
    pub fn add_message(&self, from_username: &str, to_username: &str, body: &str) -> i64 {
        let mut inner = self.inner.write().unwrap();
        inner.next_message_id += 1;
        let id = inner.next_message_id;
        inner.messages.push(StoredMessage {
            id,
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
            read_at: None,
        });
        id
    }
}

impl Inner {
    fn contact_for(&self, username: &str) -> Option<Contact> {
        self.accounts.get(username).map(Account::contact)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.accounts.get(username).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.accounts.contains_key(&account.username) {
            return Err(StoreError::Duplicate);
        }
        let created = Account {
            username: account.username.clone(),
            password_hash: account.password_hash,
            first_name: account.first_name,
            last_name: account.last_name,
            phone: account.phone,
            joined_at: account.joined_at,
            last_login_at: account.last_login_at,
        };
        inner.accounts.insert(account.username, created.clone());
        Ok(created)
    }

    async fn touch_last_login(&self, username: &str) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let account = inner
            .accounts
            .get_mut(username)
            .ok_or(StoreError::NotFound)?;
        account.last_login_at = Utc::now();
        Ok(account.clone())
    }

    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.accounts.values().map(Account::contact).collect())
    }

    async fn messages_to(&self, username: &str) -> Result<Vec<InboundMessage>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.to_username == username)
            .filter_map(|m| {
                inner.contact_for(&m.from_username).map(|from_user| InboundMessage {
                    id: m.id,
                    from_user,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect())
    }

    async fn messages_from(&self, username: &str) -> Result<Vec<OutboundMessage>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.from_username == username)
            .filter_map(|m| {
                inner.contact_for(&m.to_username).map(|to_user| OutboundMessage {
                    id: m.id,
                    to_user,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect())
    }
}
