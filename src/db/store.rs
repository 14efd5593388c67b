use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::db::models::{Account, Contact, InboundMessage, NewAccount, OutboundMessage};
use crate::error::StoreError;

/// Record store backing the credential core. Accounts are keyed by username;
/// the trait is the seam the authenticator and resource routes depend on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Unique on username; a duplicate fails with `StoreError::Duplicate`.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Advances `last_login_at` to the current instant.
    async fn touch_last_login(&self, username: &str) -> Result<Account, StoreError>;

    async fn list(&self) -> Result<Vec<Contact>, StoreError>;

    async fn messages_to(&self, username: &str) -> Result<Vec<InboundMessage>, StoreError>;

    async fn messages_from(&self, username: &str) -> Result<Vec<OutboundMessage>, StoreError>;
}

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str =
    "username, password_hash, first_name, last_name, phone, joined_at, last_login_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let created = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO users (username, password_hash, first_name, last_name, phone, joined_at, last_login_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(account.joined_at)
        .bind(account.last_login_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn touch_last_login(&self, username: &str) -> Result<Account, StoreError> {
        let updated = sqlx::query_as::<_, Account>(&format!(
            "UPDATE users SET last_login_at = now() WHERE username = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        updated.ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(contacts)
    }

    async fn messages_to(&self, username: &str) -> Result<Vec<InboundMessage>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    u.username, u.first_name, u.last_name, u.phone
             FROM messages AS m
             JOIN users AS u ON m.from_username = u.username
             WHERE m.to_username = $1
             ORDER BY m.id",
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_inbound).collect())
    }

    async fn messages_from(&self, username: &str) -> Result<Vec<OutboundMessage>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    u.username, u.first_name, u.last_name, u.phone
             FROM messages AS m
             JOIN users AS u ON m.to_username = u.username
             WHERE m.from_username = $1
             ORDER BY m.id",
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_outbound).collect())
    }
}

/// Flat join row; the counterpart columns come from whichever side of the
/// message the query joined against.
#[derive(FromRow)]
struct MessageRow {
    id: i64,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl MessageRow {
    fn counterpart(&self) -> Contact {
        Contact {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }

    fn into_inbound(self) -> InboundMessage {
        InboundMessage {
            from_user: self.counterpart(),
            id: self.id,
            body: self.body,
            sent_at: self.sent_at,
            read_at: self.read_at,
        }
    }

    fn into_outbound(self) -> OutboundMessage {
        OutboundMessage {
            to_user: self.counterpart(),
            id: self.id,
            body: self.body,
            sent_at: self.sent_at,
            read_at: self.read_at,
        }
    }
}
