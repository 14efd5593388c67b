use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. The digest is compared during authentication but
/// never serialized outward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl Account {
    pub fn contact(&self) -> Contact {
        Contact {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Insert payload for a new account. Both timestamps are stamped by the
/// caller with the registration instant.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

/// Basic profile info, used for the user list and as a message counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// A message delivered to some user, seen from the recipient's side.
#[derive(Debug, Clone, Serialize)]
pub struct InboundMessage {
    pub id: i64,
    pub from_user: Contact,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// A message some user sent, seen from the sender's side.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub id: i64,
    pub to_user: Contact,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let now = Utc::now();
        Account {
            username: "alice".into(),
            password_hash: "$2b$04$secretdigest".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            phone: "555".into(),
            joined_at: now,
            last_login_at: now,
        }
    }

    #[test]
    fn test_digest_never_serialized() {
        let json = serde_json::to_value(account()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert!(json.get("joined_at").is_some());
    }

    #[test]
    fn test_contact_projection() {
        let contact = account().contact();
        assert_eq!(
            contact,
            Contact {
                username: "alice".into(),
                first_name: "A".into(),
                last_name: "B".into(),
                phone: "555".into(),
            }
        );
    }
}
