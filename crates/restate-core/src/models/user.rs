use serde::{Deserialize, Serialize};

use super::Account;

/// Signed-in user as exposed to screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl User {
    pub fn from_account(account: Account, avatar: String) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            avatar,
        }
    }
}
