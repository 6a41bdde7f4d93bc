use serde::{Deserialize, Serialize};

/// One row of the Users table as returned by the list endpoint.
///
/// Only `id` is required; the backend omits fields it has no value for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phone_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_admin_account: bool,
    #[serde(default)]
    pub is_staff: bool,
    /// Kept as sent; the backend mixes dates and timestamps here
    #[serde(default)]
    pub date_joined: Option<String>,
}

impl UserRecord {
    /// Short status flags for table output, e.g. `verified,admin`.
    pub fn flags(&self) -> String {
        let flags: Vec<&str> = [
            (self.is_verified, "verified"),
            (self.is_blocked, "blocked"),
            (self.is_admin_account, "admin"),
            (self.is_staff, "staff"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if flags.is_empty() {
            "-".to_string()
        } else {
            flags.join(",")
        }
    }
}
