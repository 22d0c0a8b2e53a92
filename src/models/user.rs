use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Factory,
    Center,
    Monitor,
}

/// An authenticated actor. Passwords are held in cleartext because the
/// upstream spreadsheet stores and edits them that way; this carries the
/// same weakness rather than inventing a scheme the sheet cannot follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub id: String,
    pub role: UserRole,
    /// Secondary discriminator within the role: a press code for factory
    /// users, a center code for center users, "ADMIN" or "STATS" for
    /// monitor users.
    pub code: String,
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl UserCredentials {
    pub fn is_admin(&self) -> bool {
        self.code == "ADMIN"
    }
}

/// Accounts seeded on first run, before an admin has managed any users.
pub fn default_users() -> Vec<UserCredentials> {
    let user = |id: &str, role, code: &str, username: &str, password: &str, name: &str| {
        UserCredentials {
            id: id.to_string(),
            role,
            code: code.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            display_name: name.to_string(),
        }
    };
    vec![
        user("1", UserRole::Monitor, "ADMIN", "admin", "admin", "System Administrator"),
        user("7", UserRole::Monitor, "STATS", "stats", "123", "Monitoring and Statistics"),
        user("2", UserRole::Factory, "OPK", "opk", "123", "Obeikan Press"),
        user("3", UserRole::Factory, "UNI", "uni", "123", "United Press"),
        user("4", UserRole::Center, "DMM", "dmm", "123", "Dammam Center"),
        user("5", UserRole::Center, "RYD", "ryd", "123", "Riyadh Center"),
        user("6", UserRole::Center, "JED", "jed", "123", "Jeddah Center"),
    ]
}
