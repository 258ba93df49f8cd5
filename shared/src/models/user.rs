//! Actor roles

use serde::{Deserialize, Serialize};

/// Party acting on a product.
///
/// Buyers request, analyze and approve. Suppliers quote, confirm, manufacture
/// and ship. Admins may perform any transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Buyer,
    Supplier,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Buyer => "buyer",
            ActorRole::Supplier => "supplier",
            ActorRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(ActorRole::Buyer),
            "supplier" => Some(ActorRole::Supplier),
            "admin" => Some(ActorRole::Admin),
            _ => None,
        }
    }

    /// Whether this actor may perform a step reserved for `required`
    pub fn can_act_as(&self, required: ActorRole) -> bool {
        *self == ActorRole::Admin || *self == required
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
