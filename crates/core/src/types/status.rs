//! Status and role enums for storefront entities.
//!
//! The wire names follow the REST API (`snake_case`). Listings must keep
//! decoding when the server grows a new value, so enums whose vocabulary is
//! open carry a catch-all variant.

use serde::{Deserialize, Serialize};

/// Account role. Controls which back-office the account can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper.
    #[default]
    User,
    /// Support staff: orders, top-up review, promo codes, tickets.
    Helper,
    /// Full access to every back-office operation.
    Admin,
    /// Courier: sees and takes the delivery queue.
    Delivery,
}

impl Role {
    /// Returns `true` for roles with any back-office access.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::User)
    }

    /// Order listing, detail and status updates.
    #[must_use]
    pub const fn can_manage_orders(self) -> bool {
        matches!(self, Self::Admin | Self::Helper)
    }

    /// Approving and rejecting wallet top-up requests.
    #[must_use]
    pub const fn can_review_topups(self) -> bool {
        matches!(self, Self::Admin | Self::Helper)
    }

    /// Creating, toggling and deleting promo codes.
    #[must_use]
    pub const fn can_manage_promos(self) -> bool {
        matches!(self, Self::Admin | Self::Helper)
    }

    /// Answering support tickets.
    #[must_use]
    pub const fn can_answer_support(self) -> bool {
        matches!(self, Self::Admin | Self::Helper)
    }

    /// User, catalog, reward and settings administration.
    #[must_use]
    pub const fn can_administer(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Seeing and taking orders from the delivery queue.
    #[must_use]
    pub const fn can_deliver(self) -> bool {
        matches!(self, Self::Admin | Self::Delivery)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Helper => write!(f, "helper"),
            Self::Admin => write!(f, "admin"),
            Self::Delivery => write!(f, "delivery"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "helper" => Ok(Self::Helper),
            "admin" => Ok(Self::Admin),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// The customer asked for a return; waiting for staff approval.
    ReturnPending,
    Returned,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses staff may set through the order status endpoint.
    pub const STAFF_SETTABLE: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether the customer may still ask for a return.
    ///
    /// The server additionally enforces a 24 hour window from order creation.
    #[must_use]
    pub const fn accepts_return_request(self) -> bool {
        !matches!(
            self,
            Self::ReturnPending | Self::Returned | Self::Cancelled | Self::Unknown
        )
    }

    /// Whether staff may set this status directly.
    #[must_use]
    pub fn is_staff_settable(self) -> bool {
        Self::STAFF_SETTABLE.contains(&self)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::ReturnPending => "return_pending",
            Self::Returned => "returned",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::STAFF_SETTABLE
            .into_iter()
            .chain([Self::ReturnPending, Self::Returned])
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Review status of a wallet top-up or withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Support ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mission counts towards its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    Purchase,
    Topup,
    Level,
    OrdersCount,
    SpendAmount,
    Review,
    #[serde(other)]
    Other,
}

/// Payout of a completed mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionRewardKind {
    Coins,
    Xp,
    /// Extra wheel spins.
    Spin,
    #[serde(other)]
    Other,
}

/// Payout of a level reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Coins,
    XpBoost,
    Discount,
    Exclusive,
    #[serde(other)]
    Other,
}

/// Payout of a wheel prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeKind {
    Coins,
    Xp,
    Discount,
    #[serde(other)]
    Other,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_and_capabilities() {
        for role in [Role::User, Role::Helper, Role::Admin, Role::Delivery] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!(!Role::User.is_staff());
        assert!(Role::Helper.can_review_topups());
        assert!(!Role::Helper.can_administer());
        assert!(Role::Delivery.can_deliver());
        assert!(!Role::Delivery.can_manage_orders());
        assert!(Role::Admin.can_deliver());
    }

    #[test]
    fn test_order_status_unknown_value_decodes() {
        let status: OrderStatus = serde_json::from_str("\"lost_in_transit\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);

        let status: OrderStatus = serde_json::from_str("\"return_pending\"").unwrap();
        assert_eq!(status, OrderStatus::ReturnPending);
    }

    #[test]
    fn test_order_status_return_rules() {
        assert!(OrderStatus::Delivered.accepts_return_request());
        assert!(!OrderStatus::Cancelled.accepts_return_request());
        assert!(!OrderStatus::ReturnPending.accepts_return_request());
    }

    #[test]
    fn test_order_status_staff_settable() {
        assert!(OrderStatus::Shipped.is_staff_settable());
        assert!(!OrderStatus::Returned.is_staff_settable());
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_mission_type_fallback() {
        let kind: MissionType = serde_json::from_str("\"invite_friend\"").unwrap();
        assert_eq!(kind, MissionType::Other);
    }
}
