//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The happy path is a fixed ladder from `Pending` to `Delivered`.
/// `Cancelled` branches off the ladder before the order ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

/// One rung of the order tracking ladder as shown to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackingStep {
    /// Status this step represents.
    pub status: OrderStatus,
    /// Human-readable label.
    pub label: &'static str,
    /// Whether the order has reached this step.
    pub reached: bool,
}

impl OrderStatus {
    /// The happy-path ladder, in order.
    pub const LADDER: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Position on the ladder; `None` for `Cancelled`.
    #[must_use]
    pub fn ladder_position(self) -> Option<usize> {
        Self::LADDER.iter().position(|s| *s == self)
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order can still be cancelled (it has not shipped).
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Processing)
    }

    /// Whether moving from `self` to `next` is a valid transition.
    ///
    /// Ladder moves are forward-only (skipping steps is allowed). Cancellation
    /// is allowed until the order ships. Terminal states never change.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }

        if next == Self::Cancelled {
            return self.is_cancellable();
        }

        match (self.ladder_position(), next.ladder_position()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    /// Human-readable label for customer-facing tracking.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Order placed",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Packed",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Tracking steps for the current status.
    ///
    /// Active orders see the whole ladder with steps up to the current one
    /// marked as reached. A cancelled order only shows the steps it reached
    /// before cancellation, followed by the cancelled step; `last_reached` is
    /// the last ladder status recorded before the cancellation.
    #[must_use]
    pub fn tracking_steps(self, last_reached: Option<Self>) -> Vec<TrackingStep> {
        if self == Self::Cancelled {
            let reached_until = last_reached
                .and_then(Self::ladder_position)
                .unwrap_or(0);

            return Self::LADDER
                .iter()
                .take(reached_until + 1)
                .map(|status| TrackingStep {
                    status: *status,
                    label: status.label(),
                    reached: true,
                })
                .chain(std::iter::once(TrackingStep {
                    status: Self::Cancelled,
                    label: Self::Cancelled.label(),
                    reached: true,
                }))
                .collect();
        }

        let current = self.ladder_position().unwrap_or(0);
        Self::LADDER
            .iter()
            .enumerate()
            .map(|(i, status)| TrackingStep {
                status: *status,
                label: status.label(),
                reached: i <= current,
            })
            .collect()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Admin role; selects the default row of the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access to all admin features including user management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// Kind of editorial post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "post_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Blog,
    Press,
    Careers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancel_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in OrderStatus::LADDER {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_tracking_steps_for_active_order() {
        let steps = OrderStatus::Shipped.tracking_steps(None);
        assert_eq!(steps.len(), 6);
        let reached: Vec<bool> = steps.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, true, true, false, false]);
    }

    #[test]
    fn test_tracking_steps_for_cancelled_order() {
        let steps = OrderStatus::Cancelled.tracking_steps(Some(OrderStatus::Confirmed));
        let statuses: Vec<OrderStatus> = steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Cancelled
            ]
        );
        assert!(steps.iter().all(|s| s.reached));
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in OrderStatus::LADDER {
            let parsed: OrderStatus = status.to_string().parse().unwrap_or_default();
            assert_eq!(parsed, status);
        }
        assert!("unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_admin_role_from_str() {
        assert_eq!("viewer".parse::<AdminRole>(), Ok(AdminRole::Viewer));
        assert!("owner".parse::<AdminRole>().is_err());
    }
}
