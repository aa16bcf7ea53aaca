//! Closed value sets of the transport domain
//!
//! Each enum renders to the SCREAMING_SNAKE_CASE strings stored in
//! documents, and its `ALL` list feeds the `enum` rule of the contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A string field restricted to a fixed set of values
pub trait ClosedEnum: Sized + Copy + 'static {
    /// Every value, in declaration order
    const ALL: &'static [Self];

    /// Stored representation
    fn as_str(&self) -> &'static str;

    /// Stored representations of every value
    fn values() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl ClosedEnum for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum!(
    /// Lifecycle of a scheduled trip
    TripStatus {
        Scheduled => "SCHEDULED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

closed_enum!(
    /// Fare product of a ticket
    TicketType {
        SingleRide => "SINGLE_RIDE",
        MultipleRides => "MULTIPLE_RIDES",
        WeeklyPass => "WEEKLY_PASS",
        MonthlyPass => "MONTHLY_PASS",
    }
);

closed_enum!(
    TicketStatus {
        Created => "CREATED",
        Paid => "PAID",
        Validated => "VALIDATED",
        Expired => "EXPIRED",
    }
);

closed_enum!(
    PaymentMethod {
        Card => "CARD",
        Cash => "CASH",
        MobileMoney => "MOBILE_MONEY",
    }
);

closed_enum!(
    PaymentStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
);

closed_enum!(
    NotificationType {
        TripUpdate => "TRIP_UPDATE",
        TicketValidation => "TICKET_VALIDATION",
        PaymentConfirmation => "PAYMENT_CONFIRMATION",
        ServiceDisruption => "SERVICE_DISRUPTION",
    }
);

closed_enum!(
    /// Delivery state of a notification
    NotificationStatus {
        Pending => "PENDING",
        Sent => "SENT",
        Delivered => "DELIVERED",
        Failed => "FAILED",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_declaration_order() {
        assert_eq!(
            TripStatus::values(),
            vec!["SCHEDULED", "IN_PROGRESS", "COMPLETED", "CANCELLED"]
        );
        assert_eq!(PaymentMethod::values(), vec!["CARD", "CASH", "MOBILE_MONEY"]);
    }

    #[test]
    fn test_serde_matches_as_str() {
        for v in TicketType::ALL {
            let json = serde_json::to_value(v).unwrap();
            assert_eq!(json, v.as_str());
        }
        for v in NotificationType::ALL {
            let json = serde_json::to_value(v).unwrap();
            assert_eq!(json, v.as_str());
        }
    }
}
