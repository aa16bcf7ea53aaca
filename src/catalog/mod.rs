//! Transport ticketing catalog
//!
//! Typed declarations of the six collections (passengers, routes, trips,
//! tickets, payments, notifications): one `CollectionSpec` per entity with
//! its contract and index list.

mod collections;
mod enums;

pub use collections::{
    notifications, passengers, payments, routes, tickets, transport_catalog, trips,
    CollectionSpec, DATABASE_NAME, EMAIL_PATTERN, PASSWORD_MIN_LENGTH,
};
pub use enums::{
    ClosedEnum, NotificationStatus, NotificationType, PaymentMethod, PaymentStatus, TicketStatus,
    TicketType, TripStatus,
};
