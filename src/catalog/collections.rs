//! Collection declarations of the transport ticketing store
//!
//! Reference fields (`routeId`, `passengerId`, `tripId`, `ticketId`,
//! `recipientId`) are only type-checked as ObjectIds. Nothing verifies the
//! referenced document exists; consumers must tolerate orphans.

use crate::index::IndexSpec;
use crate::schema::{CollectionSchema, FieldRule};

use super::enums::{
    ClosedEnum, NotificationStatus, NotificationType, PaymentMethod, PaymentStatus, TicketStatus,
    TicketType, TripStatus,
};

/// Database the catalog is applied to
pub const DATABASE_NAME: &str = "transport_db";

/// Basic address shape accepted for passenger emails
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

pub const PASSWORD_MIN_LENGTH: usize = 6;

/// A collection contract together with its secondary indexes
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub schema: CollectionSchema,
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSpec {
    pub fn name(&self) -> &str {
        &self.schema.collection
    }
}

fn closed<E: ClosedEnum>() -> FieldRule {
    FieldRule::string_enum(E::values())
}

fn timestamps(schema: CollectionSchema) -> CollectionSchema {
    schema
        .optional("createdAt", FieldRule::date())
        .optional("updatedAt", FieldRule::date())
}

pub fn passengers() -> CollectionSpec {
    let schema = CollectionSchema::new("passengers")
        .required("email", FieldRule::string().with_pattern(EMAIL_PATTERN))
        .required(
            "password",
            FieldRule::string().with_min_length(PASSWORD_MIN_LENGTH),
        )
        .required("firstName", FieldRule::string().with_min_length(1))
        .required("lastName", FieldRule::string().with_min_length(1))
        .required("phoneNumber", FieldRule::string())
        .optional("isActive", FieldRule::bool());

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("email").unique(),
            IndexSpec::ascending("phoneNumber"),
        ],
    }
}

pub fn routes() -> CollectionSpec {
    let schema = CollectionSchema::new("routes")
        .required("routeNumber", FieldRule::string())
        .required("name", FieldRule::string())
        .required("startLocation", FieldRule::string())
        .required("endLocation", FieldRule::string())
        .required("stops", FieldRule::array())
        .optional("isActive", FieldRule::bool());

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("routeNumber").unique(),
            IndexSpec::ascending("isActive"),
        ],
    }
}

pub fn trips() -> CollectionSpec {
    let schema = CollectionSchema::new("trips")
        .required("routeId", FieldRule::object_id())
        .required("departureTime", FieldRule::date())
        .required("arrivalTime", FieldRule::date())
        .required("vehicleId", FieldRule::string())
        .required("driverId", FieldRule::string())
        .optional("status", closed::<TripStatus>());

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("routeId"),
            IndexSpec::ascending("departureTime"),
            IndexSpec::ascending("status"),
        ],
    }
}

pub fn tickets() -> CollectionSpec {
    let schema = CollectionSchema::new("tickets")
        .required("passengerId", FieldRule::object_id())
        .required("tripId", FieldRule::object_id())
        .required("ticketType", closed::<TicketType>())
        .required("price", FieldRule::decimal())
        .required("status", closed::<TicketStatus>())
        .optional("validationCount", FieldRule::int().with_minimum(0))
        .optional("maxValidations", FieldRule::int().with_minimum(0));

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("passengerId"),
            IndexSpec::ascending("tripId"),
            IndexSpec::ascending("status"),
            IndexSpec::ascending("createdAt"),
        ],
    }
}

pub fn payments() -> CollectionSpec {
    let schema = CollectionSchema::new("payments")
        .required("ticketId", FieldRule::object_id())
        .required("amount", FieldRule::decimal())
        .required("paymentMethod", closed::<PaymentMethod>())
        .required("status", closed::<PaymentStatus>())
        .optional("transactionId", FieldRule::string());

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("ticketId"),
            // pending payments have no transaction id yet
            IndexSpec::ascending("transactionId").unique().sparse(),
            IndexSpec::ascending("status"),
        ],
    }
}

pub fn notifications() -> CollectionSpec {
    let schema = CollectionSchema::new("notifications")
        .required("recipientId", FieldRule::object_id())
        .required("type", closed::<NotificationType>())
        .required("title", FieldRule::string())
        .required("message", FieldRule::string())
        .required("status", closed::<NotificationStatus>());

    CollectionSpec {
        schema: timestamps(schema),
        indexes: vec![
            IndexSpec::ascending("recipientId"),
            IndexSpec::ascending("type"),
            IndexSpec::ascending("status"),
            IndexSpec::ascending("createdAt"),
        ],
    }
}

/// All six collections, in setup order
pub fn transport_catalog() -> Vec<CollectionSpec> {
    vec![
        passengers(),
        routes(),
        trips(),
        tickets(),
        payments(),
        notifications(),
    ]
}
