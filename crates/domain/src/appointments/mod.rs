/// Appointment aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Input DTOs
pub mod inputs;

/// View (read model)
pub mod view;

/// CQRS setup
pub mod cqrs;

pub use aggregate::{
    Appointment, AppointmentStatus, DetailsKind, PaymentMethod, Services, AGGREGATE_TYPE,
    CONSULTATION_FEE,
};
pub use commands::Command;
pub use cqrs::{AppointmentRepo, CommandBus};
pub use events::Event;
pub use view::{Query, View};
