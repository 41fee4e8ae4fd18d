use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cqrs_es::{
    persist::{PersistenceError, ViewContext, ViewRepository},
    Aggregate, DomainEvent, EventEnvelope, View as CqrsView,
};
use serde::{Deserialize, Serialize};

use super::{Appointment, AppointmentStatus, AGGREGATE_TYPE};

/// One step of the booking, as seen by the patient's history
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct StageChange {
    pub event: String,
    pub status: AppointmentStatus,
    /// Acting user, from the command metadata
    pub by: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct View {
    pub aggregate_type: String,
    pub command_id: String,
    pub id: String,
    pub appointment: Appointment,
    #[serde(default)]
    pub history: Vec<StageChange>,
}

fn metadata(event: &EventEnvelope<Appointment>, key: &str) -> String {
    event.metadata.get(key).cloned().unwrap_or_default()
}

impl CqrsView<Appointment> for View {
    fn update(&mut self, event: &EventEnvelope<Appointment>) {
        if self.id.is_empty() {
            self.id.clone_from(&event.aggregate_id);
            self.aggregate_type = AGGREGATE_TYPE.to_string();
        }
        self.command_id = metadata(event, "command_id");

        self.appointment.apply(event.payload.clone());
        self.history.push(StageChange {
            event: event.payload.event_type(),
            status: self.appointment.status,
            by: metadata(event, "user_id"),
            at: self.appointment.updated_at,
        });
    }
}

pub struct Query {
    repo: Arc<Box<dyn ViewRepository<View, Appointment>>>,
}

impl Query {
    pub fn new(repo: Arc<Box<dyn ViewRepository<View, Appointment>>>) -> Self {
        Self { repo }
    }

    async fn project(
        &self,
        appointment_id: &str,
        events: &[EventEnvelope<Appointment>],
    ) -> Result<(), PersistenceError> {
        let (mut view, context) = self
            .repo
            .load_with_context(appointment_id)
            .await?
            .unwrap_or_else(|| (View::default(), ViewContext::new(appointment_id.to_string(), 0)));

        events.iter().for_each(|event| view.update(event));

        self.repo.update_view(view, context).await
    }
}

#[async_trait]
impl cqrs_es::Query<Appointment> for Query {
    async fn dispatch(&self, appointment_id: &str, events: &[EventEnvelope<Appointment>]) {
        if let Err(err) = self.project(appointment_id, events).await {
            tracing::error!("Appointment view update failed for {}: {}", appointment_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::appointments::Event;

    fn envelope(sequence: usize, user: &str, payload: Event) -> EventEnvelope<Appointment> {
        EventEnvelope {
            aggregate_id: "apt-1".to_string(),
            sequence,
            payload,
            metadata: HashMap::from([
                ("command_id".to_string(), format!("cmd-{}", sequence)),
                ("user_id".to_string(), user.to_string()),
            ]),
        }
    }

    #[test]
    fn records_each_stage_with_acting_user() {
        let started = Utc::now();
        let mut view = View::default();

        view.update(&envelope(
            1,
            "user_1",
            Event::BookingStarted {
                id: "apt-1".to_string(),
                user_id: "user_1".to_string(),
                hospital_id: 4,
                hospital_name: "Bamenda Regional Hospital".to_string(),
                fee: 5000,
                created_at: started,
            },
        ));
        view.update(&envelope(
            2,
            "user_1",
            Event::BookingClosed {
                id: "apt-1".to_string(),
                updated_at: started,
            },
        ));

        assert_eq!(view.id, "apt-1");
        assert_eq!(view.aggregate_type, AGGREGATE_TYPE);
        assert_eq!(view.command_id, "cmd-2");
        assert_eq!(view.appointment.status, AppointmentStatus::Closed);

        let steps: Vec<(&str, AppointmentStatus, &str)> = view
            .history
            .iter()
            .map(|change| (change.event.as_str(), change.status, change.by.as_str()))
            .collect();
        assert_eq!(
            steps,
            vec![
                ("Appointment:Started", AppointmentStatus::Payment, "user_1"),
                ("Appointment:Closed", AppointmentStatus::Closed, "user_1"),
            ]
        );
    }
}
