use std::{collections::HashMap, env, sync::Arc};
use async_trait::async_trait;
use cqrs_es::{
    mem_store::MemStore,
    persist::{PersistedEventStore, ViewRepository},
    AggregateError, CqrsFramework, EventStore,
};
use dynamo_es::{DynamoEventRepository, DynamoViewRepository};
use crate::{errors::Error, store::memory::MemoryViewRepository};
use super::{Appointment, Command, Query, Services, View};

pub type AppointmentRepo = Arc<Box<dyn ViewRepository<View, Appointment>>>;

/// Command side of the booking flow, independent of the event store backing it.
#[async_trait]
pub trait CommandBus: Send + Sync {
    async fn execute(
        &self,
        appointment_id: &str,
        command: Command,
        metadata: HashMap<String, String>,
    ) -> Result<(), AggregateError<Error>>;
}

#[async_trait]
impl<ES> CommandBus for CqrsFramework<Appointment, ES>
where
    ES: EventStore<Appointment>,
    ES::AC: Send,
{
    async fn execute(
        &self,
        appointment_id: &str,
        command: Command,
        metadata: HashMap<String, String>,
    ) -> Result<(), AggregateError<Error>> {
        self.execute_with_metadata(appointment_id, command, metadata)
            .await
    }
}

pub fn init(
    client: aws_sdk_dynamodb::Client,
    repo: AppointmentRepo,
) -> Arc<CqrsFramework<Appointment, PersistedEventStore<DynamoEventRepository, Appointment>>> {
    let event_log_table = env::var("DYNAMODB_EVENT_LOG_TABLE")
        .unwrap_or("healthbook-event-log".to_string());

    let event_snapshots_table = env::var("DYNAMODB_EVENT_SNAPSHOTS_TABLE")
        .unwrap_or("healthbook-event-snapshots".to_string());

    let store: PersistedEventStore<DynamoEventRepository, Appointment> =
        PersistedEventStore::new_snapshot_store(
            DynamoEventRepository::new(client)
                .with_tables(&event_log_table, &event_snapshots_table),
            5,
        );

    let query = Box::new(Query::new(repo));

    Arc::new(CqrsFramework::new(store, vec![query], Services::default()))
}

pub fn init_repo(client: aws_sdk_dynamodb::Client) -> AppointmentRepo {
    let view_table = env::var("DYNAMODB_APPOINTMENTS_VIEW_TABLE")
        .unwrap_or("healthbook-appointments-view".to_string());

    Arc::new(Box::new(DynamoViewRepository::new(&view_table, client)))
}

/// Process-local event store and view table, for local runs and tests.
pub fn init_in_memory() -> (Arc<dyn CommandBus>, AppointmentRepo) {
    let repo: AppointmentRepo = Arc::new(Box::new(MemoryViewRepository::<View>::default()));
    let query = Box::new(Query::new(repo.clone()));

    let cqrs = CqrsFramework::new(
        MemStore::<Appointment>::default(),
        vec![query],
        Services::default(),
    );

    (Arc::new(cqrs), repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::{AppointmentStatus, PaymentMethod};

    #[tokio::test]
    async fn in_memory_framework_projects_view() {
        let (bus, repo) = init_in_memory();

        bus.execute(
            "apt-9",
            Command::StartBooking {
                id: "apt-9".to_string(),
                user_id: "user_9".to_string(),
                hospital_id: 1,
                hospital_name: "Central Hospital Yaoundé".to_string(),
            },
            HashMap::from([("command_id".to_string(), "cmd-1".to_string())]),
        )
        .await
        .unwrap();

        bus.execute(
            "apt-9",
            Command::ConfirmPayment {
                method: PaymentMethod::MobileMoney,
                phone_number: "677111222".to_string(),
                reference: "PAY-9".to_string(),
            },
            HashMap::from([("command_id".to_string(), "cmd-2".to_string())]),
        )
        .await
        .unwrap();

        let view = repo.load("apt-9").await.unwrap().unwrap();
        assert_eq!(view.id, "apt-9");
        assert_eq!(view.command_id, "cmd-2");
        assert_eq!(view.appointment.status, AppointmentStatus::Details);
        assert_eq!(view.appointment.hospital_id, 1);
    }
}
