use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Domain events emitted by the services after a state change commits.
/// Consumers get a best-effort stream; event delivery never blocks or
/// fails the originating request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CustomerCreated {
        customer_id: i64,
    },
    VehicleRegistered {
        customer_id: i64,
        vehicle_id: i64,
    },
    TicketOpened {
        ticket_id: i64,
        customer_id: i64,
        vehicle_id: i64,
    },
    TicketStatusChanged {
        ticket_id: i64,
        old_status: String,
        new_status: String,
    },
    LineItemAdded {
        ticket_id: i64,
        line_item_id: i64,
    },
    PartConsumed {
        ticket_id: i64,
        part_id: i64,
        quantity: i32,
    },
    InventoryAdjusted {
        part_id: i64,
        previous_quantity: i32,
        new_quantity: i32,
    },
    LowStock {
        part_id: i64,
        quantity_in_stock: i32,
        reorder_level: i32,
    },
    MechanicAssigned {
        ticket_id: i64,
        mechanic_id: i64,
    },
    MechanicUnassigned {
        ticket_id: i64,
        mechanic_id: i64,
    },
    AssignmentsEdited {
        ticket_id: i64,
        assignment_count: usize,
    },
    CertificationRecorded {
        mechanic_id: i64,
        specialization_id: i64,
    },
}

/// Cloneable handle the services use to publish events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to publish event: {}", e))
    }
}

/// Drains the event channel and logs each event. Runs for the lifetime
/// of the process; exits when every sender has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("event processor started");
    while let Some(event) = rx.recv().await {
        match &event {
            Event::LowStock {
                part_id,
                quantity_in_stock,
                reorder_level,
            } => {
                warn!(
                    part_id,
                    quantity_in_stock, reorder_level, "part fell to or below its reorder level"
                );
            }
            other => match serde_json::to_string(other) {
                Ok(json) => info!(event = %json, "processing event"),
                Err(e) => error!("failed to serialize event: {}", e),
            },
        }
    }
    info!("event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::PartConsumed {
                ticket_id: 1,
                part_id: 2,
                quantity: 3,
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::PartConsumed {
                ticket_id,
                part_id,
                quantity,
            }) => {
                assert_eq!(ticket_id, 1);
                assert_eq!(part_id, 2);
                assert_eq!(quantity, 3);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender
            .send(Event::CustomerCreated { customer_id: 1 })
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let json = serde_json::to_value(Event::LowStock {
            part_id: 7,
            quantity_in_stock: 2,
            reorder_level: 5,
        })
        .unwrap();
        assert_eq!(json["type"], "low_stock");
        assert_eq!(json["part_id"], 7);
    }
}
