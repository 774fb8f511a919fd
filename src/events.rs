use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events published after successful state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CartLineAdded {
        owner: String,
        product_id: Uuid,
        quantity: i32,
    },
    CartLineUpdated {
        owner: String,
        product_id: Uuid,
        quantity: i32,
    },
    CartLineRemoved {
        owner: String,
        product_id: Uuid,
    },
    CartCleared {
        owner: String,
    },
    OrderPlaced {
        order_id: Uuid,
        owner: String,
        total: Decimal,
    },
}

#[derive(Debug, Clone)]
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
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Publish an event, logging instead of failing the surrounding
    /// operation when the channel is unavailable.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Spawned from `main`;
/// exits when all senders are gone.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                owner,
                total,
            } => info!(%order_id, %owner, %total, "order placed"),
            other => info!(event = ?other, "domain event"),
        }
    }
}
