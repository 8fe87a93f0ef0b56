use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::EventBroadcaster;
use crate::realtime::ChangeFeed;
use crate::schema::pos_outbox;

use super::models::NewOutboxEventRow;

const AGGREGATE_TYPE: &str = "Sale";

/// Persists each event to `pos_outbox` for relay to other registers and
/// views, then hands it to in-process listeners.
pub struct OutboxBroadcaster {
    pool: DbPool,
    feed: ChangeFeed,
}

impl OutboxBroadcaster {
    pub fn new(pool: DbPool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }
}

impl EventBroadcaster for OutboxBroadcaster {
    fn broadcast(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        let aggregate_id = payload
            .get("sale_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut conn = self.pool.get()?;
        diesel::insert_into(pos_outbox::table)
            .values(&NewOutboxEventRow {
                id: Uuid::new_v4(),
                aggregate_type: AGGREGATE_TYPE.to_string(),
                aggregate_id,
                event_type: event.to_string(),
                payload: payload.clone(),
            })
            .execute(&mut conn)?;

        self.feed.broadcast(event, payload)
    }
}
