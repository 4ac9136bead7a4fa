//! Fixed-shape domain events published on [`DOMAIN_EVENTS_TOPIC`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventResult;
use crate::event::{EventMetadata, PublishOptions};
use crate::publisher::EventPublisher;

/// Topic shared by all domain events.
pub const DOMAIN_EVENTS_TOPIC: &str = "domain-events";

/// Event type names used on [`DOMAIN_EVENTS_TOPIC`].
pub mod event_types {
    pub const USER_CREATED: &str = "user.created";
    pub const USER_UPDATED: &str = "user.updated";
    pub const USER_DELETED: &str = "user.deleted";
    pub const USER_LOGGED_IN: &str = "user.logged_in";
    pub const PRODUCT_CREATED: &str = "product.created";
    pub const PRODUCT_UPDATED: &str = "product.updated";
    pub const PRODUCT_DELETED: &str = "product.deleted";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdated {
    pub user_id: String,
    /// Changed fields and their new values.
    pub changes: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLoggedIn {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: String,
    pub changes: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: String,
}

impl EventPublisher {
    /// User events carry the subject user as the metadata `user_id`.
    async fn publish_user_event<T>(
        &self,
        event_type: &str,
        user_id: &str,
        payload: T,
    ) -> EventResult<EventMetadata>
    where
        T: Serialize + Send,
    {
        let options: PublishOptions = self.default_options().with_user_id(user_id);
        self.publish_with(DOMAIN_EVENTS_TOPIC, event_type, payload, options)
            .await
    }

    pub async fn publish_user_created(&self, event: UserCreated) -> EventResult<EventMetadata> {
        let user_id = event.user_id.clone();
        self.publish_user_event(event_types::USER_CREATED, &user_id, event)
            .await
    }

    pub async fn publish_user_updated(&self, event: UserUpdated) -> EventResult<EventMetadata> {
        let user_id = event.user_id.clone();
        self.publish_user_event(event_types::USER_UPDATED, &user_id, event)
            .await
    }

    pub async fn publish_user_deleted(&self, event: UserDeleted) -> EventResult<EventMetadata> {
        let user_id = event.user_id.clone();
        self.publish_user_event(event_types::USER_DELETED, &user_id, event)
            .await
    }

    pub async fn publish_user_logged_in(&self, event: UserLoggedIn) -> EventResult<EventMetadata> {
        let user_id = event.user_id.clone();
        self.publish_user_event(event_types::USER_LOGGED_IN, &user_id, event)
            .await
    }

    pub async fn publish_product_created(
        &self,
        event: ProductCreated,
    ) -> EventResult<EventMetadata> {
        self.publish(DOMAIN_EVENTS_TOPIC, event_types::PRODUCT_CREATED, event)
            .await
    }

    pub async fn publish_product_updated(
        &self,
        event: ProductUpdated,
    ) -> EventResult<EventMetadata> {
        self.publish(DOMAIN_EVENTS_TOPIC, event_types::PRODUCT_UPDATED, event)
            .await
    }

    pub async fn publish_product_deleted(
        &self,
        event: ProductDeleted,
    ) -> EventResult<EventMetadata> {
        self.publish(DOMAIN_EVENTS_TOPIC, event_types::PRODUCT_DELETED, event)
            .await
    }
}
