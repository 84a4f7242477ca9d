//! Shared fixtures for integration tests. Nothing here touches the real network.
#![allow(dead_code)]

use clipfetch::ExtractorSettings;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;
use wiremock::MockServer;

/// Settings that point every remote source at `server`
///
/// `127.0.0.1` is treated both as a restricted host and as a short-link host
/// so URLs on the mock server take the restricted chain and get resolved.
pub fn settings_for(server: &MockServer) -> ExtractorSettings {
    let uri = server.uri();
    ExtractorSettings {
        restricted_domains: vec!["tiktok.com".to_string(), "127.0.0.1".to_string()],
        short_link_hosts: vec!["127.0.0.1".to_string()],
        api_endpoints: vec![
            format!("{}/ep1/api/", uri),
            format!("{}/ep2/api/", uri),
            format!("{}/ep3/api/", uri),
        ],
        savett_url: format!("{}/savett", uri),
        snaptik_url: format!("{}/snaptik", uri),
        tikmate_url: format!("{}/tikmate", uri),
        resolve_timeout_ms: 2_000,
        request_timeout_ms: 300,
        ..Default::default()
    }
}

/// One captured log event
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub message: String,
    pub fields: Vec<String>,
}

impl Captured {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// Layer that records every event it sees
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    /// WARN events carrying an `endpoint` field
    pub fn endpoint_failures(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.level == Level::WARN && e.has_field("endpoint"))
            .count()
    }

    /// Requests sent to a primary API endpoint
    pub fn endpoint_queries(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.has_field("endpoint") && e.message.starts_with("Querying metadata API"))
            .count()
    }
}

struct FieldCollector {
    message: String,
    fields: Vec<String>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(field.name().to_string());
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut collector);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}
