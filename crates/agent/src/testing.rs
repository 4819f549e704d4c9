//! In-memory stand-ins for the two capability seams, shared by the unit
//! tests across this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use ik_directory::types::{Address, Reservation};
use ik_directory::{DirectoryProvider, Property};
use ik_domain::error::{Error, Result};

use crate::llm::{ChatRequest, ChatResponse, LlmClient};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Directory stub
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fixture-backed [`DirectoryProvider`] with the same client-side filter
/// semantics as the REST adapter.
#[derive(Default)]
pub struct StubDirectory {
    properties: Vec<Property>,
    reservations: Vec<Reservation>,
    fail: bool,
    call_count: AtomicUsize,
}

impl StubDirectory {
    pub fn with_property(mut self, id: &str, name: &str, city: Option<&str>) -> Self {
        self.properties.push(Property {
            id: id.into(),
            name: name.into(),
            address: Address { city: city.map(Into::into), ..Default::default() },
            ..Default::default()
        });
        self
    }

    pub fn with_reservation(
        mut self,
        id: &str,
        property_id: &str,
        arrival: &str,
        departure: &str,
        status: &str,
    ) -> Self {
        self.reservations.push(Reservation {
            id: id.into(),
            property_id: property_id.into(),
            arrival_date: arrival.into(),
            departure_date: departure.into(),
            status: status.into(),
        });
        self
    }

    /// Every operation fails with a directory error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of directory operations performed so far.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn guard(&self) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Directory("service unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryProvider for StubDirectory {
    async fn list_properties(&self) -> Result<Vec<Property>> {
        self.guard()?;
        Ok(self.properties.clone())
    }

    async fn get_property(&self, id: &str) -> Result<Property> {
        self.guard()?;
        self.properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("GET /properties/{id}")))
    }

    async fn find_properties_by_name(&self, needle: &str) -> Result<Vec<Property>> {
        self.guard()?;
        let needle = needle.to_lowercase();
        Ok(self
            .properties
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_properties_by_city(&self, needle: &str) -> Result<Vec<Property>> {
        self.guard()?;
        let needle = needle.to_lowercase();
        Ok(self
            .properties
            .iter()
            .filter(|p| {
                p.address
                    .city
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn reservations(
        &self,
        property_ids: &[String],
        _window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Reservation>> {
        self.guard()?;
        Ok(self
            .reservations
            .iter()
            .filter(|r| property_ids.contains(&r.property_id))
            .cloned()
            .collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM stub
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scripted [`LlmClient`]: hands out queued responses in order and records
/// every request it sees.
#[derive(Default)]
pub struct StubLlm {
    responses: Mutex<VecDeque<Result<ChatResponse>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl StubLlm {
    pub fn with_text(self, text: &str) -> Self {
        self.with_response(Ok(text_response(text)))
    }

    pub fn with_response(self, response: Result<ChatResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(req.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left for StubLlm")
    }
}

/// A plain-text model response.
pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: text.into(),
        tool_calls: Vec::new(),
        usage: None,
        model: "stub".into(),
        finish_reason: Some("stop".into()),
    }
}

/// A response containing a single tool call and no text.
pub fn tool_response(tool_name: &str, arguments: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: String::new(),
        tool_calls: vec![ik_domain::tool::ToolCall {
            call_id: "call_1".into(),
            tool_name: tool_name.into(),
            arguments,
        }],
        usage: None,
        model: "stub".into(),
        finish_reason: Some("tool_calls".into()),
    }
}
