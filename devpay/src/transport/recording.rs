//! In-memory transport for unit tests.

use std::{collections::VecDeque, sync::Mutex};

use serde_json::Value;

use super::{RequestContext, Transport, TransportResponse, sealed};
use crate::{error::Result, operation::Operation};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub operation: Operation,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Records every request and replays queued responses in order.
///
/// When the queue is empty it answers `200 {}`.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<TransportResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, status: u16, body: &Value) -> Self {
        self.respond_raw(status, body.to_string().into_bytes())
    }

    pub fn respond_raw(self, status: u16, body: Vec<u8>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(TransportResponse { status, body, headers: vec![] });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl sealed::private::Sealed for RecordingTransport {}

impl Transport for RecordingTransport {
    async fn post_form<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: ctx.url.to_string(),
            operation: ctx.operation,
            form: ctx.form.to_vec(),
        });
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| TransportResponse {
            status: 200,
            body: b"{}".to_vec(),
            headers: vec![],
        }))
    }

    fn protocol_name(&self) -> &'static str {
        "recording"
    }
}
