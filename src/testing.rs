//! Scripted transport for unit tests

use crate::error::{Error, Result};
use crate::http::{ApiResponse, RequestOptions, Transport};
use crate::types::Method;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, LINK};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

type Reply = Box<dyn Fn() -> Result<ApiResponse> + Send + Sync>;

/// A request the transport received
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub options: RequestOptions,
}

/// Answers requests from a queue of replies and records every call
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary reply
    pub fn reply(self, reply: impl Fn() -> Result<ApiResponse> + Send + Sync + 'static) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Box::new(reply));
        self
    }

    /// Queue a JSON body with the given relation links
    pub fn page(self, body: Value, links: &[(&str, &str)]) -> Self {
        let response = response(body, links);
        self.reply(move || Ok(response.clone()))
    }

    /// Queue a JSON body without links
    pub fn json(self, body: Value) -> Self {
        self.page(body, &[])
    }

    /// Queue a response with no body
    pub fn empty(self) -> Self {
        self.reply(|| Ok(ApiResponse::new(204, HeaderMap::new(), None)))
    }

    /// Queue a failure
    pub fn fail(self, error: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        self.reply(move || Err(error()))
    }

    /// Reply used once the queue is empty
    pub fn otherwise(mut self, reply: impl Fn() -> Result<ApiResponse> + Send + Sync + 'static) -> Self {
        self.fallback = Some(Box::new(reply));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            endpoint: endpoint.to_string(),
            options: options.clone(),
        });

        let next = self.replies.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(reply), _) => reply(),
            (None, Some(fallback)) => fallback(),
            (None, None) => Err(Error::Other(format!("no scripted reply for {endpoint}"))),
        }
    }
}

/// Build a 200 response carrying `body` and a `Link` header
pub(crate) fn response(body: Value, links: &[(&str, &str)]) -> ApiResponse {
    let mut headers = HeaderMap::new();
    if !links.is_empty() {
        let value = links
            .iter()
            .map(|(rel, url)| format!("<{url}>; rel=\"{rel}\""))
            .collect::<Vec<_>>()
            .join(", ");
        headers.insert(LINK, HeaderValue::from_str(&value).unwrap());
    }
    ApiResponse::new(200, headers, Some(body))
}
