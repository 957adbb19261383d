//! In-memory transport for deterministic testing.
//!
//! [`MockTransport`] replays scripted responses per operation and records
//! every call it receives, including the endpoint and session header that
//! were applied. Clones share state, so a test can keep a handle while the
//! client owns another.
//!
//! # Example
//!
//! ```
//! use metaforce_metadata::mock::MockTransport;
//! use metaforce_metadata::MetadataClient;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let transport = MockTransport::new();
//! transport.respond("deleteMetadata", "<result><fullName>Foo__c</fullName><success>true</success></result>");
//!
//! let mut client = MetadataClient::with_transport(transport.clone());
//! client.use_existing_session("00D!token", "https://na1.salesforce.com/services/Soap/m/50.0");
//!
//! let results = client.delete_metadata("CustomObject", &["Foo__c"]).await.unwrap();
//! assert!(results[0].is_ok());
//! assert_eq!(transport.call_count(), 1);
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use metaforce_client::{
    CallContext, Error as TransportError, ErrorKind as TransportErrorKind, SoapCall, SoapFault,
    Transport, XmlNode,
};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub context: CallContext,
    pub call: SoapCall,
}

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Fault(SoapFault),
    Connection(String),
    Timeout,
}

#[derive(Debug, Default)]
struct Inner {
    /// Scripted replies by operation. The last one repeats.
    replies: HashMap<String, VecDeque<Reply>>,
    calls: Vec<RecordedCall>,
}

/// Scripted transport. Thread-safe via internal `Arc<Mutex<...>>`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, operation: &str, reply: Reply) -> &Self {
        self.lock()
            .replies
            .entry(operation.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a successful reply. `content` is the inside of the
    /// `<{operation}Response>` element.
    ///
    /// Replies for one operation are served in order; the last one keeps
    /// being served once the others are used up.
    pub fn respond(&self, operation: &str, content: &str) -> &Self {
        self.push(operation, Reply::Body(content.to_string()))
    }

    /// Queue a SOAP fault.
    pub fn fault(&self, operation: &str, code: &str, message: &str) -> &Self {
        self.push(
            operation,
            Reply::Fault(SoapFault {
                fault_code: code.to_string(),
                fault_string: message.to_string(),
            }),
        )
    }

    /// Queue a connection failure.
    pub fn fail(&self, operation: &str, message: &str) -> &Self {
        self.push(operation, Reply::Connection(message.to_string()))
    }

    /// Queue a timeout.
    pub fn time_out(&self, operation: &str) -> &Self {
        self.push(operation, Reply::Timeout)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }

    /// Calls for one operation.
    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.call.operation == operation)
            .cloned()
            .collect()
    }

    fn next_reply(inner: &mut Inner, operation: &str) -> Option<Reply> {
        let queue = inner.replies.get_mut(operation)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for MockTransport {
    async fn call(&self, context: &CallContext, call: SoapCall) -> metaforce_client::Result<XmlNode> {
        let operation = call.operation.clone();
        let reply = {
            let mut inner = self.lock();
            inner.calls.push(RecordedCall {
                context: context.clone(),
                call,
            });
            Self::next_reply(&mut inner, &operation)
        };

        match reply {
            Some(Reply::Body(content)) => XmlNode::parse(&format!(
                "<{op}Response>{content}</{op}Response>",
                op = operation
            )),
            Some(Reply::Fault(fault)) => Err(TransportError::new(TransportErrorKind::Fault(fault))),
            Some(Reply::Connection(message)) => {
                Err(TransportError::new(TransportErrorKind::Connection(message)))
            }
            Some(Reply::Timeout) => Err(TransportError::new(TransportErrorKind::Timeout)),
            None => Err(TransportError::new(TransportErrorKind::Other(format!(
                "no reply scripted for {}",
                operation
            )))),
        }
    }
}
