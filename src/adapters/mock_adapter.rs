//! Mock transport for testing.
//!
//! This transport provides a simulated instrument for testing drivers without
//! physical hardware. It provides:
//! - Scripted query replies
//! - Controllable failure injection
//! - A transmit log for test verification

use super::ScpiTransport;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock SCPI transport for testing.
///
/// # Example
///
/// ```
/// use rf_instruments::adapters::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.stub("*IDN?", "Acme,Widget,0,1.0");
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, String>>>,
    sent: Arc<Mutex<Vec<String>>>,
    should_fail_next: Arc<AtomicBool>,
}

impl MockTransport {
    /// Create a new mock transport with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply returned for a query command.
    pub fn stub(&self, command: &str, reply: &str) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.insert(command.to_string(), reply.to_string());
        }
    }

    /// Inject a failure for the next operation.
    pub fn inject_next_failure(&self) {
        self.should_fail_next.store(true, Ordering::SeqCst);
    }

    /// Every command transmitted so far, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Clear the transmit log.
    pub fn clear_sent(&self) {
        if let Ok(mut log) = self.sent.lock() {
            log.clear();
        }
    }

    fn check_failure(&self) -> bool {
        self.should_fail_next.swap(false, Ordering::SeqCst)
    }

    fn log_sent(&self, command: &str) {
        if let Ok(mut log) = self.sent.lock() {
            log.push(command.to_string());
        }
    }
}

#[async_trait]
impl ScpiTransport for MockTransport {
    async fn query(&self, command: &str) -> Result<String> {
        if self.check_failure() {
            return Err(anyhow!("injected failure"));
        }
        self.log_sent(command);
        let replies = self
            .replies
            .lock()
            .map_err(|_| anyhow!("mock reply table poisoned"))?;
        replies
            .get(command)
            .cloned()
            .ok_or_else(|| anyhow!("no scripted reply for '{}'", command))
    }

    async fn command(&self, command: &str) -> Result<()> {
        if self.check_failure() {
            return Err(anyhow!("injected failure"));
        }
        self.log_sent(command);
        Ok(())
    }
}
