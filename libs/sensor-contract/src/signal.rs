/// Event name used by deployed ledgers for threshold crossings.
pub const MAX_VALUE_EVENT: &str = "max-value-limit";

/// Readings strictly above this raise a notification.
pub const DEFAULT_THRESHOLD: i64 = 100;

/// A threshold crossing for one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub name: String,
    pub key: String,
    pub value: i64,
}

impl Notification {
    /// Event payload as emitted on the ledger.
    pub fn payload(&self) -> Vec<u8> {
        format!("Max limit exceeded in sensor {}, value {}", self.key, self.value).into_bytes()
    }
}

/// `Some` iff `value > threshold`, under the default event name.
pub fn evaluate(key: &str, value: i64, threshold: i64) -> Option<Notification> {
    ThresholdSignal::new(threshold, MAX_VALUE_EVENT).evaluate(key, value)
}

/// Stateless threshold rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdSignal {
    threshold: i64,
    event_name: String,
}

impl Default for ThresholdSignal {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, MAX_VALUE_EVENT)
    }
}

impl ThresholdSignal {
    pub fn new(threshold: i64, event_name: impl Into<String>) -> Self {
        Self {
            threshold,
            event_name: event_name.into(),
        }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn evaluate(&self, key: &str, value: i64) -> Option<Notification> {
        (value > self.threshold).then(|| Notification {
            name: self.event_name.clone(),
            key: key.to_string(),
            value,
        })
    }
}
