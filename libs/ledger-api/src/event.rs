/// Named notification attached to a transaction via `set_event`.
///
/// Delivered to subscribers only once the transaction commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text, lossy for non UTF-8 payloads.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
