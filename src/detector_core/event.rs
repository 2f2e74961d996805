//! Event normalization from JSONL log records to validated `Event` variants

use super::user_store::UserId;
use serde_json::Value;

/// Which log an event was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Batch,
    Stream,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Batch => "batch",
            Source::Stream => "stream",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Purchase,
    Befriend,
    Unfriend,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Purchase => "purchase",
            EventKind::Befriend => "befriend",
            EventKind::Unfriend => "unfriend",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(EventKind::Purchase),
            "befriend" => Some(EventKind::Befriend),
            "unfriend" => Some(EventKind::Unfriend),
            _ => None,
        }
    }

    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EventKind::Purchase => &["amount", "id", "timestamp"],
            EventKind::Befriend | EventKind::Unfriend => &["id1", "id2", "timestamp"],
        }
    }
}

/// A validated purchase
///
/// The raw `timestamp`, `id` and `amount` values are kept verbatim so flagged
/// output echoes exactly what the log contained.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub user: UserId,
    pub amount: f64,
    pub timestamp: Value,
    pub raw_id: Value,
    pub raw_amount: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Friendship {
    pub id1: UserId,
    pub id2: UserId,
    pub timestamp: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Purchase(Purchase),
    Befriend(Friendship),
    Unfriend(Friendship),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidEvent {
    NotAnObject,
    MissingEventType,
    UnknownEventType(String),
    MissingField { kind: EventKind, field: &'static str },
    InvalidId { field: &'static str, value: String },
    InvalidAmount(String),
    NegativeAmount(f64),
    NonFiniteAmount(String),
}

impl std::fmt::Display for InvalidEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidEvent::NotAnObject => write!(f, "record is not a JSON object"),
            InvalidEvent::MissingEventType => write!(f, "missing event_type"),
            InvalidEvent::UnknownEventType(t) => write!(f, "event type not recognized: {}", t),
            InvalidEvent::MissingField { kind, field } => {
                write!(f, "missing field in {}: {}", kind.as_str(), field)
            }
            InvalidEvent::InvalidId { field, value } => {
                write!(f, "invalid user id in {}: {}", field, value)
            }
            InvalidEvent::InvalidAmount(v) => write!(f, "invalid purchase amount: {}", v),
            InvalidEvent::NegativeAmount(v) => write!(f, "negative purchase amount: {}", v),
            InvalidEvent::NonFiniteAmount(v) => write!(f, "non-finite purchase amount: {}", v),
        }
    }
}

impl std::error::Error for InvalidEvent {}

#[derive(Debug)]
pub enum EventError {
    NotUtf8(std::str::Utf8Error),
    Malformed(serde_json::Error),
    Invalid(InvalidEvent),
}

impl From<std::str::Utf8Error> for EventError {
    fn from(err: std::str::Utf8Error) -> Self {
        EventError::NotUtf8(err)
    }
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Malformed(err)
    }
}

impl From<InvalidEvent> for EventError {
    fn from(err: InvalidEvent) -> Self {
        EventError::Invalid(err)
    }
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventError::NotUtf8(e) => write!(f, "line is not valid UTF-8: {}", e),
            EventError::Malformed(e) => write!(f, "JSON not recognized: {}", e),
            EventError::Invalid(e) => write!(f, "invalid event: {}", e),
        }
    }
}

impl std::error::Error for EventError {}

impl Event {
    /// Parse and validate an event from a JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, EventError> {
        let record: Value = serde_json::from_str(line)?;
        Ok(Self::from_record(&record)?)
    }

    /// Validate an already-parsed log record
    pub fn from_record(record: &Value) -> Result<Self, InvalidEvent> {
        let fields = record.as_object().ok_or(InvalidEvent::NotAnObject)?;

        let event_type = fields
            .get("event_type")
            .ok_or(InvalidEvent::MissingEventType)?;
        let kind = event_type
            .as_str()
            .and_then(EventKind::from_str)
            .ok_or_else(|| InvalidEvent::UnknownEventType(display_value(event_type)))?;

        for &field in kind.required_fields() {
            if !fields.contains_key(field) {
                return Err(InvalidEvent::MissingField { kind, field });
            }
        }

        let timestamp = fields["timestamp"].clone();

        match kind {
            EventKind::Purchase => {
                let raw_id = fields["id"].clone();
                let raw_amount = fields["amount"].clone();
                let user = parse_user_id("id", &raw_id)?;
                let amount = parse_amount(&raw_amount)?;
                Ok(Event::Purchase(Purchase {
                    user,
                    amount,
                    timestamp,
                    raw_id,
                    raw_amount,
                }))
            }
            EventKind::Befriend | EventKind::Unfriend => {
                let friendship = Friendship {
                    id1: parse_user_id("id1", &fields["id1"])?,
                    id2: parse_user_id("id2", &fields["id2"])?,
                    timestamp,
                };
                if kind == EventKind::Befriend {
                    Ok(Event::Befriend(friendship))
                } else {
                    Ok(Event::Unfriend(friendship))
                }
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Purchase(_) => EventKind::Purchase,
            Event::Befriend(_) => EventKind::Befriend,
            Event::Unfriend(_) => EventKind::Unfriend,
        }
    }
}

/// Ids arrive as JSON strings ("12") or integers (12)
fn parse_user_id(field: &'static str, value: &Value) -> Result<UserId, InvalidEvent> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<UserId>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.ok_or_else(|| InvalidEvent::InvalidId {
        field,
        value: display_value(value),
    })
}

fn parse_amount(value: &Value) -> Result<f64, InvalidEvent> {
    let amount = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| InvalidEvent::InvalidAmount(display_value(value)))?;

    if !amount.is_finite() {
        return Err(InvalidEvent::NonFiniteAmount(display_value(value)));
    }
    if amount < 0.0 {
        return Err(InvalidEvent::NegativeAmount(amount));
    }
    Ok(amount)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
