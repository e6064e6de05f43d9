use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Local mirror of an identity-provider user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored roles. `GUEST` is the anonymous answer on the role endpoint and is
/// never persisted, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A purchasable event.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    /// Whole currency units (KES).
    pub price: i64,
    pub available_tickets: i32,
    pub image_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for an event. `None` leaves the field alone.
///
/// `image_url` is doubled because the column is nullable: `Some(None)`
/// clears the stored URL, while an outer `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub price: Option<i64>,
    pub available_tickets: Option<i32>,
    pub image_url: Option<Option<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.venue.is_none()
            && self.price.is_none()
            && self.available_tickets.is_none()
            && self.image_url.is_none()
    }
}

/// A ticket reservation. Created PENDING with the event inventory already
/// decremented; exactly one terminal transition ever applies.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Payment transaction, one-to-one with its ticket.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// Whole currency units: event price x ticket quantity.
    pub amount: i64,
    pub status: TransactionStatus,
    pub phone_number: Option<String>,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A ticket with its referenced event and owned transaction, as returned by
/// the ticket read endpoints.
#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub event: Event,
    pub transaction: Transaction,
}

/// How the caller wants to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Push payment: the provider prompts the phone for a PIN.
    StkPush,
    /// Manual paybill reference: the user pays out-of-band citing the ticket id.
    C2b,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stk" => Some(Self::StkPush),
            "c2b" => Some(Self::C2b),
            _ => None,
        }
    }
}

/// Normalize a subscriber phone number to `254XXXXXXXXX` form.
///
/// Accepts `2547…`/`2541…`, `07…`/`01…`, and bare `7…`/`1…` (an optional `+`
/// prefix is stripped first). Anything non-numeric or of implausible length
/// is rejected.
pub fn normalize_phone_number(input: &str) -> Option<String> {
    let digits = input.strip_prefix('+').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(rest) = digits.strip_prefix("254") {
        let rest = rest.trim_start_matches('0');
        return match rest.len() {
            9 if rest.starts_with('7') || rest.starts_with('1') => Some(format!("254{rest}")),
            _ => None,
        };
    }
    let rest = digits.trim_start_matches('0');
    match rest.len() {
        9 if rest.starts_with('7') || rest.starts_with('1') => Some(format!("254{rest}")),
        _ => None,
    }
}

/// Validate event field values shared by create and update.
pub fn validate_event_fields(
    title: Option<&str>,
    venue: Option<&str>,
    price: Option<i64>,
    available_tickets: Option<i32>,
) -> bool {
    if let Some(title) = title {
        if title.trim().is_empty() {
            return false;
        }
    }
    if let Some(venue) = venue {
        if venue.trim().is_empty() {
            return false;
        }
    }
    if let Some(price) = price {
        if price < 0 {
            return false;
        }
    }
    if let Some(available) = available_tickets {
        if available < 0 {
            return false;
        }
    }
    true
}
