use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use tikiti_api::domain::pagination::PageRequest;
use tikiti_api::domain::repository::{
    EventRepository, PaymentGateway, StkPushRequest, StkPushResponse, TicketRepository,
    TransactionRepository,
};
use tikiti_api::domain::types::{
    Event, EventPatch, Ticket, TicketDetail, TicketStatus, Transaction, TransactionStatus,
};
use tikiti_api::error::ApiError;

// ── InMemoryStore ────────────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    events: Vec<Event>,
    tickets: Vec<Ticket>,
    transactions: Vec<Transaction>,
}

/// Shared in-memory backing store. Clones share state, so a cloned store can
/// stand in for every repository a flow needs while the test inspects the
/// same data afterwards. All multi-row transitions happen under one lock,
/// mirroring the transactional guarantees of the real repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                events,
                ..StoreState::default()
            })),
        }
    }

    pub fn event(&self, id: Uuid) -> Option<Event> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub fn ticket(&self, id: Uuid) -> Option<Ticket> {
        self.state
            .lock()
            .unwrap()
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn transaction_for_ticket(&self, ticket_id: Uuid) -> Option<Transaction> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|x| x.ticket_id == ticket_id)
            .cloned()
    }

    pub fn ticket_count(&self) -> usize {
        self.state.lock().unwrap().tickets.len()
    }

    fn detail(state: &StoreState, ticket: &Ticket) -> Option<TicketDetail> {
        let event = state.events.iter().find(|e| e.id == ticket.event_id)?;
        let transaction = state.transactions.iter().find(|x| x.ticket_id == ticket.id)?;
        Some(TicketDetail {
            ticket: ticket.clone(),
            event: event.clone(),
            transaction: transaction.clone(),
        })
    }
}

impl EventRepository for InMemoryStore {
    async fn list(&self, _page: PageRequest) -> Result<Vec<Event>, ApiError> {
        Ok(self.state.lock().unwrap().events.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError> {
        Ok(self.event(id))
    }

    async fn create(&self, event: &Event) -> Result<(), ApiError> {
        self.state.lock().unwrap().events.push(event.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, ApiError> {
        let mut state = self.state.lock().unwrap();
        let Some(event) = state.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            event.title = title.clone();
        }
        if let Some(price) = patch.price {
            event.price = price;
        }
        if let Some(available) = patch.available_tickets {
            event.available_tickets = available;
        }
        if let Some(image_url) = &patch.image_url {
            event.image_url = image_url.clone();
        }
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        Ok(state.events.len() < before)
    }
}

impl TicketRepository for InMemoryStore {
    async fn reserve(&self, ticket: &Ticket, transaction: &Transaction) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == ticket.event_id)
            .ok_or(ApiError::EventNotFound)?;
        if event.available_tickets < ticket.quantity {
            return Err(ApiError::InsufficientTickets);
        }
        event.available_tickets -= ticket.quantity;
        state.tickets.push(ticket.clone());
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        Ok(self.ticket(id))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<TicketDetail>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tickets
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| Self::detail(&state, t)))
    }

    async fn list_details_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| Self::detail(&state, t))
            .collect())
    }
}

impl TransactionRepository for InMemoryStore {
    async fn find_by_ticket_id(&self, ticket_id: Uuid) -> Result<Option<Transaction>, ApiError> {
        Ok(self.transaction_for_ticket(ticket_id))
    }

    async fn find_by_checkout_request_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|x| x.checkout_request_id.as_deref() == Some(checkout_request_id))
            .cloned())
    }

    async fn set_push_request(
        &self,
        id: Uuid,
        phone_number: &str,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(x) = state.transactions.iter_mut().find(|x| x.id == id) {
            x.phone_number = Some(phone_number.to_owned());
            x.merchant_request_id = Some(merchant_request_id.to_owned());
            x.checkout_request_id = Some(checkout_request_id.to_owned());
        }
        Ok(())
    }

    async fn complete_pending(&self, id: Uuid, receipt_number: &str) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let Some(x) = state
            .transactions
            .iter_mut()
            .find(|x| x.id == id && x.status == TransactionStatus::Pending)
        else {
            return Ok(false);
        };
        x.status = TransactionStatus::Completed;
        x.receipt_number = Some(receipt_number.to_owned());
        x.completed_at = Some(Utc::now());
        let ticket_id = x.ticket_id;
        if let Some(t) = state.tickets.iter_mut().find(|t| t.id == ticket_id) {
            t.status = TicketStatus::Confirmed;
        }
        Ok(true)
    }

    async fn fail_pending(&self, id: Uuid, failure_reason: &str) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let Some(x) = state
            .transactions
            .iter_mut()
            .find(|x| x.id == id && x.status == TransactionStatus::Pending)
        else {
            return Ok(false);
        };
        x.status = TransactionStatus::Failed;
        x.failure_reason = Some(failure_reason.to_owned());
        let ticket_id = x.ticket_id;
        let (event_id, quantity) = {
            let t = state
                .tickets
                .iter_mut()
                .find(|t| t.id == ticket_id)
                .expect("ticket for transaction");
            t.status = TicketStatus::Cancelled;
            (t.event_id, t.quantity)
        };
        if let Some(e) = state.events.iter_mut().find(|e| e.id == event_id) {
            e.available_tickets += quantity;
        }
        Ok(true)
    }
}

// ── CountingGateway ──────────────────────────────────────────────────────────

/// Gateway stub that records push requests instead of calling out.
#[derive(Clone, Default)]
pub struct CountingGateway {
    pub pushes: Arc<Mutex<Vec<StkPushRequest>>>,
}

impl PaymentGateway for CountingGateway {
    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError> {
        self.pushes.lock().unwrap().push(request.clone());
        Ok(StkPushResponse {
            merchant_request_id: "29115-34620561-1".to_owned(),
            checkout_request_id: format!("ws_CO_{}", self.pushes.lock().unwrap().len()),
        })
    }

    async fn register_c2b(
        &self,
        _validation_url: &str,
        _confirmation_url: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

// ── Test fixtures ────────────────────────────────────────────────────────────

pub fn test_event(price: i64, available_tickets: i32) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::now_v7(),
        title: "Tech Conference 2024".to_owned(),
        description: "Industry leaders on stage".to_owned(),
        date: now + chrono::Duration::days(30),
        venue: "Tech Hub, Nairobi".to_owned(),
        price,
        available_tickets,
        image_url: None,
        created_by: Uuid::now_v7(),
        created_at: now,
        updated_at: now,
    }
}
