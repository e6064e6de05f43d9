use uuid::Uuid;

use tikiti_api::domain::types::{TicketDetail, TicketStatus, TransactionStatus};
use tikiti_api::error::ApiError;
use tikiti_api::usecase::callback::{
    ApplyStkCallbackUseCase, CallbackOutcome, StkCallbackInput,
};
use tikiti_api::usecase::payment::{
    InitiatePaymentInput, InitiatePaymentUseCase, PaymentInitiation,
};
use tikiti_api::usecase::ticket::{ReserveTicketInput, ReserveTicketUseCase};

use crate::helpers::{CountingGateway, InMemoryStore, test_event};

async fn reserve(store: &InMemoryStore, event_id: Uuid, user_id: Uuid, quantity: i32) -> TicketDetail {
    let usecase = ReserveTicketUseCase {
        events: store.clone(),
        tickets: store.clone(),
    };
    usecase
        .execute(user_id, ReserveTicketInput { event_id, quantity })
        .await
        .unwrap()
}

async fn push(
    store: &InMemoryStore,
    gateway: &CountingGateway,
    user_id: Uuid,
    ticket_id: Uuid,
) -> Result<PaymentInitiation, ApiError> {
    let usecase = InitiatePaymentUseCase {
        tickets: store.clone(),
        transactions: store.clone(),
        gateway: gateway.clone(),
        shortcode: "174379".to_owned(),
        public_base_url: "https://tikiti.example.com".to_owned(),
    };
    usecase
        .execute(
            user_id,
            InitiatePaymentInput {
                ticket_id,
                phone_number: Some("0712345678".to_owned()),
                method: "stk".to_owned(),
            },
        )
        .await
}

fn callback(checkout_request_id: &str, result_code: i64) -> StkCallbackInput {
    StkCallbackInput {
        merchant_request_id: "29115-34620561-1".to_owned(),
        checkout_request_id: checkout_request_id.to_owned(),
        result_code,
        result_desc: if result_code == 0 {
            "The service request is processed successfully.".to_owned()
        } else {
            "Request cancelled by user".to_owned()
        },
        receipt_number: (result_code == 0).then(|| "NLJ7RT61SV".to_owned()),
    }
}

#[tokio::test]
async fn should_confirm_ticket_after_successful_payment_flow() {
    let event = test_event(3000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);
    let gateway = CountingGateway::default();
    let user_id = Uuid::now_v7();

    let detail = reserve(&store, event_id, user_id, 2).await;
    let initiation = push(&store, &gateway, user_id, detail.ticket.id).await.unwrap();
    let PaymentInitiation::StkPush {
        checkout_request_id,
    } = initiation
    else {
        panic!("expected StkPush, got {initiation:?}");
    };

    let apply = ApplyStkCallbackUseCase {
        transactions: store.clone(),
    };
    let outcome = apply.execute(callback(&checkout_request_id, 0)).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let ticket = store.ticket(detail.ticket.id).unwrap();
    let transaction = store.transaction_for_ticket(detail.ticket.id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert_eq!(transaction.receipt_number.as_deref(), Some("NLJ7RT61SV"));
    assert!(transaction.completed_at.is_some());
    // A confirmed sale keeps the inventory decremented.
    assert_eq!(store.event(event_id).unwrap().available_tickets, 3);

    // Redelivery of the same callback changes nothing.
    let outcome = apply.execute(callback(&checkout_request_id, 0)).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::AlreadyFinal);
}

#[tokio::test]
async fn should_restore_inventory_exactly_once_on_failed_payment() {
    let event = test_event(3000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);
    let gateway = CountingGateway::default();
    let user_id = Uuid::now_v7();

    let detail = reserve(&store, event_id, user_id, 2).await;
    assert_eq!(store.event(event_id).unwrap().available_tickets, 3);

    let PaymentInitiation::StkPush {
        checkout_request_id,
    } = push(&store, &gateway, user_id, detail.ticket.id).await.unwrap()
    else {
        panic!("expected StkPush");
    };

    let apply = ApplyStkCallbackUseCase {
        transactions: store.clone(),
    };
    let outcome = apply
        .execute(callback(&checkout_request_id, 1032))
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let ticket = store.ticket(detail.ticket.id).unwrap();
    let transaction = store.transaction_for_ticket(detail.ticket.id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Cancelled);
    assert_eq!(transaction.status, TransactionStatus::Failed);
    assert_eq!(
        transaction.failure_reason.as_deref(),
        Some("Request cancelled by user")
    );
    assert_eq!(store.event(event_id).unwrap().available_tickets, 5);

    // The retried failure must not restore the inventory again.
    let outcome = apply
        .execute(callback(&checkout_request_id, 1032))
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::AlreadyFinal);
    assert_eq!(store.event(event_id).unwrap().available_tickets, 5);
}

#[tokio::test]
async fn should_reject_second_payment_for_completed_transaction() {
    let event = test_event(3000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);
    let gateway = CountingGateway::default();
    let user_id = Uuid::now_v7();

    let detail = reserve(&store, event_id, user_id, 1).await;
    let PaymentInitiation::StkPush {
        checkout_request_id,
    } = push(&store, &gateway, user_id, detail.ticket.id).await.unwrap()
    else {
        panic!("expected StkPush");
    };

    ApplyStkCallbackUseCase {
        transactions: store.clone(),
    }
    .execute(callback(&checkout_request_id, 0))
    .await
    .unwrap();

    let result = push(&store, &gateway, user_id, detail.ticket.id).await;
    assert!(
        matches!(result, Err(ApiError::AlreadyPaid)),
        "expected AlreadyPaid, got {result:?}"
    );
    // No second provider call was made.
    assert_eq!(gateway.pushes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_not_mutate_anything_for_unknown_correlation_id() {
    let event = test_event(3000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);
    let user_id = Uuid::now_v7();

    let detail = reserve(&store, event_id, user_id, 1).await;

    let apply = ApplyStkCallbackUseCase {
        transactions: store.clone(),
    };
    let result = apply.execute(callback("ws_CO_unknown", 0)).await;
    assert!(
        matches!(result, Err(ApiError::TransactionNotFound)),
        "expected TransactionNotFound, got {result:?}"
    );

    let transaction = store.transaction_for_ticket(detail.ticket.id).unwrap();
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(store.event(event_id).unwrap().available_tickets, 4);
}
