use uuid::Uuid;

use tikiti_api::domain::types::{TicketStatus, TransactionStatus};
use tikiti_api::error::ApiError;
use tikiti_api::usecase::ticket::{ReserveTicketInput, ReserveTicketUseCase};

use crate::helpers::{InMemoryStore, test_event};

#[tokio::test]
async fn should_decrement_inventory_and_price_the_transaction() {
    let event = test_event(3000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);

    let usecase = ReserveTicketUseCase {
        events: store.clone(),
        tickets: store.clone(),
    };
    let detail = usecase
        .execute(
            Uuid::now_v7(),
            ReserveTicketInput {
                event_id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.transaction.amount, 6000);
    assert_eq!(detail.ticket.status, TicketStatus::Pending);
    assert_eq!(detail.transaction.status, TransactionStatus::Pending);
    assert_eq!(store.event(event_id).unwrap().available_tickets, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_never_oversell_under_concurrent_reservations() {
    // 12 single-ticket reservations race for 5 available.
    let event = test_event(1000, 5);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);

    let mut handles = Vec::new();
    for _ in 0..12 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let usecase = ReserveTicketUseCase {
                events: store.clone(),
                tickets: store,
            };
            usecase
                .execute(
                    Uuid::now_v7(),
                    ReserveTicketInput {
                        event_id,
                        quantity: 1,
                    },
                )
                .await
        }));
    }

    let mut reserved = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(detail) => {
                assert_eq!(detail.ticket.status, TicketStatus::Pending);
                reserved += 1;
            }
            Err(ApiError::InsufficientTickets) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(reserved, 5);
    assert_eq!(rejected, 7);
    assert_eq!(store.event(event_id).unwrap().available_tickets, 0);
    assert_eq!(store.ticket_count(), 5);
}

#[tokio::test]
async fn should_reject_reservation_exceeding_inventory_without_partial_write() {
    let event = test_event(1000, 3);
    let event_id = event.id;
    let store = InMemoryStore::with_events(vec![event]);

    let usecase = ReserveTicketUseCase {
        events: store.clone(),
        tickets: store.clone(),
    };
    let result = usecase
        .execute(
            Uuid::now_v7(),
            ReserveTicketInput {
                event_id,
                quantity: 4,
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::InsufficientTickets)),
        "expected InsufficientTickets, got {result:?}"
    );
    assert_eq!(store.event(event_id).unwrap().available_tickets, 3);
    assert_eq!(store.ticket_count(), 0);
}
