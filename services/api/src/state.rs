use std::sync::Arc;

use sea_orm::DatabaseConnection;

use tikiti_identity::webhook::WebhookVerifier;

use crate::config::ApiConfig;
use crate::infra::daraja::DarajaGateway;
use crate::infra::db::{
    DbEventRepository, DbTicketRepository, DbTransactionRepository, DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<ApiConfig>,
    pub gateway: DarajaGateway,
    pub webhook_verifier: WebhookVerifier,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn event_repo(&self) -> DbEventRepository {
        DbEventRepository {
            db: self.db.clone(),
        }
    }

    pub fn ticket_repo(&self) -> DbTicketRepository {
        DbTicketRepository {
            db: self.db.clone(),
        }
    }

    pub fn transaction_repo(&self) -> DbTransactionRepository {
        DbTransactionRepository {
            db: self.db.clone(),
        }
    }

    pub fn gateway(&self) -> DarajaGateway {
        self.gateway.clone()
    }
}
