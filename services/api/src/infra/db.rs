use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel as _, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use tikiti_api_schema::{events, tickets, transactions, users};

use crate::domain::pagination::PageRequest;
use crate::domain::repository::{
    EventRepository, TicketRepository, TransactionRepository, UserRepository,
};
use crate::domain::types::{
    Event, EventPatch, Role, Ticket, TicketDetail, TicketStatus, Transaction, TransactionStatus,
    User,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .context("find user by external id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(user.id),
            external_id: Set(user.external_id.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            role: Set(user.role.as_str().to_owned()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_mirror(
        &self,
        id: Uuid,
        external_id: &str,
        email: &str,
        name: &str,
        role: Option<Role>,
    ) -> Result<(), ApiError> {
        let mut user = users::ActiveModel {
            id: Set(id),
            external_id: Set(external_id.to_owned()),
            email: Set(email.to_owned()),
            name: Set(name.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(role) = role {
            user.role = Set(role.as_str().to_owned());
        }
        user.update(&self.db).await.context("update user mirror")?;
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<bool, ApiError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(role.as_str()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update user role")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_by_external_id(&self, external_id: &str) -> Result<bool, ApiError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::ExternalId.eq(external_id))
            .exec(&self.db)
            .await
            .context("delete user by external id")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    Ok(User {
        id: model.id,
        external_id: model.external_id,
        email: model.email,
        name: model.name,
        role: Role::parse(&model.role)
            .ok_or_else(|| anyhow!("unknown stored role: {}", model.role))?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Event repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

impl EventRepository for DbEventRepository {
    async fn list(&self, page: PageRequest) -> Result<Vec<Event>, ApiError> {
        let PageRequest { per_page, page } = page;
        // Widen before multiplying: page is caller-controlled and u32::MAX
        // pages times per_page does not fit in u32.
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let models = events::Entity::find()
            .order_by_asc(events::Column::Date)
            .offset(offset)
            .limit(u64::from(per_page))
            .all(&self.db)
            .await
            .context("list events")?;
        Ok(models.into_iter().map(event_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event by id")?;
        Ok(model.map(event_from_model))
    }

    async fn create(&self, event: &Event) -> Result<(), ApiError> {
        events::ActiveModel {
            id: Set(event.id),
            title: Set(event.title.clone()),
            description: Set(event.description.clone()),
            date: Set(event.date),
            venue: Set(event.venue.clone()),
            price: Set(event.price),
            available_tickets: Set(event.available_tickets),
            image_url: Set(event.image_url.clone()),
            created_by: Set(event.created_by),
            created_at: Set(event.created_at),
            updated_at: Set(event.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create event")?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, ApiError> {
        let Some(model) = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event for update")?
        else {
            return Ok(None);
        };

        let mut event = model.into_active_model();
        if let Some(title) = &patch.title {
            event.title = Set(title.clone());
        }
        if let Some(description) = &patch.description {
            event.description = Set(description.clone());
        }
        if let Some(date) = patch.date {
            event.date = Set(date);
        }
        if let Some(venue) = &patch.venue {
            event.venue = Set(venue.clone());
        }
        if let Some(price) = patch.price {
            event.price = Set(price);
        }
        if let Some(available_tickets) = patch.available_tickets {
            event.available_tickets = Set(available_tickets);
        }
        if let Some(image_url) = &patch.image_url {
            event.image_url = Set(image_url.clone());
        }
        event.updated_at = Set(Utc::now());

        let updated = event.update(&self.db).await.context("update event")?;
        Ok(Some(event_from_model(updated)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = events::Entity::delete_many()
            .filter(events::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete event")?;
        Ok(result.rows_affected > 0)
    }
}

fn event_from_model(model: events::Model) -> Event {
    Event {
        id: model.id,
        title: model.title,
        description: model.description,
        date: model.date,
        venue: model.venue,
        price: model.price,
        available_tickets: model.available_tickets,
        image_url: model.image_url,
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Ticket repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTicketRepository {
    pub db: DatabaseConnection,
}

impl TicketRepository for DbTicketRepository {
    async fn reserve(&self, ticket: &Ticket, transaction: &Transaction) -> Result<(), ApiError> {
        let decremented = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let ticket = ticket.clone();
                let transaction = transaction.clone();
                Box::pin(async move {
                    // Single conditional statement serializes the
                    // check-and-decrement; racing reservations for the last
                    // tickets see zero rows affected.
                    let updated = events::Entity::update_many()
                        .col_expr(
                            events::Column::AvailableTickets,
                            Expr::col(events::Column::AvailableTickets).sub(ticket.quantity),
                        )
                        .col_expr(events::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(events::Column::Id.eq(ticket.event_id))
                        .filter(events::Column::AvailableTickets.gte(ticket.quantity))
                        .exec(txn)
                        .await?;
                    if updated.rows_affected == 0 {
                        return Ok(false);
                    }

                    tickets::ActiveModel {
                        id: Set(ticket.id),
                        event_id: Set(ticket.event_id),
                        user_id: Set(ticket.user_id),
                        quantity: Set(ticket.quantity),
                        status: Set(ticket.status.as_str().to_owned()),
                        created_at: Set(ticket.created_at),
                        updated_at: Set(ticket.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    transactions::ActiveModel {
                        id: Set(transaction.id),
                        ticket_id: Set(transaction.ticket_id),
                        amount: Set(transaction.amount),
                        status: Set(transaction.status.as_str().to_owned()),
                        phone_number: Set(None),
                        merchant_request_id: Set(None),
                        checkout_request_id: Set(None),
                        receipt_number: Set(None),
                        failure_reason: Set(None),
                        completed_at: Set(None),
                        created_at: Set(transaction.created_at),
                        updated_at: Set(transaction.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    Ok(true)
                })
            })
            .await
            .context("reserve ticket")?;

        if !decremented {
            return Err(ApiError::InsufficientTickets);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        let model = tickets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ticket by id")?;
        model.map(ticket_from_model).transpose()
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<TicketDetail>, ApiError> {
        let Some(model) = tickets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ticket for detail")?
        else {
            return Ok(None);
        };
        Ok(Some(self.detail_for(model).await?))
    }

    async fn list_details_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, ApiError> {
        let models = tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .order_by_desc(tickets::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list tickets by user")?;

        let mut details = Vec::with_capacity(models.len());
        for model in models {
            details.push(self.detail_for(model).await?);
        }
        Ok(details)
    }
}

impl DbTicketRepository {
    /// Load the referenced event and owned transaction. Both are guaranteed
    /// by foreign keys, so absence is an internal error, not a 404.
    async fn detail_for(&self, model: tickets::Model) -> Result<TicketDetail, ApiError> {
        let event = events::Entity::find_by_id(model.event_id)
            .one(&self.db)
            .await
            .context("find event for ticket detail")?
            .ok_or_else(|| anyhow!("ticket {} references missing event", model.id))?;
        let transaction = transactions::Entity::find()
            .filter(transactions::Column::TicketId.eq(model.id))
            .one(&self.db)
            .await
            .context("find transaction for ticket detail")?
            .ok_or_else(|| anyhow!("ticket {} has no transaction", model.id))?;
        Ok(TicketDetail {
            ticket: ticket_from_model(model)?,
            event: event_from_model(event),
            transaction: transaction_from_model(transaction)?,
        })
    }
}

fn ticket_from_model(model: tickets::Model) -> Result<Ticket, ApiError> {
    Ok(Ticket {
        id: model.id,
        event_id: model.event_id,
        user_id: model.user_id,
        quantity: model.quantity,
        status: TicketStatus::parse(&model.status)
            .ok_or_else(|| anyhow!("unknown stored ticket status: {}", model.status))?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Transaction repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTransactionRepository {
    pub db: DatabaseConnection,
}

impl TransactionRepository for DbTransactionRepository {
    async fn find_by_ticket_id(&self, ticket_id: Uuid) -> Result<Option<Transaction>, ApiError> {
        let model = transactions::Entity::find()
            .filter(transactions::Column::TicketId.eq(ticket_id))
            .one(&self.db)
            .await
            .context("find transaction by ticket id")?;
        model.map(transaction_from_model).transpose()
    }

    async fn find_by_checkout_request_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        let model = transactions::Entity::find()
            .filter(transactions::Column::CheckoutRequestId.eq(checkout_request_id))
            .one(&self.db)
            .await
            .context("find transaction by checkout request id")?;
        model.map(transaction_from_model).transpose()
    }

    async fn set_push_request(
        &self,
        id: Uuid,
        phone_number: &str,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<(), ApiError> {
        transactions::ActiveModel {
            id: Set(id),
            phone_number: Set(Some(phone_number.to_owned())),
            merchant_request_id: Set(Some(merchant_request_id.to_owned())),
            checkout_request_id: Set(Some(checkout_request_id.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("store push request ids")?;
        Ok(())
    }

    async fn complete_pending(&self, id: Uuid, receipt_number: &str) -> Result<bool, ApiError> {
        let receipt_number = receipt_number.to_owned();
        let applied = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    // Guarded on PENDING: a transaction already terminal
                    // matches zero rows and the sibling write is skipped.
                    let updated = transactions::Entity::update_many()
                        .col_expr(
                            transactions::Column::Status,
                            Expr::value(TransactionStatus::Completed.as_str()),
                        )
                        .col_expr(
                            transactions::Column::ReceiptNumber,
                            Expr::value(receipt_number),
                        )
                        .col_expr(transactions::Column::CompletedAt, Expr::value(now))
                        .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
                        .filter(transactions::Column::Id.eq(id))
                        .filter(
                            transactions::Column::Status
                                .eq(TransactionStatus::Pending.as_str()),
                        )
                        .exec(txn)
                        .await?;
                    if updated.rows_affected == 0 {
                        return Ok(false);
                    }

                    let transaction = transactions::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("transaction {id}")))?;

                    tickets::Entity::update_many()
                        .col_expr(
                            tickets::Column::Status,
                            Expr::value(TicketStatus::Confirmed.as_str()),
                        )
                        .col_expr(tickets::Column::UpdatedAt, Expr::value(now))
                        .filter(tickets::Column::Id.eq(transaction.ticket_id))
                        .exec(txn)
                        .await?;

                    Ok(true)
                })
            })
            .await
            .context("complete pending transaction")?;
        Ok(applied)
    }

    async fn fail_pending(&self, id: Uuid, failure_reason: &str) -> Result<bool, ApiError> {
        let failure_reason = failure_reason.to_owned();
        let applied = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let updated = transactions::Entity::update_many()
                        .col_expr(
                            transactions::Column::Status,
                            Expr::value(TransactionStatus::Failed.as_str()),
                        )
                        .col_expr(
                            transactions::Column::FailureReason,
                            Expr::value(failure_reason),
                        )
                        .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
                        .filter(transactions::Column::Id.eq(id))
                        .filter(
                            transactions::Column::Status
                                .eq(TransactionStatus::Pending.as_str()),
                        )
                        .exec(txn)
                        .await?;
                    if updated.rows_affected == 0 {
                        // Already terminal — the inventory was restored (or
                        // kept) by the first application; never restore twice.
                        return Ok(false);
                    }

                    let transaction = transactions::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("transaction {id}")))?;
                    let ticket = tickets::Entity::find_by_id(transaction.ticket_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!("ticket {}", transaction.ticket_id))
                        })?;

                    tickets::Entity::update_many()
                        .col_expr(
                            tickets::Column::Status,
                            Expr::value(TicketStatus::Cancelled.as_str()),
                        )
                        .col_expr(tickets::Column::UpdatedAt, Expr::value(now))
                        .filter(tickets::Column::Id.eq(ticket.id))
                        .exec(txn)
                        .await?;

                    events::Entity::update_many()
                        .col_expr(
                            events::Column::AvailableTickets,
                            Expr::col(events::Column::AvailableTickets).add(ticket.quantity),
                        )
                        .col_expr(events::Column::UpdatedAt, Expr::value(now))
                        .filter(events::Column::Id.eq(ticket.event_id))
                        .exec(txn)
                        .await?;

                    Ok(true)
                })
            })
            .await
            .context("fail pending transaction")?;
        Ok(applied)
    }
}

fn transaction_from_model(model: transactions::Model) -> Result<Transaction, ApiError> {
    Ok(Transaction {
        id: model.id,
        ticket_id: model.ticket_id,
        amount: model.amount,
        status: TransactionStatus::parse(&model.status)
            .ok_or_else(|| anyhow!("unknown stored transaction status: {}", model.status))?,
        phone_number: model.phone_number,
        merchant_request_id: model.merchant_request_id,
        checkout_request_id: model.checkout_request_id,
        receipt_number: model.receipt_number,
        failure_reason: model.failure_reason,
        completed_at: model.completed_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
