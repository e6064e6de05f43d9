use sea_orm::entity::prelude::*;

/// Payment transaction, one-to-one with its ticket.
///
/// Terminal states are one-way: PENDING -> COMPLETED | FAILED. The unique
/// `receipt_number` backs duplicate-callback detection at the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ticket_id: Uuid,
    /// Whole currency units (KES): event price x ticket quantity.
    pub amount: i64,
    /// "PENDING", "COMPLETED", or "FAILED".
    pub status: String,
    pub phone_number: Option<String>,
    /// Provider correlation ids, set when a push payment is initiated.
    pub merchant_request_id: Option<String>,
    #[sea_orm(unique)]
    pub checkout_request_id: Option<String>,
    /// Provider receipt, set on successful completion.
    #[sea_orm(unique)]
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tickets::Entity",
        from = "Column::TicketId",
        to = "super::tickets::Column::Id"
    )]
    Tickets,
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
