//! `SeaORM` Entity for payment_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub payment_type: String,
    pub payment_id: Uuid,
    pub document_type: String,
    pub document_id: Uuid,
    pub allocated_amount: Decimal,
    pub allocation_date: Date,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id"
    )]
    Documents,
    #[sea_orm(
        belongs_to = "super::cash_transactions::Entity",
        from = "Column::PaymentId",
        to = "super::cash_transactions::Column::Id"
    )]
    CashTransactions,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::cash_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
