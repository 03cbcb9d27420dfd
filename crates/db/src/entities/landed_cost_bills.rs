//! `SeaORM` Entity for landed_cost_bills table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "landed_cost_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub expense_account_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::landed_cost_vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::landed_cost_vouchers::Column::Id"
    )]
    LandedCostVouchers,
}

impl Related<super::landed_cost_vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LandedCostVouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
