//! `SeaORM` Entity for landed_cost_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "landed_cost_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub stock_movement_id: Uuid,
    pub quantity: Decimal,
    pub original_cost: Decimal,
    pub allocated_cost: Decimal,
    pub new_unit_cost: Decimal,
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
