//! `SeaORM` Entity for landed_cost_vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "landed_cost_vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub number: String,
    pub date: Date,
    pub allocation_method: String,
    pub status: String,
    pub journal_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::landed_cost_bills::Entity")]
    LandedCostBills,
    #[sea_orm(has_many = "super::landed_cost_items::Entity")]
    LandedCostItems,
}

impl Related<super::landed_cost_bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LandedCostBills.def()
    }
}

impl Related<super::landed_cost_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LandedCostItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
