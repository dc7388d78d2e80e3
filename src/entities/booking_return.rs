use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hand-back record of a booking; at most one per booking
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_return")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i32,
    #[sea_orm(unique)]
    pub booking_id: i32,
    pub return_date: Date,
    pub final_odometer_reading: i32,
    pub is_damage: bool,
    pub damage_notes: Option<String>,
    pub refunded_deposit_amount: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
