use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[sea_orm(string_value = "petrol")]
    Petrol,
    #[sea_orm(string_value = "diesel")]
    Diesel,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
    #[sea_orm(string_value = "electric")]
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "auto")]
    Auto,
}

/// Administrative status set by staff.
///
/// Availability for a date range is never read from this field; it is
/// computed from bookings by [`crate::services::availability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(rename = "vehicle_id")]
    pub id: i32,
    pub category_id: i32,
    pub sub_category_id: i32,
    pub vehicle_name: String,
    pub engine_capacity: i32,
    pub fuel_type: FuelType,
    pub color: String,
    pub make: String,
    pub model: String,
    pub transmission: Transmission,
    pub price_per_day: Decimal,
    pub no_of_seats: i32,
    pub insurance_no: String,
    pub insurance_expiry: Date,
    #[sea_orm(unique)]
    pub registration_no: String,
    #[sea_orm(unique)]
    pub vin: String,
    pub description: Option<String>,
    pub base_km_per_day: i32,
    pub excess_km_charge: Decimal,
    pub registration_expiry: Date,
    pub deposit_amount: Decimal,
    pub vat_amount: Decimal,
    pub odometer_reading: i32,
    pub late_fee: Decimal,
    pub is_under_maintenance: bool,
    pub status: VehicleStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_category::Entity",
        from = "Column::CategoryId",
        to = "super::vehicle_category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::vehicle_sub_category::Entity",
        from = "Column::SubCategoryId",
        to = "super::vehicle_sub_category::Column::Id"
    )]
    SubCategory,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::vehicle_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::vehicle_sub_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategory.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
