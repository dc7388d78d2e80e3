use std::fmt;

use sea_orm::{entity::prelude::*, Iterable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl BookingStatus {
    /// Statuses that hold the vehicle and block overlapping reservations
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Ongoing];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Ongoing => "ongoing",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Overdue => "overdue",
        }
    }

    /// Case-insensitive lookup used by list filters
    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DrivingType {
    #[sea_orm(string_value = "self_drive")]
    SelfDrive,
    #[sea_orm(string_value = "need_driver")]
    NeedDriver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum FuelResponsibility {
    #[sea_orm(string_value = "by_client")]
    ByClient,
    #[sea_orm(string_value = "by_company")]
    ByCompany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    #[sea_orm(string_value = "comprehensive")]
    Comprehensive,
    #[sea_orm(string_value = "general")]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "flat")]
    Flat,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(rename = "booking_id")]
    pub id: i32,
    pub booking_date: DateTimeWithTimeZone,
    pub return_date: DateTimeWithTimeZone,
    pub pickup_location_id: i32,
    pub dropoff_location_id: i32,
    pub starting_odometer_reading: i32,
    pub is_return_to_same_location: bool,
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub driving_type: DrivingType,
    pub driver_id: Option<i32>,
    pub no_of_passengers: i32,
    pub fuel_responsibility: FuelResponsibility,
    pub deposited_amount: Decimal,
    pub is_vat_applicable: bool,
    pub insurance_type: InsuranceType,
    pub insurance_value: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub discount: Option<Decimal>,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::PickupLocationId",
        to = "super::location::Column::Id"
    )]
    PickupLocation,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::DropoffLocationId",
        to = "super::location::Column::Id"
    )]
    DropoffLocation,
    #[sea_orm(has_many = "super::booking_add_on::Entity")]
    AddOns,
    #[sea_orm(has_one = "super::booking_return::Entity")]
    Return,
    #[sea_orm(has_many = "super::booking_extension::Entity")]
    Extensions,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::booking_add_on::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AddOns.def()
    }
}

impl Related<super::booking_return::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Return.def()
    }
}

impl Related<super::booking_extension::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Extensions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
