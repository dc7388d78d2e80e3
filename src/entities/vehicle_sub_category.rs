use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_sub_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(rename = "sub_category_id")]
    pub id: i32,
    #[serde(rename = "category")]
    pub category_id: i32,
    #[serde(rename = "sub_category_name")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_category::Entity",
        from = "Column::CategoryId",
        to = "super::vehicle_category::Column::Id"
    )]
    Category,
}

impl Related<super::vehicle_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
