use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "option_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub option_set_id: Uuid,
    pub value: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::option_set::Entity",
        from = "Column::OptionSetId",
        to = "super::option_set::Column::Id"
    )]
    OptionSet,
}

impl Related<super::option_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OptionSet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
