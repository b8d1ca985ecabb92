use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "criminals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// JSON array of alternate names
    pub aliases: Option<String>,

    pub date_of_birth: Option<String>,

    pub address: Option<String>,

    /// One of `low`, `medium`, `high`
    pub threat_level: String,

    /// One of `active`, `incarcerated`, `released`
    pub status: String,

    pub notes: Option<String>,

    pub created_by: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Users,

    #[sea_orm(has_many = "super::crimes::Entity")]
    Crimes,
}

impl Related<super::crimes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crimes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
