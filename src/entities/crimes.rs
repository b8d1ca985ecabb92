use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "crimes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub criminal_id: String,

    pub statute_id: String,

    pub case_id: Option<String>,

    pub name: String,

    pub description: Option<String>,

    /// One of `misdemeanor`, `felony`, `citation`
    pub charge_level: Option<String>,

    /// One of `pending`, `charged`, `convicted`, `acquitted`
    pub status: String,

    pub created_by: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::criminals::Entity",
        from = "Column::CriminalId",
        to = "super::criminals::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Criminals,

    #[sea_orm(
        belongs_to = "super::statutes::Entity",
        from = "Column::StatuteId",
        to = "super::statutes::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Statutes,

    #[sea_orm(
        belongs_to = "super::cases::Entity",
        from = "Column::CaseId",
        to = "super::cases::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Cases,
}

impl Related<super::criminals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Criminals.def()
    }
}

impl Related<super::statutes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statutes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
