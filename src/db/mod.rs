use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{cases, criminals, crimes, evidence, statutes};

pub mod migrator;
pub mod repositories;

pub use repositories::case::{CaseUpdate, NewCase};
pub use repositories::crime::{CrimeUpdate, NewCrime};
pub use repositories::criminal::{CriminalUpdate, NewCriminal};
pub use repositories::evidence::{EvidenceUpdate, NewEvidence};
pub use repositories::session::{REFRESH_WINDOW_SECS, SESSION_TTL_SECS, Session};
pub use repositories::statute::{NewStatute, StatuteUpdate};
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn case_repo(&self) -> repositories::case::CaseRepository {
        repositories::case::CaseRepository::new(self.conn.clone())
    }

    fn criminal_repo(&self) -> repositories::criminal::CriminalRepository {
        repositories::criminal::CriminalRepository::new(self.conn.clone())
    }

    fn evidence_repo(&self) -> repositories::evidence::EvidenceRepository {
        repositories::evidence::EvidenceRepository::new(self.conn.clone())
    }

    fn statute_repo(&self) -> repositories::statute::StatuteRepository {
        repositories::statute::StatuteRepository::new(self.conn.clone())
    }

    fn crime_repo(&self) -> repositories::crime::CrimeRepository {
        repositories::crime::CrimeRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        new_user: NewUser,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user_password(
        &self,
        user_id: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: &str,
        name: Option<String>,
        bio: Option<String>,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(user_id, name, bio).await
    }

    // ========== Sessions ==========

    pub async fn create_session(&self, user_id: &str) -> Result<Session> {
        self.session_repo().create(user_id).await
    }

    pub async fn validate_session_token(&self, token: &str) -> Result<Option<(Session, User)>> {
        self.session_repo().validate(token).await
    }

    pub async fn invalidate_session(&self, token: &str) -> Result<()> {
        self.session_repo().invalidate(token).await
    }

    pub async fn invalidate_sessions_for_user(&self, user_id: &str) -> Result<u64> {
        self.session_repo().invalidate_for_user(user_id).await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.session_repo().purge_expired().await
    }

    // ========== Cases ==========

    pub async fn create_case(&self, new_case: NewCase, created_by: &str) -> Result<cases::Model> {
        self.case_repo().create(new_case, created_by).await
    }

    pub async fn list_cases_for_user(&self, user_id: &str) -> Result<Vec<cases::Model>> {
        self.case_repo().list_for_user(user_id).await
    }

    pub async fn get_owned_case(&self, id: &str, user_id: &str) -> Result<Option<cases::Model>> {
        self.case_repo().get_owned(id, user_id).await
    }

    pub async fn update_owned_case(
        &self,
        id: &str,
        user_id: &str,
        update: CaseUpdate,
    ) -> Result<Option<cases::Model>> {
        self.case_repo().update_owned(id, user_id, update).await
    }

    pub async fn delete_owned_case(&self, id: &str, user_id: &str) -> Result<bool> {
        self.case_repo().delete_owned(id, user_id).await
    }

    pub async fn case_exists(&self, id: &str) -> Result<bool> {
        self.case_repo().exists(id).await
    }

    // ========== Criminals ==========

    pub async fn create_criminal(
        &self,
        new_criminal: NewCriminal,
        created_by: &str,
    ) -> Result<criminals::Model> {
        self.criminal_repo().create(new_criminal, created_by).await
    }

    pub async fn list_criminals(&self) -> Result<Vec<criminals::Model>> {
        self.criminal_repo().list().await
    }

    pub async fn get_criminal(&self, id: &str) -> Result<Option<criminals::Model>> {
        self.criminal_repo().get(id).await
    }

    pub async fn update_criminal(
        &self,
        id: &str,
        update: CriminalUpdate,
    ) -> Result<Option<criminals::Model>> {
        self.criminal_repo().update(id, update).await
    }

    pub async fn delete_criminal(&self, id: &str) -> Result<bool> {
        self.criminal_repo().delete(id).await
    }

    pub async fn criminal_exists(&self, id: &str) -> Result<bool> {
        self.criminal_repo().exists(id).await
    }

    // ========== Evidence ==========

    pub async fn create_evidence(
        &self,
        new_evidence: NewEvidence,
        uploaded_by: &str,
    ) -> Result<evidence::Model> {
        self.evidence_repo().create(new_evidence, uploaded_by).await
    }

    pub async fn list_evidence(&self, case_id: Option<&str>) -> Result<Vec<evidence::Model>> {
        self.evidence_repo().list(case_id).await
    }

    pub async fn get_evidence(&self, id: &str) -> Result<Option<evidence::Model>> {
        self.evidence_repo().get(id).await
    }

    pub async fn update_evidence(
        &self,
        id: &str,
        update: EvidenceUpdate,
    ) -> Result<Option<evidence::Model>> {
        self.evidence_repo().update(id, update).await
    }

    pub async fn delete_evidence(&self, id: &str) -> Result<bool> {
        self.evidence_repo().delete(id).await
    }

    // ========== Statutes ==========

    pub async fn create_statute(
        &self,
        new_statute: NewStatute,
        created_by: &str,
    ) -> Result<statutes::Model> {
        self.statute_repo().create(new_statute, created_by).await
    }

    pub async fn list_statutes(&self) -> Result<Vec<statutes::Model>> {
        self.statute_repo().list().await
    }

    pub async fn get_statute(&self, id: &str) -> Result<Option<statutes::Model>> {
        self.statute_repo().get(id).await
    }

    pub async fn update_statute(
        &self,
        id: &str,
        update: StatuteUpdate,
    ) -> Result<Option<statutes::Model>> {
        self.statute_repo().update(id, update).await
    }

    pub async fn delete_statute(&self, id: &str) -> Result<bool> {
        self.statute_repo().delete(id).await
    }

    pub async fn statute_exists(&self, id: &str) -> Result<bool> {
        self.statute_repo().exists(id).await
    }

    // ========== Crimes ==========

    pub async fn create_crime(&self, new_crime: NewCrime, created_by: &str) -> Result<crimes::Model> {
        self.crime_repo().create(new_crime, created_by).await
    }

    pub async fn list_crimes(&self) -> Result<Vec<crimes::Model>> {
        self.crime_repo().list().await
    }

    pub async fn list_crimes_for_criminal(&self, criminal_id: &str) -> Result<Vec<crimes::Model>> {
        self.crime_repo().list_for_criminal(criminal_id).await
    }

    pub async fn get_crime(&self, id: &str) -> Result<Option<crimes::Model>> {
        self.crime_repo().get(id).await
    }

    pub async fn update_crime(
        &self,
        id: &str,
        update: CrimeUpdate,
    ) -> Result<Option<crimes::Model>> {
        self.crime_repo().update(id, update).await
    }

    pub async fn delete_crime(&self, id: &str) -> Result<bool> {
        self.crime_repo().delete(id).await
    }

    // ========== Aggregate stats ==========

    pub async fn entity_counts(&self) -> Result<EntityCounts> {
        Ok(EntityCounts {
            cases: self.case_repo().count().await?,
            criminals: self.criminal_repo().count().await?,
            evidence: self.evidence_repo().count().await?,
            statutes: self.statute_repo().count().await?,
            crimes: self.crime_repo().count().await?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntityCounts {
    pub cases: u64,
    pub criminals: u64,
    pub evidence: u64,
    pub statutes: u64,
    pub crimes: u64,
}
