use async_trait::async_trait;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    search_term, BidFilter, BidListing, EventFilter, EventListing, ProfileFilter, ProfileListing,
    Store, StoreError, VendorFilter, VendorListing,
};
use crate::models::{
    Account, BidDraft, BidStatus, Event, EventBid, EventDraft, GeoState, NewAccount, Profile,
    Role, Session, VendorProfile, VendorProfileDraft,
};

const ACCOUNT_COLUMNS: &str = "a.id, a.username, a.email, a.password_hash, a.is_staff, a.created_at";

const EVENT_COLUMNS: &str = "e.id, e.created_by, e.title, e.description, e.date, e.start_time, \
    e.end_time, e.city, e.state, e.country, e.latitude, e.longitude, e.needs_sound, \
    e.needs_lighting, e.needs_video, e.needs_staging, e.full_service_package, e.is_published, \
    e.created_at, e.updated_at";

const BID_COLUMNS: &str =
    "b.id, b.event_id, b.vendor_id, b.message, b.estimated_budget, b.status, b.created_at, b.updated_at";

const VENDOR_COLUMNS: &str = "v.id, v.account_id, v.company_name, v.base_city, v.base_state, \
    v.base_zip, v.base_latitude, v.base_longitude, v.use_radius, v.max_travel_radius_miles, \
    ARRAY(SELECT s.state_code FROM vendor_service_states s \
          WHERE s.vendor_id = v.id ORDER BY s.state_code) AS service_states";

/// Postgres-backed store. Multi-statement writes run in one transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(StoreError::Migration)?;
        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn seed_states(&self, states: &[(&str, &str)]) -> Result<(), StoreError> {
        let codes: Vec<String> = states.iter().map(|(code, _)| code.to_string()).collect();
        let names: Vec<String> = states.iter().map(|(_, name)| name.to_string()).collect();

        let inserted = sqlx::query(
            "INSERT INTO states (code, name) \
             SELECT * FROM UNNEST($1::text[], $2::text[]) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(&codes)
        .bind(&names)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::debug!(inserted, "Reference states seeded");
        Ok(())
    }

    async fn list_states(&self) -> Result<Vec<GeoState>, StoreError> {
        self.search_states(None).await
    }

    async fn create_account(
        &self,
        account: NewAccount,
        role: Option<Role>,
    ) -> Result<Account, StoreError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, username, email, password_hash, is_staff) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, email, password_hash, is_staff, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_staff)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(role) = role {
            sqlx::query("INSERT INTO profiles (account_id, role) VALUES ($1, $2)")
                .bind(created.id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let sql =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE lower(a.username) = lower($1)");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn profile_for(&self, account_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT account_id, role FROM profiles WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn create_session(
        &self,
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<Session, StoreError> {
        let session = Session::issue(account_id, ttl);
        sqlx::query(
            "INSERT INTO sessions (token, account_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.account_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(session)
    }

    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM sessions s JOIN accounts a ON a.id = s.account_id \
             WHERE s.token = $1 AND s.expires_at > now()"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn vendor_profile_for(
        &self,
        account_id: Uuid,
    ) -> Result<Option<VendorProfile>, StoreError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendor_profiles v WHERE v.account_id = $1");
        let profile = sqlx::query_as::<_, VendorProfile>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_vendor_profile(&self, id: Uuid) -> Result<Option<VendorProfile>, StoreError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendor_profiles v WHERE v.id = $1");
        let profile = sqlx::query_as::<_, VendorProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn upsert_vendor_profile(
        &self,
        account_id: Uuid,
        draft: VendorProfileDraft,
    ) -> Result<VendorProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The conflicting row stays locked until commit, so a concurrent
        // resubmission queues behind this one.
        let vendor_id: Uuid = sqlx::query_scalar(
            "INSERT INTO vendor_profiles (id, account_id, company_name, base_city, base_state, base_zip) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (account_id) DO UPDATE SET \
                 company_name = EXCLUDED.company_name, \
                 base_city = EXCLUDED.base_city, \
                 base_state = EXCLUDED.base_state, \
                 base_zip = EXCLUDED.base_zip \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&draft.company_name)
        .bind(&draft.base_city)
        .bind(&draft.base_state)
        .bind(&draft.base_zip)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM vendor_service_states WHERE vendor_id = $1")
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO vendor_service_states (vendor_id, state_code) \
             SELECT $1, code FROM UNNEST($2::text[]) AS code",
        )
        .bind(vendor_id)
        .bind(&draft.service_states)
        .execute(&mut *tx)
        .await?;

        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendor_profiles v WHERE v.id = $1");
        let profile = sqlx::query_as::<_, VendorProfile>(&sql)
            .bind(vendor_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(profile)
    }

    async fn create_event(&self, owner: Uuid, draft: EventDraft) -> Result<Event, StoreError> {
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, created_by, title, description, date, start_time, end_time, \
                 city, state, needs_sound, needs_lighting, needs_video, needs_staging, \
                 full_service_package) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.date)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(draft.needs_sound)
        .bind(draft.needs_lighting)
        .bind(draft.needs_video)
        .bind(draft.needs_staging)
        .bind(draft.full_service_package)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, draft: EventDraft) -> Result<Event, StoreError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = $2, description = $3, date = $4, start_time = $5, \
                 end_time = $6, city = $7, state = $8, needs_sound = $9, needs_lighting = $10, \
                 needs_video = $11, needs_staging = $12, full_service_package = $13, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.date)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(draft.needs_sound)
        .bind(draft.needs_lighting)
        .bind(draft.needs_video)
        .bind(draft.needs_staging)
        .bind(draft.full_service_package)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("event {id}")))
    }

    async fn toggle_event_published(&self, id: Uuid) -> Result<Event, StoreError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET is_published = NOT is_published, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("event {id}")))
    }

    async fn events_created_by(&self, owner: Uuid) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.created_by = $1 \
             ORDER BY e.created_at DESC"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn matching_events(&self, vendor_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.is_published \
               AND e.state IN (SELECT s.state_code FROM vendor_service_states s \
                               WHERE s.vendor_id = $1) \
             ORDER BY e.created_at DESC"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn create_bid(
        &self,
        event_id: Uuid,
        vendor_id: Uuid,
        draft: BidDraft,
    ) -> Result<EventBid, StoreError> {
        let bid = sqlx::query_as::<_, EventBid>(
            "INSERT INTO event_bids (id, event_id, vendor_id, message, estimated_budget, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(vendor_id)
        .bind(&draft.message)
        .bind(draft.estimated_budget)
        .bind(BidStatus::Submitted.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(bid)
    }

    async fn find_bid(&self, id: Uuid) -> Result<Option<EventBid>, StoreError> {
        let sql = format!("SELECT {BID_COLUMNS} FROM event_bids b WHERE b.id = $1");
        let bid = sqlx::query_as::<_, EventBid>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bid)
    }

    async fn bid_for(
        &self,
        event_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<EventBid>, StoreError> {
        let sql = format!(
            "SELECT {BID_COLUMNS} FROM event_bids b WHERE b.event_id = $1 AND b.vendor_id = $2"
        );
        let bid = sqlx::query_as::<_, EventBid>(&sql)
            .bind(event_id)
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bid)
    }

    async fn bids_for_event(&self, event_id: Uuid) -> Result<Vec<BidListing>, StoreError> {
        let sql = format!(
            "SELECT {BID_COLUMNS}, e.title AS event_title, v.company_name AS vendor_company \
             FROM event_bids b \
             JOIN events e ON e.id = b.event_id \
             JOIN vendor_profiles v ON v.id = b.vendor_id \
             WHERE b.event_id = $1 \
             ORDER BY b.created_at DESC"
        );
        let bids = sqlx::query_as::<_, BidListing>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(bids)
    }

    async fn set_bid_status(&self, id: Uuid, status: BidStatus) -> Result<EventBid, StoreError> {
        sqlx::query_as::<_, EventBid>(
            "UPDATE event_bids SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("bid {id}")))
    }

    async fn search_states(&self, q: Option<&str>) -> Result<Vec<GeoState>, StoreError> {
        let states = sqlx::query_as::<_, GeoState>(
            "SELECT code, name FROM states \
             WHERE $1::text IS NULL \
                OR strpos(lower(code), $1) > 0 \
                OR strpos(lower(name), $1) > 0 \
             ORDER BY name",
        )
        .bind(search_term(q))
        .fetch_all(&self.pool)
        .await?;
        Ok(states)
    }

    async fn search_profiles(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileListing>, StoreError> {
        let profiles = sqlx::query_as::<_, ProfileListing>(
            "SELECT p.account_id, a.username, a.email, p.role \
             FROM profiles p JOIN accounts a ON a.id = p.account_id \
             WHERE ($1::text IS NULL OR p.role = $1) \
               AND ($2::text IS NULL \
                    OR strpos(lower(a.username), $2) > 0 \
                    OR strpos(lower(a.email), $2) > 0) \
             ORDER BY a.username",
        )
        .bind(filter.role.map(Role::as_str))
        .bind(search_term(filter.q.as_deref()))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn search_vendors(
        &self,
        filter: &VendorFilter,
    ) -> Result<Vec<VendorListing>, StoreError> {
        let vendors = sqlx::query_as::<_, VendorListing>(
            "SELECT v.id, v.account_id, a.username, v.company_name, v.base_city, v.base_state \
             FROM vendor_profiles v JOIN accounts a ON a.id = v.account_id \
             WHERE ($1::text IS NULL OR v.base_state = $1) \
               AND ($2::text IS NULL \
                    OR strpos(lower(v.company_name), $2) > 0 \
                    OR strpos(lower(a.username), $2) > 0) \
             ORDER BY v.company_name",
        )
        .bind(filter.base_state.as_deref())
        .bind(search_term(filter.q.as_deref()))
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    async fn search_events(&self, filter: &EventFilter) -> Result<Vec<EventListing>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}, a.username AS created_by_username \
             FROM events e JOIN accounts a ON a.id = e.created_by \
             WHERE ($1::boolean IS NULL OR e.is_published = $1) \
               AND ($2::text IS NULL OR e.state = $2) \
               AND ($3::date IS NULL OR e.date = $3) \
               AND ($4::text IS NULL \
                    OR strpos(lower(e.title), $4) > 0 \
                    OR strpos(lower(e.description), $4) > 0 \
                    OR strpos(lower(e.city), $4) > 0) \
             ORDER BY e.created_at DESC"
        );
        let events = sqlx::query_as::<_, EventListing>(&sql)
            .bind(filter.is_published)
            .bind(filter.state.as_deref())
            .bind(filter.date)
            .bind(search_term(filter.q.as_deref()))
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn search_bids(&self, filter: &BidFilter) -> Result<Vec<BidListing>, StoreError> {
        let sql = format!(
            "SELECT {BID_COLUMNS}, e.title AS event_title, v.company_name AS vendor_company \
             FROM event_bids b \
             JOIN events e ON e.id = b.event_id \
             JOIN vendor_profiles v ON v.id = b.vendor_id \
             WHERE ($1::text IS NULL OR b.status = $1) \
               AND ($2::text IS NULL \
                    OR strpos(lower(e.title), $2) > 0 \
                    OR strpos(lower(v.company_name), $2) > 0) \
             ORDER BY b.created_at DESC"
        );
        let bids = sqlx::query_as::<_, BidListing>(&sql)
            .bind(filter.status.map(BidStatus::as_str))
            .bind(search_term(filter.q.as_deref()))
            .fetch_all(&self.pool)
            .await?;
        Ok(bids)
    }
}
