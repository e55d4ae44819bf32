use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{
    search_term, BidFilter, BidListing, EventFilter, EventListing, ProfileFilter, ProfileListing,
    Store, StoreError, VendorFilter, VendorListing,
};
use crate::matching;
use crate::models::event::DEFAULT_COUNTRY;
use crate::models::{
    Account, BidDraft, BidStatus, Event, EventBid, EventDraft, GeoState, NewAccount, Profile,
    Role, Session, VendorProfile, VendorProfileDraft, US_STATES,
};

/// In-process store guarded by a single mutex.
///
/// Every trait method takes the lock once, so check-and-insert sequences
/// (username and bid uniqueness) are atomic the same way a database
/// constraint would make them.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    states: BTreeMap<String, GeoState>,
    accounts: HashMap<Uuid, Account>,
    profiles: HashMap<Uuid, Profile>,
    sessions: HashMap<String, Session>,
    vendors: HashMap<Uuid, VendorProfile>,
    events: HashMap<Uuid, Event>,
    bids: HashMap<Uuid, EventBid>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing clock so newest-first ordering stays stable.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn username_taken(&self, username: &str) -> bool {
        let wanted = username.to_lowercase();
        self.accounts
            .values()
            .any(|account| account.username.to_lowercase() == wanted)
    }

    fn vendor_for_account(&self, account_id: Uuid) -> Option<&VendorProfile> {
        self.vendors
            .values()
            .find(|vendor| vendor.account_id == account_id)
    }

    fn username_of(&self, account_id: Uuid) -> String {
        self.accounts
            .get(&account_id)
            .map(|account| account.username.clone())
            .unwrap_or_default()
    }

    fn bid_listing(&self, bid: &EventBid) -> BidListing {
        BidListing {
            bid: bid.clone(),
            event_title: self
                .events
                .get(&bid.event_id)
                .map(|event| event.title.clone())
                .unwrap_or_default(),
            vendor_company: self
                .vendors
                .get(&bid.vendor_id)
                .map(|vendor| vendor.company_name.clone())
                .unwrap_or_default(),
        }
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the reference state table.
    pub fn with_reference_states() -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            for (code, name) in US_STATES {
                inner.states.insert(
                    code.to_string(),
                    GeoState {
                        code: code.to_string(),
                        name: name.to_string(),
                    },
                );
            }
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn seed_states(&self, states: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for (code, name) in states {
            inner
                .states
                .entry(code.to_string())
                .or_insert_with(|| GeoState {
                    code: code.to_string(),
                    name: name.to_string(),
                });
        }
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
        let mut inner = self.lock()?;
        if inner.username_taken(&account.username) {
            return Err(StoreError::Conflict(
                "accounts_username_lower_key".to_string(),
            ));
        }

        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_staff: account.is_staff,
            created_at: inner.tick(),
        };
        inner.accounts.insert(created.id, created.clone());
        if let Some(role) = role {
            inner.profiles.insert(
                created.id,
                Profile {
                    account_id: created.id,
                    role,
                },
            );
        }
        Ok(created)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let wanted = username.to_lowercase();
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|account| account.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn profile_for(&self, account_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.lock()?.profiles.get(&account_id).cloned())
    }

    async fn create_session(
        &self,
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<Session, StoreError> {
        let session = Session::issue(account_id, ttl);
        self.lock()?
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.lock()?;
        let account = inner
            .sessions
            .get(token)
            .filter(|session| !session.is_expired_at(Utc::now()))
            .and_then(|session| inner.accounts.get(&session.account_id))
            .cloned();
        Ok(account)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.lock()?.sessions.remove(token);
        Ok(())
    }

    async fn vendor_profile_for(
        &self,
        account_id: Uuid,
    ) -> Result<Option<VendorProfile>, StoreError> {
        Ok(self.lock()?.vendor_for_account(account_id).cloned())
    }

    async fn find_vendor_profile(&self, id: Uuid) -> Result<Option<VendorProfile>, StoreError> {
        Ok(self.lock()?.vendors.get(&id).cloned())
    }

    async fn upsert_vendor_profile(
        &self,
        account_id: Uuid,
        draft: VendorProfileDraft,
    ) -> Result<VendorProfile, StoreError> {
        let mut inner = self.lock()?;
        if let Some(unknown) = draft
            .service_states
            .iter()
            .find(|code| !inner.states.contains_key(code.as_str()))
        {
            return Err(StoreError::NotFound(format!("state {unknown}")));
        }

        let existing = inner.vendor_for_account(account_id).cloned();
        let profile = match existing {
            Some(mut profile) => {
                profile.company_name = draft.company_name;
                profile.base_city = draft.base_city;
                profile.base_state = draft.base_state;
                profile.base_zip = draft.base_zip;
                profile.service_states = draft.service_states;
                profile
            }
            None => VendorProfile {
                id: Uuid::new_v4(),
                account_id,
                company_name: draft.company_name,
                base_city: draft.base_city,
                base_state: draft.base_state,
                base_zip: draft.base_zip,
                base_latitude: None,
                base_longitude: None,
                service_states: draft.service_states,
                use_radius: false,
                max_travel_radius_miles: None,
            },
        };
        inner.vendors.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn create_event(&self, owner: Uuid, draft: EventDraft) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        let now = inner.tick();
        let event = Event {
            id: Uuid::new_v4(),
            created_by: owner,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            city: draft.city,
            state: draft.state,
            country: DEFAULT_COUNTRY.to_string(),
            latitude: None,
            longitude: None,
            needs_sound: draft.needs_sound,
            needs_lighting: draft.needs_lighting,
            needs_video: draft.needs_video,
            needs_staging: draft.needs_staging,
            full_service_package: draft.full_service_package,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn update_event(&self, id: Uuid, draft: EventDraft) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        let now = inner.tick();
        let event = inner
            .events
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("event {id}")))?;

        event.title = draft.title;
        event.description = draft.description;
        event.date = draft.date;
        event.start_time = draft.start_time;
        event.end_time = draft.end_time;
        event.city = draft.city;
        event.state = draft.state;
        event.needs_sound = draft.needs_sound;
        event.needs_lighting = draft.needs_lighting;
        event.needs_video = draft.needs_video;
        event.needs_staging = draft.needs_staging;
        event.full_service_package = draft.full_service_package;
        event.updated_at = now;
        Ok(event.clone())
    }

    async fn toggle_event_published(&self, id: Uuid) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        let now = inner.tick();
        let event = inner
            .events
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("event {id}")))?;
        event.is_published = !event.is_published;
        event.updated_at = now;
        Ok(event.clone())
    }

    async fn events_created_by(&self, owner: Uuid) -> Result<Vec<Event>, StoreError> {
        let inner = self.lock()?;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| event.is_owned_by(owner))
            .cloned()
            .collect();
        newest_first(&mut events, |event| event.created_at);
        Ok(events)
    }

    async fn matching_events(&self, vendor_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let inner = self.lock()?;
        let Some(vendor) = inner.vendors.get(&vendor_id) else {
            return Ok(Vec::new());
        };
        Ok(matching::matching_events(
            inner.events.values(),
            &vendor.service_states,
        ))
    }

    async fn create_bid(
        &self,
        event_id: Uuid,
        vendor_id: Uuid,
        draft: BidDraft,
    ) -> Result<EventBid, StoreError> {
        let mut inner = self.lock()?;
        if !inner.events.contains_key(&event_id) {
            return Err(StoreError::NotFound(format!("event {event_id}")));
        }
        if !inner.vendors.contains_key(&vendor_id) {
            return Err(StoreError::NotFound(format!("vendor {vendor_id}")));
        }
        if inner
            .bids
            .values()
            .any(|bid| bid.event_id == event_id && bid.vendor_id == vendor_id)
        {
            return Err(StoreError::Conflict(
                "event_bids_event_vendor_key".to_string(),
            ));
        }

        let now = inner.tick();
        let bid = EventBid {
            id: Uuid::new_v4(),
            event_id,
            vendor_id,
            message: draft.message,
            estimated_budget: draft.estimated_budget,
            status: BidStatus::Submitted,
            created_at: now,
            updated_at: now,
        };
        inner.bids.insert(bid.id, bid.clone());
        Ok(bid)
    }

    async fn find_bid(&self, id: Uuid) -> Result<Option<EventBid>, StoreError> {
        Ok(self.lock()?.bids.get(&id).cloned())
    }

    async fn bid_for(
        &self,
        event_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<EventBid>, StoreError> {
        Ok(self
            .lock()?
            .bids
            .values()
            .find(|bid| bid.event_id == event_id && bid.vendor_id == vendor_id)
            .cloned())
    }

    async fn bids_for_event(&self, event_id: Uuid) -> Result<Vec<BidListing>, StoreError> {
        let inner = self.lock()?;
        let mut bids: Vec<BidListing> = inner
            .bids
            .values()
            .filter(|bid| bid.event_id == event_id)
            .map(|bid| inner.bid_listing(bid))
            .collect();
        newest_first(&mut bids, |listing| listing.bid.created_at);
        Ok(bids)
    }

    async fn set_bid_status(&self, id: Uuid, status: BidStatus) -> Result<EventBid, StoreError> {
        let mut inner = self.lock()?;
        let now = inner.tick();
        let bid = inner
            .bids
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("bid {id}")))?;
        bid.status = status;
        bid.updated_at = now;
        Ok(bid.clone())
    }

    async fn search_states(&self, q: Option<&str>) -> Result<Vec<GeoState>, StoreError> {
        let term = search_term(q);
        let inner = self.lock()?;
        let mut states: Vec<GeoState> = inner
            .states
            .values()
            .filter(|state| match &term {
                Some(term) => contains(&state.code, term) || contains(&state.name, term),
                None => true,
            })
            .cloned()
            .collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(states)
    }

    async fn search_profiles(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileListing>, StoreError> {
        let term = search_term(filter.q.as_deref());
        let inner = self.lock()?;
        let mut profiles: Vec<ProfileListing> = inner
            .profiles
            .values()
            .filter(|profile| filter.role.map_or(true, |role| profile.role == role))
            .filter_map(|profile| {
                let account = inner.accounts.get(&profile.account_id)?;
                Some(ProfileListing {
                    account_id: account.id,
                    username: account.username.clone(),
                    email: account.email.clone(),
                    role: profile.role,
                })
            })
            .filter(|listing| match &term {
                Some(term) => contains(&listing.username, term) || contains(&listing.email, term),
                None => true,
            })
            .collect();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    async fn search_vendors(
        &self,
        filter: &VendorFilter,
    ) -> Result<Vec<VendorListing>, StoreError> {
        let term = search_term(filter.q.as_deref());
        let inner = self.lock()?;
        let mut vendors: Vec<VendorListing> = inner
            .vendors
            .values()
            .filter(|vendor| {
                filter
                    .base_state
                    .as_deref()
                    .map_or(true, |state| vendor.base_state == state)
            })
            .map(|vendor| VendorListing {
                id: vendor.id,
                account_id: vendor.account_id,
                username: inner.username_of(vendor.account_id),
                company_name: vendor.company_name.clone(),
                base_city: vendor.base_city.clone(),
                base_state: vendor.base_state.clone(),
            })
            .filter(|listing| match &term {
                Some(term) => {
                    contains(&listing.company_name, term) || contains(&listing.username, term)
                }
                None => true,
            })
            .collect();
        vendors.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(vendors)
    }

    async fn search_events(&self, filter: &EventFilter) -> Result<Vec<EventListing>, StoreError> {
        let term = search_term(filter.q.as_deref());
        let inner = self.lock()?;
        let mut events: Vec<EventListing> = inner
            .events
            .values()
            .filter(|event| {
                filter
                    .is_published
                    .map_or(true, |published| event.is_published == published)
            })
            .filter(|event| {
                filter
                    .state
                    .as_deref()
                    .map_or(true, |state| event.state == state)
            })
            .filter(|event| filter.date.map_or(true, |date| event.date == Some(date)))
            .filter(|event| match &term {
                Some(term) => {
                    contains(&event.title, term)
                        || contains(&event.description, term)
                        || contains(&event.city, term)
                }
                None => true,
            })
            .map(|event| EventListing {
                event: event.clone(),
                created_by_username: inner.username_of(event.created_by),
            })
            .collect();
        newest_first(&mut events, |listing| listing.event.created_at);
        Ok(events)
    }

    async fn search_bids(&self, filter: &BidFilter) -> Result<Vec<BidListing>, StoreError> {
        let term = search_term(filter.q.as_deref());
        let inner = self.lock()?;
        let mut bids: Vec<BidListing> = inner
            .bids
            .values()
            .filter(|bid| filter.status.map_or(true, |status| bid.status == status))
            .map(|bid| inner.bid_listing(bid))
            .filter(|listing| match &term {
                Some(term) => {
                    contains(&listing.event_title, term) || contains(&listing.vendor_company, term)
                }
                None => true,
            })
            .collect();
        newest_first(&mut bids, |listing| listing.bid.created_at);
        Ok(bids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            is_staff: false,
        }
    }

    fn vendor_draft(states: &[&str]) -> VendorProfileDraft {
        VendorProfileDraft {
            company_name: "Loud & Clear".to_string(),
            service_states: states.iter().map(|code| code.to_string()).collect(),
            ..VendorProfileDraft::default()
        }
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store
            .create_account(new_account("Dana"), Some(Role::Vendor))
            .await
            .expect("first account");

        let err = store
            .create_account(new_account("dana"), Some(Role::EventManager))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.lock().unwrap().accounts.len(), 1);
        assert_eq!(store.lock().unwrap().profiles.len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_service_states_in_place() {
        let store = MemoryStore::with_reference_states();
        let account = store
            .create_account(new_account("vendor"), Some(Role::Vendor))
            .await
            .unwrap();

        let first = store
            .upsert_vendor_profile(account.id, vendor_draft(&["CA", "NY"]))
            .await
            .unwrap();
        let second = store
            .upsert_vendor_profile(account.id, vendor_draft(&["TX"]))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.service_states, vec!["TX".to_string()]);
        assert_eq!(store.lock().unwrap().vendors.len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_unknown_state_codes() {
        let store = MemoryStore::with_reference_states();
        let err = store
            .upsert_vendor_profile(Uuid::new_v4(), vendor_draft(&["ZZ"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_bid_keeps_the_first() {
        let store = MemoryStore::with_reference_states();
        let account = store
            .create_account(new_account("vendor"), Some(Role::Vendor))
            .await
            .unwrap();
        let vendor = store
            .upsert_vendor_profile(account.id, vendor_draft(&["CA"]))
            .await
            .unwrap();
        let event = store
            .create_event(
                Uuid::new_v4(),
                EventDraft {
                    title: "Gala".to_string(),
                    state: "CA".to_string(),
                    ..EventDraft::default()
                },
            )
            .await
            .unwrap();

        let first = store
            .create_bid(
                event.id,
                vendor.id,
                BidDraft {
                    message: "first".to_string(),
                    estimated_budget: Some(Decimal::new(50000, 2)),
                },
            )
            .await
            .unwrap();
        let err = store
            .create_bid(
                event.id,
                vendor.id,
                BidDraft {
                    message: "second".to_string(),
                    estimated_budget: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        let stored = store.find_bid(first.id).await.unwrap().unwrap();
        assert_eq!(stored.message, "first");
        assert_eq!(stored.estimated_budget, Some(Decimal::new(50000, 2)));
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_nobody() {
        let store = MemoryStore::new();
        let account = store
            .create_account(new_account("sam"), None)
            .await
            .unwrap();

        let live = store
            .create_session(account.id, Duration::hours(1))
            .await
            .unwrap();
        let expired = store
            .create_session(account.id, Duration::seconds(-1))
            .await
            .unwrap();

        assert!(store.session_account(&live.token).await.unwrap().is_some());
        assert!(store.session_account(&expired.token).await.unwrap().is_none());

        store.delete_session(&live.token).await.unwrap();
        assert!(store.session_account(&live.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggle_is_its_own_inverse() {
        let store = MemoryStore::new();
        let event = store
            .create_event(Uuid::new_v4(), EventDraft::default())
            .await
            .unwrap();
        assert!(!event.is_published);

        let once = store.toggle_event_published(event.id).await.unwrap();
        let twice = store.toggle_event_published(event.id).await.unwrap();

        assert!(once.is_published);
        assert!(!twice.is_published);
        assert_eq!(twice.created_at, event.created_at);
        assert!(twice.updated_at > event.updated_at);
    }
}
