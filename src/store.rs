use crate::filter;
use crate::mock_data;
use crate::models::{Category, CategoryView, FilterState, FilterUpdate, Skin};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// The immutable product and category lists every store derives from.
#[derive(Debug, Clone)]
pub struct Catalog {
    skins: Arc<[Skin]>,
    categories: Arc<[Category]>,
}

impl Catalog {
    pub fn new(skins: Vec<Skin>, categories: Vec<Category>) -> Self {
        Catalog {
            skins: skins.into(),
            categories: categories.into(),
        }
    }

    pub fn mock() -> Self {
        Catalog::new(mock_data::skins().to_vec(), mock_data::categories().to_vec())
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

/// Filter criteria of one browsing session over a shared catalog.
///
/// Only the criteria are stored; the filtered list and the category
/// groupings are recomputed on each read.
#[derive(Debug, Clone)]
pub struct SkinStore {
    catalog: Catalog,
    filters: FilterState,
    featured_cap: usize,
}

impl SkinStore {
    pub fn new(catalog: Catalog, featured_cap: usize) -> Self {
        SkinStore {
            catalog,
            filters: FilterState::default(),
            featured_cap,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.filters.apply(update);
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
    }

    pub fn filtered_skins(&self) -> Vec<Skin> {
        filter::filter_skins(self.catalog.skins(), &self.filters)
    }

    pub fn categories(&self) -> Vec<CategoryView> {
        filter::categorize(
            self.catalog.categories(),
            &self.filtered_skins(),
            self.featured_cap,
        )
    }
}

struct Session {
    store: SkinStore,
    last_seen: Instant,
}

/// In-memory stores keyed by session id. Sessions are never persisted and
/// are dropped once idle for longer than `idle_ttl`.
pub struct SessionRegistry {
    catalog: Catalog,
    featured_cap: usize,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new(catalog: Catalog, featured_cap: usize, idle_ttl: Duration) -> Self {
        SessionRegistry {
            catalog,
            featured_cap,
            idle_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live session for `id`, refreshing its idle clock; an expired one is
    /// removed on the spot.
    fn touch<'a>(&self, sessions: &'a mut HashMap<Uuid, Session>, id: &Uuid) -> Option<&'a mut Session> {
        let expired = sessions
            .get(id)
            .map_or(false, |s| s.last_seen.elapsed() > self.idle_ttl);
        if expired {
            sessions.remove(id);
            log::debug!("browsing session {} expired", id);
            return None;
        }
        let session = sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        Some(session)
    }

    pub fn create(&self) -> (Uuid, FilterState) {
        let id = Uuid::new_v4();
        let store = SkinStore::new(self.catalog.clone(), self.featured_cap);
        let filters = store.filters().clone();
        self.lock().insert(
            id,
            Session {
                store,
                last_seen: Instant::now(),
            },
        );
        log::debug!("created browsing session {}", id);
        (id, filters)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        let mut sessions = self.lock();
        self.touch(&mut sessions, id).is_some()
    }

    pub fn with_store<R>(&self, id: &Uuid, f: impl FnOnce(&SkinStore) -> R) -> Option<R> {
        let mut sessions = self.lock();
        self.touch(&mut sessions, id).map(|s| f(&s.store))
    }

    pub fn with_store_mut<R>(&self, id: &Uuid, f: impl FnOnce(&mut SkinStore) -> R) -> Option<R> {
        let mut sessions = self.lock();
        self.touch(&mut sessions, id).map(|s| f(&mut s.store))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            log::debug!("ended browsing session {}", id);
        }
        removed
    }

    /// Drops every idle session and returns their ids.
    pub fn prune_expired(&self) -> Vec<Uuid> {
        let ttl = self.idle_ttl;
        let mut evicted = Vec::new();
        self.lock().retain(|id, session| {
            let keep = session.last_seen.elapsed() <= ttl;
            if !keep {
                evicted.push(*id);
            }
            keep
        });
        if !evicted.is_empty() {
            log::info!("evicted {} idle browsing sessions", evicted.len());
        }
        evicted
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelFilter, PriceFilter, TeslaModel};

    fn store() -> SkinStore {
        SkinStore::new(Catalog::mock(), 8)
    }

    #[test]
    fn update_then_clear_restores_full_list() {
        let mut store = store();
        store.update_filters(FilterUpdate {
            selected_model: Some(ModelFilter::Only(TeslaModel::Model3)),
            search_query: Some("neon".to_string()),
            selected_categories: Some(vec!["custom".to_string()]),
            selected_price: Some(PriceFilter::Paid),
        });
        assert_eq!(store.filtered_skins().len(), 1);

        store.clear_filters();
        assert_eq!(store.filters(), &FilterState::default());
        assert_eq!(store.filtered_skins(), mock_data::skins().to_vec());
    }

    #[test]
    fn update_is_idempotent() {
        let update = FilterUpdate {
            selected_price: Some(PriceFilter::Free),
            search_query: Some("c".to_string()),
            ..Default::default()
        };

        let mut once = store();
        once.update_filters(update.clone());
        let mut twice = store();
        twice.update_filters(update.clone());
        twice.update_filters(update);

        assert_eq!(once.filters(), twice.filters());
        assert_eq!(once.filtered_skins(), twice.filtered_skins());
    }

    #[test]
    fn derived_views_follow_criteria() {
        let mut store = store();
        store.update_filters(FilterUpdate {
            selected_model: Some(ModelFilter::Only(TeslaModel::Model3)),
            ..Default::default()
        });
        let views = store.categories();
        let total: usize = views.iter().map(|v| v.featured_skins.len()).sum();
        assert_eq!(total, 2);
        assert!(views
            .iter()
            .flat_map(|v| v.featured_skins.iter())
            .all(|s| s.model == TeslaModel::Model3));
    }

    #[test]
    fn stores_are_injectable_with_custom_catalogs() {
        let mut skins = mock_data::skins().to_vec();
        skins.truncate(2);
        let store = SkinStore::new(Catalog::new(skins, Vec::new()), 8);
        assert_eq!(store.filtered_skins().len(), 2);
        assert!(store.categories().is_empty());
    }

    #[test]
    fn registry_isolates_sessions() {
        let registry = SessionRegistry::new(Catalog::mock(), 8, Duration::from_secs(60));
        let (a, _) = registry.create();
        let (b, _) = registry.create();
        assert_eq!(registry.len(), 2);

        registry.with_store_mut(&a, |s| {
            s.update_filters(FilterUpdate {
                selected_price: Some(PriceFilter::Free),
                ..Default::default()
            })
        });
        assert_eq!(registry.with_store(&a, |s| s.filtered_skins().len()), Some(3));
        assert_eq!(registry.with_store(&b, |s| s.filtered_skins().len()), Some(6));

        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert_eq!(registry.with_store(&a, |s| s.filters().clone()), None);
        assert!(registry.contains(&b));
    }

    #[test]
    fn idle_sessions_expire() {
        let registry = SessionRegistry::new(Catalog::mock(), 8, Duration::from_millis(100));
        let (idle, _) = registry.create();
        let (busy, _) = registry.create();

        std::thread::sleep(Duration::from_millis(50));
        assert!(registry.contains(&busy));
        std::thread::sleep(Duration::from_millis(70));

        assert_eq!(registry.with_store(&idle, |s| s.filters().clone()), None);
        assert!(!registry.contains(&idle));
        assert_eq!(registry.len(), 1);

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(registry.prune_expired(), vec![busy]);
        assert!(registry.is_empty());
    }
}
