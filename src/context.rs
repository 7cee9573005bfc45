use crate::error::ApiError;
use crate::models::{CategoryView, FilterState, FilterUpdate, Skin};
use crate::store::{SessionRegistry, SkinStore};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

/// The caller's filter store, resolved from the `{id}` path segment.
///
/// Extraction fails with a 500 when no [`SessionRegistry`] was registered on
/// the `App`: that is a wiring bug, and serving defaults would hide it.
pub struct SkinContext {
    registry: web::Data<SessionRegistry>,
    session_id: Uuid,
}

impl FromRequest for SkinContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::resolve(req))
    }
}

impl SkinContext {
    fn resolve(req: &HttpRequest) -> Result<Self, ApiError> {
        let Some(registry) = req.app_data::<web::Data<SessionRegistry>>() else {
            log::error!(
                "SkinContext requested on {} but no SessionRegistry is registered on the App",
                req.path()
            );
            return Err(ApiError::ContextMissing);
        };

        let session_id = req
            .match_info()
            .get("id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| ApiError::Validation("Invalid session id".to_string()))?;

        if !registry.contains(&session_id) {
            return Err(session_not_found(&session_id));
        }

        Ok(SkinContext {
            registry: registry.clone(),
            session_id,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn registry(&self) -> web::Data<SessionRegistry> {
        self.registry.clone()
    }

    fn read<R>(&self, f: impl FnOnce(&SkinStore) -> R) -> Result<R, ApiError> {
        self.registry
            .with_store(&self.session_id, f)
            .ok_or_else(|| session_not_found(&self.session_id))
    }

    fn write<R>(&self, f: impl FnOnce(&mut SkinStore) -> R) -> Result<R, ApiError> {
        self.registry
            .with_store_mut(&self.session_id, f)
            .ok_or_else(|| session_not_found(&self.session_id))
    }

    pub fn filters(&self) -> Result<FilterState, ApiError> {
        self.read(|store| store.filters().clone())
    }

    pub fn update_filters(&self, update: FilterUpdate) -> Result<FilterState, ApiError> {
        self.write(|store| {
            store.update_filters(update);
            store.filters().clone()
        })
    }

    pub fn clear_filters(&self) -> Result<FilterState, ApiError> {
        self.write(|store| {
            store.clear_filters();
            store.filters().clone()
        })
    }

    pub fn filtered_skins(&self) -> Result<Vec<Skin>, ApiError> {
        self.read(SkinStore::filtered_skins)
    }

    pub fn categories(&self) -> Result<Vec<CategoryView>, ApiError> {
        self.read(SkinStore::categories)
    }
}

fn session_not_found(id: &Uuid) -> ApiError {
    ApiError::NotFound(format!("Session {} not found", id))
}
