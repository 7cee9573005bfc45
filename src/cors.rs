use crate::settings::Settings;
use actix_cors::Cors;
use reqwest::Url;

/// Origins allowed to call the API with credentials: the comma-separated
/// `server.cors_allowed_origins` list, or the storefront's own origin.
pub fn allowed_origins(settings: &Settings) -> Vec<String> {
    let configured = settings
        .server
        .cors_allowed_origins
        .as_deref()
        .map(|list| list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>())
        .filter(|list| !list.is_empty());
    let raw = configured.unwrap_or_else(|| vec![settings.app.url.as_str()]);

    raw.into_iter()
        .filter_map(|origin| match Url::parse(origin) {
            Ok(url) if url.origin().is_tuple() => Some(url.origin().ascii_serialization()),
            _ => {
                log::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect()
}

/// Session cookies are forwarded to the auth framework, so only listed
/// origins get `Access-Control-Allow-Credentials`.
pub fn cors(settings: &Settings) -> Cors {
    allowed_origins(settings)
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
