use crate::auth::{
    self, AuthClient, AuthResponse, LoginRequest, ResetPasswordRequest, ResetRequest,
    SignupRequest, VerifyEmailRequest,
};
use crate::context::SkinContext;
use crate::debounce::Debouncer;
use crate::emails::{self, EmailKind, Mailer};
use crate::error::ApiError;
use crate::filter;
use crate::mock_data::ALL_MODELS;
use crate::models::{CategoryPageQuery, FilterUpdate, SkinDetail, SkinQuery};
use crate::settings::Settings;
use crate::store::{Catalog, SessionRegistry};
use actix_web::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, Responder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

pub struct AppState {
    pub settings: Settings,
    pub catalog: Catalog,
    pub search: Debouncer<Uuid>,
    pub auth: AuthClient,
}

impl AppState {
    pub fn new(settings: Settings, catalog: Catalog) -> Result<Self, ApiError> {
        let auth = AuthClient::new(&settings)?;
        let search = Debouncer::new(Duration::from_millis(settings.catalog.search_debounce_ms));
        Ok(AppState {
            settings,
            catalog,
            search,
            auth,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/models", web::get().to(get_models))
        .route("/api/skins", web::get().to(get_skins))
        .route("/api/skins/{id}", web::get().to(get_skin))
        .route("/api/categories", web::get().to(get_categories))
        .route("/api/categories/{id}", web::get().to(get_category))
        .route("/api/sessions", web::post().to(create_session))
        .route("/api/sessions/{id}", web::delete().to(delete_session))
        .route("/api/sessions/{id}/filters", web::get().to(get_filters))
        .route("/api/sessions/{id}/filters", web::patch().to(update_filters))
        .route("/api/sessions/{id}/filters", web::delete().to(clear_filters))
        .route("/api/sessions/{id}/skins", web::get().to(session_skins))
        .route("/api/sessions/{id}/categories", web::get().to(session_categories))
        .route("/api/sessions/{id}/search", web::post().to(search))
        .route("/api/auth/signup", web::post().to(signup))
        .route("/api/auth/login", web::post().to(login))
        .route("/api/auth/logout", web::post().to(logout))
        .route("/api/auth/session", web::get().to(session))
        .route("/api/auth/verify-email", web::post().to(verify_email))
        .route("/api/auth/request-password-reset", web::post().to(request_password_reset))
        .route("/api/auth/reset-password", web::post().to(reset_password))
        .route("/api/hooks/email", web::post().to(email_hook))
        .route("/api/emails/preview/{kind}", web::get().to(preview_email));
}

async fn get_models() -> impl Responder {
    HttpResponse::Ok().json(ALL_MODELS)
}

async fn get_skins(data: web::Data<AppState>, query: web::Query<SkinQuery>) -> impl Responder {
    let filters = query.to_filters();
    let skins = filter::filter_and_sort(data.catalog.skins(), &filters, query.sort);
    HttpResponse::Ok().json(skins)
}

async fn get_skin(data: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let skin = filter::find_skin(data.catalog.skins(), &id)
        .ok_or_else(|| ApiError::NotFound(format!("Skin {} not found", id)))?;
    let related = filter::related_skins(
        data.catalog.skins(),
        skin,
        data.settings.catalog.related_limit,
    );
    Ok(HttpResponse::Ok().json(SkinDetail {
        skin: skin.clone(),
        related,
    }))
}

async fn get_categories(data: web::Data<AppState>) -> impl Responder {
    let views = filter::categorize(
        data.catalog.categories(),
        data.catalog.skins(),
        data.settings.catalog.preview_per_category,
    );
    HttpResponse::Ok().json(views)
}

async fn get_category(
    data: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<CategoryPageQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let category = filter::find_category(data.catalog.categories(), &id)
        .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))?;
    let page = filter::category_page(
        data.catalog.skins(),
        category,
        query.price.unwrap_or_default(),
        query.model.unwrap_or_default(),
        query.sort.unwrap_or_default(),
    );
    Ok(HttpResponse::Ok().json(page))
}

/// Drops idle sessions along with any search update still queued for them.
pub fn evict_idle_sessions(registry: &SessionRegistry, state: &AppState) -> usize {
    let evicted = registry.prune_expired();
    for id in &evicted {
        state.search.cancel(id);
    }
    evicted.len()
}

/// Periodic sweep so abandoned sessions go away even when nobody creates new ones.
pub async fn sweep_idle_sessions(registry: web::Data<SessionRegistry>, state: web::Data<AppState>) {
    let mut interval = tokio::time::interval(registry.idle_ttl().max(Duration::from_secs(1)));
    loop {
        interval.tick().await;
        evict_idle_sessions(&registry, &state);
    }
}

async fn create_session(
    registry: web::Data<SessionRegistry>,
    data: web::Data<AppState>,
) -> impl Responder {
    evict_idle_sessions(&registry, &data);
    let (session_id, filters) = registry.create();
    HttpResponse::Created().json(json!({"session_id": session_id, "filters": filters}))
}

async fn delete_session(
    registry: web::Data<SessionRegistry>,
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    data.search.cancel(&id);
    if registry.remove(&id) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound(format!("Session {} not found", id)))
    }
}

async fn get_filters(ctx: SkinContext) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(ctx.filters()?))
}

async fn update_filters(ctx: SkinContext, update: web::Json<FilterUpdate>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(ctx.update_filters(update.into_inner())?))
}

async fn clear_filters(ctx: SkinContext, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    data.search.cancel(&ctx.session_id());
    Ok(HttpResponse::Ok().json(ctx.clear_filters()?))
}

async fn session_skins(ctx: SkinContext) -> Result<HttpResponse, ApiError> {
    let filters = ctx.filters()?;
    let skins = ctx.filtered_skins()?;
    Ok(HttpResponse::Ok().json(json!({
        "has_active_filters": filters.is_active(),
        "filters": filters,
        "total": skins.len(),
        "skins": skins,
    })))
}

async fn session_categories(ctx: SkinContext) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(ctx.categories()?))
}

#[derive(Deserialize)]
struct SearchInput {
    query: String,
}

/// Queues the free-text query; it reaches the criteria once typing pauses.
async fn search(
    ctx: SkinContext,
    data: web::Data<AppState>,
    input: web::Json<SearchInput>,
) -> impl Responder {
    let session_id = ctx.session_id();
    let registry = ctx.registry();
    let query = input.into_inner().query;
    data.search.schedule(session_id, async move {
        let applied = registry.with_store_mut(&session_id, |store| {
            store.update_filters(FilterUpdate {
                search_query: Some(query),
                ..Default::default()
            })
        });
        if applied.is_none() {
            log::debug!("session {} ended before its search update landed", session_id);
        }
    });
    HttpResponse::Accepted().json(json!({
        "pending": true,
        "delay_ms": data.search.delay().as_millis() as u64,
    }))
}

fn forward(mut builder: HttpResponseBuilder, response: AuthResponse, body: serde_json::Value) -> HttpResponse {
    for cookie in response.set_cookies {
        builder.append_header((SET_COOKIE, cookie));
    }
    builder.json(body)
}

fn request_cookie(req: &HttpRequest) -> Option<&str> {
    req.headers().get(COOKIE).and_then(|v| v.to_str().ok())
}

async fn signup(data: web::Data<AppState>, req: web::Json<SignupRequest>) -> Result<HttpResponse, ApiError> {
    auth::validate_signup(&req)?;
    let response = data.auth.sign_up(&req).await?;
    let redirect = auth::app_link(
        data.auth.app_url(),
        auth::CHECK_EMAIL_PATH,
        &[("email", req.email.trim())],
    )?;
    let body = json!({"user": response.body.get("user"), "redirect": redirect});
    Ok(forward(HttpResponse::Ok(), response, body))
}

async fn login(data: web::Data<AppState>, req: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    let response = data.auth.sign_in(&req).await?;
    let redirect = auth::app_link(data.auth.app_url(), auth::DASHBOARD_PATH, &[])?;
    let body = json!({"user": response.body.get("user"), "redirect": redirect});
    Ok(forward(HttpResponse::Ok(), response, body))
}

async fn logout(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let response = data.auth.sign_out(request_cookie(&req)).await?;
    let redirect = auth::app_link(data.auth.app_url(), "/", &[])?;
    Ok(forward(HttpResponse::Ok(), response, json!({"redirect": redirect})))
}

async fn session(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let response = data.auth.get_session(request_cookie(&req)).await?;
    let body = response.body.clone();
    Ok(forward(HttpResponse::Ok(), response, body))
}

async fn verify_email(
    data: web::Data<AppState>,
    req: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = match auth::verification_token(req.token.as_deref()) {
        Ok(token) => token,
        Err(invalid) => return Ok(HttpResponse::BadRequest().json(invalid)),
    };
    let response = data.auth.verify_email(token).await?;
    let redirect = auth::app_link(data.auth.app_url(), auth::LOGIN_PATH, &[])?;
    let body = json!({
        "message": "Email verified successfully! You can now sign in.",
        "redirect": redirect,
    });
    Ok(forward(HttpResponse::Ok(), response, body))
}

async fn request_password_reset(
    data: web::Data<AppState>,
    req: web::Json<ResetRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Please enter your email address".to_string()));
    }
    data.auth.request_password_reset(email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset instructions have been sent to your email!"
    })))
}

async fn reset_password(
    data: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = match auth::reset_token(req.token.as_deref()) {
        Ok(token) => token,
        Err(invalid) => return Ok(HttpResponse::BadRequest().json(invalid)),
    };
    auth::validate_new_password(&req.password, &req.confirm_password)?;
    data.auth.reset_password(token, &req.password).await?;
    let redirect = auth::app_link(data.auth.app_url(), auth::LOGIN_PATH, &[])?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset successfully! You can now sign in with your new password.",
        "redirect": redirect,
    })))
}

#[derive(Deserialize)]
struct HookUser {
    email: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct EmailHook {
    kind: EmailKind,
    user: HookUser,
    url: Option<String>,
}

/// Called by the auth framework's lifecycle hooks to have a message sent.
async fn email_hook(
    data: web::Data<AppState>,
    mailer: web::Data<dyn Mailer>,
    hook: web::Json<EmailHook>,
) -> Result<HttpResponse, ApiError> {
    let hook = hook.into_inner();
    let app = &data.settings.app;
    let to = hook.user.email.as_str();
    let link = || {
        hook.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Missing url for email".to_string()))
    };
    let message = match hook.kind {
        EmailKind::Verification => emails::verification_email(app, to, link()?),
        EmailKind::PasswordReset => emails::password_reset_email(app, to, link()?),
        EmailKind::Welcome => {
            let name = emails::display_name(hook.user.name.as_deref(), to);
            emails::welcome_email(app, to, &name)
        }
    };
    mailer.send(&message)?;
    Ok(HttpResponse::Accepted().json(json!({"sent": true, "subject": message.subject})))
}

async fn preview_email(data: web::Data<AppState>, kind: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let kind = kind.into_inner();
    let kind: EmailKind = serde_json::from_value(serde_json::Value::String(kind.clone()))
        .map_err(|_| ApiError::NotFound(format!("No email template named {}", kind)))?;
    let app = &data.settings.app;
    let to = "driver@example.com";
    let message = match kind {
        EmailKind::Verification => {
            let url = auth::app_link(&app.url, auth::VERIFY_EMAIL_PATH, &[("token", "preview")])?;
            emails::verification_email(app, to, &url)
        }
        EmailKind::PasswordReset => {
            let url = auth::app_link(&app.url, auth::RESET_PASSWORD_PATH, &[("token", "preview")])?;
            emails::password_reset_email(app, to, &url)
        }
        EmailKind::Welcome => emails::welcome_email(app, to, &emails::display_name(None, to)),
    };
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/html; charset=utf-8"))
        .body(message.html))
}
