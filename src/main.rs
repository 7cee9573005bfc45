use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use skin_catalog::emails::{LogMailer, Mailer};
use skin_catalog::{configure, cors, sweep_idle_sessions, AppState, Catalog, SessionRegistry, Settings};
use std::io;
use std::sync::Arc;

async fn start_server(settings: Settings) -> io::Result<()> {
    let catalog = Catalog::mock();
    let registry = web::Data::new(SessionRegistry::new(
        catalog.clone(),
        settings.catalog.featured_per_category,
        settings.session_ttl(),
    ));
    let static_dir = settings.server.static_dir.clone();
    let bind = (settings.server.host.clone(), settings.server.port);
    log::info!("CORS origins with credentials: {:?}", cors::allowed_origins(&settings));
    let cors_settings = settings.clone();

    let app_state = web::Data::new(
        AppState::new(settings, catalog)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
    );
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
    let mailer = web::Data::from(mailer);

    actix_web::rt::spawn(sweep_idle_sessions(registry.clone(), app_state.clone()));

    log::info!("Starting HTTP server on http://{}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        let cors = cors::cors(&cors_settings);

        let static_dir = static_dir.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(app_state.clone())
            .app_data(registry.clone())
            .app_data(mailer.clone())
            .configure(configure)
            .configure(move |cfg| {
                if let Some(dir) = static_dir {
                    cfg.service(Files::new("/static", dir));
                }
            })
    })
    .bind(bind)?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    start_server(settings).await
}
