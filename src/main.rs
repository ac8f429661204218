use actix_web::middleware::{Logger, NormalizePath, from_fn};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use stagiaires::auth::middleware::session_middleware;
use stagiaires::auth::session::RevokedSessions;
use stagiaires::config::Config;
use stagiaires::db::init_db;
use stagiaires::docs::ApiDoc;
use stagiaires::routes;
use stagiaires::utils::username_filter::UsernameFilter;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url).await?;

    let pool = Data::new(pool);
    let config_data = Data::new(config.clone());
    let revoked = Data::new(RevokedSessions::new(config.session_ttl));
    let filter = Data::new(UsernameFilter::new());

    {
        let pool = pool.clone();
        let filter = filter.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = filter.warmup(pool.get_ref(), 100).await {
                error!(error = %e, "Failed to warm up username filter");
            }
        });
    }

    let server_addr = config.server_addr.clone();
    HttpServer::new(move || {
        App::new()
            // innermost: needs the plain BoxBody service underneath
            .wrap(from_fn(session_middleware))
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool.clone())
            .app_data(config_data.clone())
            .app_data(revoked.clone())
            .app_data(filter.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
