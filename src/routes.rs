use crate::{
    api::{attendance, intern, me, report},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Per-route limiter allowing `requests_per_min` per client IP, all of it as burst.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(60_000 / requests_per_min as u64)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Session lifecycle
    let login = web::resource("/login").route(web::post().to(handlers::login));
    match build_limiter(config.rate_login_per_min) {
        Some(limiter) => cfg.service(login.wrap(limiter)),
        None => cfg.service(login),
    };

    let register = web::resource("/register")
        .route(web::get().to(handlers::register_form))
        .route(web::post().to(handlers::register));
    match build_limiter(config.rate_register_per_min) {
        Some(limiter) => cfg.service(register.wrap(limiter)),
        None => cfg.service(register),
    };

    cfg.service(
        web::resource("/logout")
            .route(web::get().to(handlers::logout))
            .route(web::post().to(handlers::logout)),
    );

    // Admin: interns
    cfg.service(web::resource("/").route(web::get().to(intern::list_interns)))
        .service(web::resource("/interns").route(web::post().to(intern::create)))
        .service(
            web::resource("/interns/{id}/edit")
                .route(web::get().to(intern::edit_form))
                .route(web::post().to(intern::update)),
        )
        .service(web::resource("/interns/{id}/delete").route(web::post().to(intern::delete)));

    // Admin: attendance grids
    cfg.service(
        web::resource("/attendance")
            .route(web::get().to(attendance::date_grid))
            .route(web::post().to(attendance::save_date_grid)),
    )
    .service(
        web::resource("/attendance/admin")
            .route(web::get().to(attendance::month_grid))
            .route(web::post().to(attendance::save_month_grid)),
    );

    // Intern self-service
    cfg.service(
        web::scope("/me")
            .service(web::resource("").route(web::get().to(me::profile)))
            .service(web::resource("/checkin").route(web::post().to(me::checkin)))
            .service(web::resource("/attendance").route(web::get().to(me::history))),
    );

    // Admin: reports
    cfg.service(
        web::scope("/reports")
            .service(
                web::resource("/summary")
                    .route(web::get().to(report::summary))
                    .route(web::post().to(report::summary_form)),
            )
            .service(
                web::resource("/export.pdf")
                    .route(web::get().to(report::export_pdf))
                    .route(web::post().to(report::export_pdf_form)),
            )
            .service(
                web::resource("/export.xlsx")
                    .route(web::get().to(report::export_xlsx))
                    .route(web::post().to(report::export_xlsx_form)),
            ),
    );
}
