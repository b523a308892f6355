use crate::{
    api::{
        attendance, certification, document, employee, leave_request, performance_review, skill,
        training,
    },
    auth::handlers,
    config::Config,
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Context, Result};

pub type Limiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiters, built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimits {
    pub login: Limiter,
    pub api: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min).context("invalid login rate limit")?,
            api: build_limiter(config.rate_api_per_min).context("invalid API rate limit")?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("rate limiter needs a non-zero period and burst size")
}

/// Extractor errors answer with the same `{"error": ...}` body as handlers.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    configure_extractors(cfg);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Governor::new(&limits.api))
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}/documents
                    .service(
                        web::resource("/{id}/documents")
                            .route(web::get().to(document::list_employee_documents)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/documents")
                    .service(
                        web::resource("")
                            .route(web::get().to(document::list_documents))
                            .route(web::post().to(document::upload_document)),
                    )
                    // registered before /{id}
                    .service(web::resource("/stats").route(web::get().to(document::document_stats)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(document::update_document))
                            .route(web::delete().to(document::delete_document)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    .service(web::resource("/clockin").route(web::post().to(attendance::clock_in)))
                    .service(web::resource("/clockout").route(web::post().to(attendance::clock_out)))
                    .service(web::resource("/absent").route(web::post().to(attendance::mark_absent)))
                    .service(web::resource("/today").route(web::get().to(attendance::today_attendance)))
                    .service(
                        web::resource("/date/{date}")
                            .route(web::get().to(attendance::attendance_by_date)),
                    )
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(attendance::employee_attendance)),
                    ),
            )
            .service(
                web::scope("/leave-requests")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::list_leaves))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(leave_request::set_leave_status)),
                    )
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(leave_request::employee_leaves)),
                    ),
            )
            .service(
                web::scope("/performance-reviews")
                    .service(
                        web::resource("")
                            .route(web::get().to(performance_review::list_reviews))
                            .route(web::post().to(performance_review::create_review)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(performance_review::update_review))
                            .route(web::delete().to(performance_review::delete_review)),
                    ),
            )
            .service(
                web::scope("/trainings")
                    .service(
                        web::resource("")
                            .route(web::get().to(training::list_trainings))
                            .route(web::post().to(training::create_training)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(training::update_training))
                            .route(web::delete().to(training::delete_training)),
                    ),
            )
            .service(
                web::scope("/certifications")
                    .service(
                        web::resource("")
                            .route(web::get().to(certification::list_certifications))
                            .route(web::post().to(certification::create_certification)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(certification::update_certification))
                            .route(web::delete().to(certification::delete_certification)),
                    ),
            )
            .service(
                web::scope("/skills")
                    .service(
                        web::resource("")
                            .route(web::get().to(skill::list_skills))
                            .route(web::post().to(skill::create_skill)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(skill::update_skill))
                            .route(web::delete().to(skill::delete_skill)),
                    ),
            ),
    );
}
