use crate::{
    api::{attendance, dashboard, employee, leave, notification, payroll, qr, reports},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list))
                            .route(web::post().to(employee::create)),
                    )
                    .service(
                        web::resource("/me")
                            .route(web::get().to(employee::me))
                            .route(web::put().to(employee::update_me)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get))
                            .route(web::put().to(employee::update))
                            .route(web::delete().to(employee::deactivate)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("").route(web::get().to(attendance::history)))
                    .service(web::resource("/scan").route(web::post().to(attendance::scan)))
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(
                        web::resource("/{record_id}")
                            .route(web::put().to(attendance::update_record))
                            .route(web::delete().to(attendance::delete_record)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    .service(web::resource("").route(web::get().to(payroll::monthly))),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/attendance").route(web::get().to(reports::attendance))),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/summary").route(web::get().to(dashboard::summary))),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("")
                            .route(web::get().to(notification::list))
                            .route(web::post().to(notification::create)),
                    )
                    .service(
                        web::resource("/stream").route(web::get().to(notification::stream)),
                    )
                    .service(
                        web::resource("/read-all").route(web::put().to(notification::mark_all_read)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(notification::delete))),
            )
            .service(
                web::scope("/qr")
                    .service(web::resource("/daily").route(web::post().to(qr::daily)))
                    .service(web::resource("/validate").route(web::post().to(qr::validate)))
                    .service(
                        web::resource("/access/verify")
                            .route(web::post().to(qr::verify_access_pin)),
                    )
                    .service(
                        web::resource("/access/pin").route(web::put().to(qr::set_access_pin)),
                    )
                    .service(
                        web::resource("/config")
                            .route(web::get().to(qr::get_config))
                            .route(web::put().to(qr::update_config)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::list))
                            .route(web::post().to(leave::create)),
                    )
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve)),
                    )
                    .service(web::resource("/{id}/reject").route(web::put().to(leave::reject))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
