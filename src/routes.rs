use crate::{
    api::{
        approval, attendance, department, employee, field_work, leave_application,
        leave_assignment, leave_type, miss_punch, payroll,
    },
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
            )
            .service(
                web::resource("/mobile-login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::mobile_login)),
            )
            .service(
                web::resource("/mobile-logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::mobile_logout)),
            ),
    );

    // Mobile field-work routes authenticate with X-Device-Token via the
    // MobileUser extractor, not the JWT middleware. Registered as exact
    // resources so they match ahead of the protected scope below.
    cfg.service(
        web::resource(format!("{}/field-work/start", config.api_prefix))
            .route(web::post().to(field_work::start_visit)),
    );
    cfg.service(
        web::resource(format!("{}/field-work/{{visit_id}}/end", config.api_prefix))
            .route(web::post().to(field_work::end_visit)),
    );
    cfg.service(
        web::resource(format!("{}/field-work/mine", config.api_prefix))
            .route(web::get().to(field_work::my_visits)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::deactivate_employee)),
                    ),
            )
            .service(
                web::scope("/departments").service(
                    web::resource("")
                        .route(web::post().to(department::create_department))
                        .route(web::get().to(department::list_departments)),
                ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("").route(web::get().to(attendance::attendance_list)))
                    .service(
                        web::resource("/punch-in").route(web::post().to(attendance::punch_in)),
                    )
                    .service(
                        web::resource("/punch-out").route(web::post().to(attendance::punch_out)),
                    ),
            )
            .service(
                web::scope("/leave-types").service(
                    web::resource("")
                        .route(web::post().to(leave_type::create_leave_type))
                        .route(web::get().to(leave_type::list_leave_types)),
                ),
            )
            .service(
                web::scope("/leave-assignments")
                    .service(
                        web::resource("")
                            .route(web::post().to(leave_assignment::create_assignment))
                            .route(web::get().to(leave_assignment::list_assignments)),
                    )
                    .service(
                        web::resource("/bulk").route(web::post().to(leave_assignment::bulk_assign)),
                    )
                    .service(
                        web::resource("/{assignment_id}")
                            .route(web::put().to(leave_assignment::update_assignment)),
                    ),
            )
            .service(
                web::scope("/leave-applications")
                    .service(
                        web::resource("")
                            .route(web::post().to(leave_application::create_leave_application))
                            .route(web::get().to(leave_application::list_leave_applications)),
                    )
                    .service(
                        web::resource("/{application_id}")
                            .route(web::get().to(leave_application::get_leave_application)),
                    ),
            )
            .service(
                web::scope("/approvals")
                    .service(web::resource("").route(web::get().to(approval::list_approvals)))
                    .service(
                        web::resource("/{approval_id}")
                            .route(web::put().to(approval::decide_approval)),
                    ),
            )
            .service(
                web::scope("/miss-punch").service(
                    web::resource("")
                        .route(web::post().to(miss_punch::create_miss_punch))
                        .route(web::get().to(miss_punch::list_miss_punch)),
                ),
            )
            .service(
                web::scope("/field-work")
                    .service(web::resource("").route(web::get().to(field_work::list_visits))),
            )
            .service(
                web::scope("/payroll")
                    .service(web::resource("").route(web::get().to(payroll::list_payroll)))
                    .service(
                        web::resource("/generate").route(web::post().to(payroll::generate_payroll)),
                    )
                    .service(
                        web::resource("/{payroll_id}")
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::get().to(payroll::get_payroll)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// MOBILE LOGIN
//  └─ device token (12 h, in-process store)
//       └─ X-Device-Token on field-work routes
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
