use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use ambulette_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::build_code_sender,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{Clock, JwtService, SystemClock, hash_password},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // `ambulette-backend hash-password <password>` 生成配置文件用的 bcrypt hash
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let Some(password) = args.get(2) else {
            eprintln!("usage: ambulette-backend hash-password <password>");
            std::process::exit(2);
        };
        match hash_password(password) {
            Ok(hash) => println!("{hash}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接
    if config.database.is_in_memory() {
        log::warn!("Using in-memory SQLite storage: all data is lost on restart");
    }
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let code_sender = build_code_sender(&config.otp, &config.twilio);

    if config.otp.echo_code {
        log::warn!("otp.echo_code is enabled: verification codes are returned in API responses");
    }

    // 创建服务
    let verification_service = VerificationService::new(
        pool.clone(),
        code_sender,
        clock.clone(),
        config.otp.echo_code,
    );
    let booking_service = BookingService::new(pool.clone(), verification_service.clone());
    let fleet_service = FleetService::new(pool.clone(), verification_service.clone());
    let staff_service = StaffService::new(pool.clone(), clock.clone());
    let expense_service = ExpenseService::new(pool.clone());
    let admin_service = AdminService::new(config.admins.clone(), jwt_service.clone());

    // 启动后台任务
    tasks::spawn_all(
        verification_service.clone(),
        config.otp.sweep_interval_secs,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(web::Data::new(verification_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .app_data(web::Data::new(fleet_service.clone()))
            .app_data(web::Data::new(staff_service.clone()))
            .app_data(web::Data::new(expense_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
