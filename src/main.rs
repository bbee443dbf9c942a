use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use pos_backend::{
    AppServices,
    config::Config,
    database::{create_pool, run_migrations},
    external::WhatsAppClient,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::{NotificationService, UserService},
    swagger::swagger_config,
    tasks::spawn_notification_worker,
    utils::JwtService,
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

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 初始管理员账号
    UserService::new(pool.clone())
        .ensure_bootstrap_admin(&config.bootstrap)
        .await
        .expect("Failed to create bootstrap admin");

    log::info!(
        "Stock underflow policy: {}",
        config.inventory.stock_underflow
    );

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);

    // 通知队列与后台发送任务
    let (notifier, receiver) = NotificationService::new(config.notification.queue_capacity);
    let whatsapp = WhatsAppClient::new(config.notification.clone())
        .expect("Failed to build WhatsApp client");
    if !whatsapp.is_enabled() {
        log::info!("WhatsApp notifications are disabled");
    }
    spawn_notification_worker(receiver, whatsapp);

    let services = AppServices::new(
        pool,
        jwt_service.clone(),
        notifier,
        config.inventory.stock_underflow,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&cors_config))
            .wrap(Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
