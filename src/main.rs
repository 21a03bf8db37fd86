use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskoo::config::Config;
use taskoo::mail::{Mailer, SmtpMailer};
use taskoo::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::from_config(&config.mail).expect("Failed to build SMTP transport"),
    );
    let mailer = web::Data::from(mailer);

    let bind_addr = (config.server_host.clone(), config.server_port);
    log::info!("Starting Taskoo server at {}", config.server_url());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.domain_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(mailer.clone())
            .service(routes::health::health)
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
