use actix_web::middleware::{self, TrailingSlash};
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;

use pushkind_catalog::config::ServerConfig;
use pushkind_catalog::db::{establish_connection_pool, run_migrations};
use pushkind_catalog::repository::DieselRepository;
use pushkind_catalog::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = ServerConfig::from_env();

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match run_migrations(&pool) {
        Ok(0) => {}
        Ok(applied) => log::info!("Applied {applied} pending migration(s)"),
        Err(e) => {
            log::error!("Failed to migrate database: {e}");
            std::process::exit(1);
        }
    }

    let repo = DieselRepository::new(pool);

    log::info!("Listening on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::new(TrailingSlash::Always))
            .app_data(web::Data::new(repo.clone()))
            .service(web::scope("/shop").configure(routes::configure))
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await
}
