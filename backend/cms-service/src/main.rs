use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use cms_service::handlers;
use db_pool::{create_pool, DbConfig};
use file_store::{LocalFileStore, SharedFileStore};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "cms-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "cms-service"
        })),
    }
}

/// CMS Service
///
/// REST API for categories, posts and comments backed by PostgreSQL,
/// with uploaded images written to a local public file tier.
///
/// # Routes
///
/// - `/categories` - Create, read, update, delete categories
/// - `/posts` - Create, read, update, delete posts;
///   `/posts/category/{category_id}` filters by category
/// - `/comments` - Create, read, update, delete comments
/// - `/health` - Service and database health
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match cms_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting cms-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let mut db_cfg = DbConfig::from_env("cms-service").unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    if db_cfg.max_connections < config.database.max_connections {
        db_cfg.max_connections = config.database.max_connections;
    }

    db_cfg.log_config();
    let db_pool = match create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connected to database via db-pool crate");

    // Initialize the public file store
    let local_store =
        LocalFileStore::new(config.storage.root.clone(), config.storage.base_url.clone());
    if let Err(e) = local_store.init().await {
        tracing::error!("File store initialization failed: {}", e);
        eprintln!("ERROR: Failed to initialize file store: {}", e);
        std::process::exit(1);
    }
    let file_store: SharedFileStore = Arc::new(local_store);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let pool_data = web::Data::new(db_pool);
    let store_data = web::Data::new(file_store);
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(store_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(health_summary))
            .service(
                web::scope("/categories")
                    .service(
                        web::resource("")
                            .route(web::get().to(handlers::list_categories))
                            .route(web::post().to(handlers::create_category)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(handlers::get_category))
                            .route(web::put().to(handlers::update_category))
                            .route(web::patch().to(handlers::update_category))
                            .route(web::delete().to(handlers::delete_category)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(handlers::list_posts))
                            .route(web::post().to(handlers::create_post)),
                    )
                    // Registered before /{id} so "category" is not
                    // captured as a post id.
                    .service(
                        web::resource("/category/{category_id}")
                            .route(web::get().to(handlers::get_posts_by_category)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(handlers::get_post))
                            .route(web::put().to(handlers::update_post))
                            .route(web::patch().to(handlers::update_post))
                            .route(web::delete().to(handlers::delete_post)),
                    ),
            )
            .service(
                web::scope("/comments")
                    .service(
                        web::resource("")
                            .route(web::get().to(handlers::list_comments))
                            .route(web::post().to(handlers::create_comment)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(handlers::get_comment))
                            .route(web::put().to(handlers::update_comment))
                            .route(web::patch().to(handlers::update_comment))
                            .route(web::delete().to(handlers::delete_comment)),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await?;

    tracing::info!("cms-service shutting down");

    Ok(())
}
