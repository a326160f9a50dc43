use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::connect_database,
    middlewares::identity,
    modules::{
        friendship::{repository_pg::FriendshipRepositoryPg, service::FriendshipService},
        message::{repository_pg::MessageRepositoryPg, service::MessagingService},
        user::repository_pg::UserRepositoryPg,
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friendship_repo = Arc::new(FriendshipRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let friendship_service =
        FriendshipService::with_dependencies(friendship_repo, user_repo.clone());
    let messaging_service = MessagingService::with_dependencies(
        message_repo,
        friendship_service.clone(),
        user_repo,
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(friendship_service.clone()))
            .app_data(web::Data::new(messaging_service.clone()))
            .service(health_check)
            .service(
                web::scope("/api")
                    .wrap(from_fn(identity))
                    .configure(modules::friendship::route::configure)
                    .configure(modules::message::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
