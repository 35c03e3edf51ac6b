use actix_cors::Cors;
use actix_web::{App, HttpServer};
use std::io;

mod database;
mod models;
mod routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let db_uri: String =
        std::env::var("MONGODB_URI").unwrap_or_else(|_| String::from("mongodb://localhost:27017"));

    database::connect(db_uri).await;
    models::user::load_keys();

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(models::user::UserAuthenticationMiddlewareFactory)
            .service(routes::health)
            .service(routes::user::login)
            .service(routes::user::get_users)
            .service(routes::user::get_chefs)
            .service(routes::user::get_user)
            .service(routes::user::create_user)
            .service(routes::user::delete_user)
            .service(routes::project::get_projects)
            .service(routes::project::get_project)
            .service(routes::project::create_project)
            .service(routes::project::delete_project)
            .service(routes::project::get_project_sites)
            .service(routes::project::create_project_site)
            .service(routes::site::get_sites)
            .service(routes::site::get_site)
            .service(routes::site::update_site)
            .service(routes::site::delete_site)
            .service(routes::observation::get_observations)
            .service(routes::observation::get_observations_by_site)
            .service(routes::observation::get_observation)
            .service(routes::observation::create_observation)
            .service(routes::stats::get_stats)
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
