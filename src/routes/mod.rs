use actix_web::{get, HttpResponse};
use serde_json::json;

pub mod observation;
pub mod project;
pub mod site;
pub mod stats;
pub mod user;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "SafeSite Server"
    }))
}
