use actix_web::{get, HttpResponse};
use serde_json::json;

use crate::models::{
    observation::Observation,
    project::Project,
    site::Site,
    user::{User, UserRole},
};

#[get("/stats")]
pub async fn get_stats() -> HttpResponse {
    let total_projects = match Project::count().await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let total_sites = match Site::count().await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let total_chefs = match User::count_by_role(&UserRole::Chef).await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let total_observations = match Observation::count().await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let alerts = match Observation::count_alerts().await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    HttpResponse::Ok().json(json!({
        "total_projects": total_projects,
        "total_sites": total_sites,
        "total_chefs": total_chefs,
        "total_observations": total_observations,
        "alerts": alerts
    }))
}
