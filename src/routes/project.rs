use actix_web::{delete, get, post, web, HttpResponse};
use mongodb::bson::oid::ObjectId;

use crate::models::{
    project::{Project, ProjectRequest},
    site::{Site, SiteQuery, SiteRequest},
};

#[get("/projects")]
pub async fn get_projects() -> HttpResponse {
    match Project::find_many().await {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/projects/{project_id}")]
pub async fn get_project(project_id: web::Path<String>) -> HttpResponse {
    let project_id: ObjectId = match project_id.parse() {
        Ok(project_id) => project_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    match Project::find_detail_by_id(&project_id).await {
        Ok(Some(project)) => HttpResponse::Ok().json(project),
        Ok(None) => HttpResponse::NotFound().body("PROJECT_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[post("/projects")]
pub async fn create_project(payload: web::Json<ProjectRequest>) -> HttpResponse {
    let payload: ProjectRequest = payload.into_inner();

    let mut project: Project = Project {
        _id: None,
        name: payload.name,
        location: payload.location,
    };

    match project.save().await {
        Ok(id) => HttpResponse::Created().body(id.to_string()),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[delete("/projects/{project_id}")]
pub async fn delete_project(project_id: web::Path<String>) -> HttpResponse {
    let project_id: ObjectId = match project_id.parse() {
        Ok(project_id) => project_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    if let Ok(Some(_)) = Project::find_by_id(&project_id).await {
        match Project::delete_by_id(&project_id).await {
            Ok(count) => HttpResponse::Ok().body(format!("Deleted {count} project")),
            Err(error) => HttpResponse::InternalServerError().body(error),
        }
    } else {
        HttpResponse::NotFound().body("PROJECT_NOT_FOUND")
    }
}
#[get("/projects/{project_id}/sites")]
pub async fn get_project_sites(project_id: web::Path<String>) -> HttpResponse {
    let project_id: ObjectId = match project_id.parse() {
        Ok(project_id) => project_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    let query: SiteQuery = SiteQuery {
        project_id: Some(project_id),
        limit: None,
    };

    match Site::find_many(&query).await {
        Ok(sites) => HttpResponse::Ok().json(sites),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[post("/projects/{project_id}/sites")]
pub async fn create_project_site(
    project_id: web::Path<String>,
    payload: web::Json<SiteRequest>,
) -> HttpResponse {
    let project_id: ObjectId = match project_id.parse() {
        Ok(project_id) => project_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    let payload: SiteRequest = payload.into_inner();
    let mut site: Site = Site {
        _id: None,
        project_id,
        name: payload.name,
        kind: payload.kind,
    };

    match site.save().await {
        Ok(id) => HttpResponse::Created().body(id.to_string()),
        Err(error) => {
            if error == "PROJECT_NOT_FOUND" {
                HttpResponse::NotFound().body(error)
            } else {
                HttpResponse::InternalServerError().body(error)
            }
        }
    }
}
