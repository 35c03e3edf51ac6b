use actix_web::{delete, get, put, web, HttpResponse};
use mongodb::bson::oid::ObjectId;

use crate::models::site::{Site, SiteQuery, SiteRequest};

#[get("/sites")]
pub async fn get_sites() -> HttpResponse {
    let query: SiteQuery = SiteQuery {
        project_id: None,
        limit: None,
    };

    match Site::find_many(&query).await {
        Ok(sites) => HttpResponse::Ok().json(sites),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/sites/{site_id}")]
pub async fn get_site(site_id: web::Path<String>) -> HttpResponse {
    let site_id: ObjectId = match site_id.parse() {
        Ok(site_id) => site_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    match Site::find_detail_by_id(&site_id).await {
        Ok(Some(site)) => HttpResponse::Ok().json(site),
        Ok(None) => HttpResponse::NotFound().body("SITE_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[put("/sites/{site_id}")]
pub async fn update_site(
    site_id: web::Path<String>,
    payload: web::Json<SiteRequest>,
) -> HttpResponse {
    let site_id: ObjectId = match site_id.parse() {
        Ok(site_id) => site_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    if let Ok(Some(mut site)) = Site::find_by_id(&site_id).await {
        let payload: SiteRequest = payload.into_inner();

        site.name = payload.name;
        site.kind = payload.kind;

        match site.update().await {
            Ok(site_id) => HttpResponse::Ok().body(site_id.to_string()),
            Err(error) => HttpResponse::InternalServerError().body(error),
        }
    } else {
        HttpResponse::NotFound().body("SITE_NOT_FOUND")
    }
}
#[delete("/sites/{site_id}")]
pub async fn delete_site(site_id: web::Path<String>) -> HttpResponse {
    let site_id: ObjectId = match site_id.parse() {
        Ok(site_id) => site_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    if let Ok(Some(_)) = Site::find_by_id(&site_id).await {
        match Site::delete_by_id(&site_id).await {
            Ok(count) => HttpResponse::Ok().body(format!("Deleted {count} site")),
            Err(error) => HttpResponse::InternalServerError().body(error),
        }
    } else {
        HttpResponse::NotFound().body("SITE_NOT_FOUND")
    }
}
