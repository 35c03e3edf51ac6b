use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use mongodb::bson::oid::ObjectId;

use crate::models::{
    observation::{Observation, ObservationQuery, ObservationRequest},
    user::UserAuthentication,
};

#[get("/observations")]
pub async fn get_observations() -> HttpResponse {
    let query: ObservationQuery = ObservationQuery {
        site_id: None,
        limit: None,
    };

    match Observation::find_many(&query).await {
        Ok(observations) => HttpResponse::Ok().json(observations),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/observations/{observation_id}")]
pub async fn get_observation(observation_id: web::Path<String>) -> HttpResponse {
    let observation_id: ObjectId = match observation_id.parse() {
        Ok(observation_id) => observation_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    match Observation::find_detail_by_id(&observation_id).await {
        Ok(Some(observation)) => HttpResponse::Ok().json(observation),
        Ok(None) => HttpResponse::NotFound().body("OBSERVATION_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/observations/site/{site_id}")]
pub async fn get_observations_by_site(site_id: web::Path<String>) -> HttpResponse {
    let site_id: ObjectId = match site_id.parse() {
        Ok(site_id) => site_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    let query: ObservationQuery = ObservationQuery {
        site_id: Some(site_id),
        limit: None,
    };

    match Observation::find_many(&query).await {
        Ok(observations) => HttpResponse::Ok().json(observations),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[post("/observations")]
pub async fn create_observation(
    payload: web::Json<ObservationRequest>,
    req: HttpRequest,
) -> HttpResponse {
    let payload: ObservationRequest = payload.into_inner();

    let created_by: Option<ObjectId> = req
        .extensions()
        .get::<UserAuthentication>()
        .and_then(|issuer| issuer._id);

    match Observation::create(payload, created_by).await {
        Ok(observation) => HttpResponse::Created().json(observation),
        Err(error) => {
            if error == "SITE_NOT_FOUND" {
                HttpResponse::NotFound().body(error)
            } else {
                HttpResponse::InternalServerError().body(error)
            }
        }
    }
}
