use actix_web::{delete, get, post, web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use serde_json::json;

use crate::models::user::{User, UserCredential, UserQuery, UserRequest, UserRole};

#[get("/users")]
pub async fn get_users() -> HttpResponse {
    let query: UserQuery = UserQuery {
        role: None,
        limit: None,
    };

    match User::find_many(&query).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/users/chefs")]
pub async fn get_chefs() -> HttpResponse {
    let query: UserQuery = UserQuery {
        role: Some(UserRole::Chef),
        limit: None,
    };

    match User::find_many(&query).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[get("/users/{user_id}")]
pub async fn get_user(user_id: web::Path<String>) -> HttpResponse {
    let user_id: ObjectId = match user_id.parse() {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    match User::find_by_id(&user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user.to_response()),
        Ok(None) => HttpResponse::NotFound().body("USER_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
#[post("/users")]
pub async fn create_user(payload: web::Json<UserRequest>) -> HttpResponse {
    let payload: UserRequest = payload.into_inner();
    let email_regex: Regex = Regex::new(
        r"^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})",
    )
    .unwrap();

    if payload.password.len() < 8 {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_PASSWORD");
    }
    if !email_regex.is_match(&payload.email) {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_EMAIL");
    }

    let mut user: User = User {
        _id: None,
        name: payload.name,
        email: payload.email,
        password: payload.password,
        role: payload.role.unwrap_or(UserRole::Chef),
    };

    if let Ok(Some(_)) = User::find_by_email(&user.email).await {
        HttpResponse::BadRequest().body("USER_ALREADY_EXIST")
    } else {
        match user.save().await {
            Ok(id) => HttpResponse::Created().body(id.to_string()),
            Err(error) => HttpResponse::InternalServerError().body(error),
        }
    }
}
#[delete("/users/{user_id}")]
pub async fn delete_user(user_id: web::Path<String>) -> HttpResponse {
    let user_id: ObjectId = match user_id.parse() {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("INVALID_ID"),
    };

    if let Ok(Some(_)) = User::find_by_id(&user_id).await {
        match User::delete_by_id(&user_id).await {
            Ok(count) => HttpResponse::Ok().body(format!("Deleted {count} user")),
            Err(error) => HttpResponse::InternalServerError().body(error),
        }
    } else {
        HttpResponse::NotFound().body("USER_NOT_FOUND")
    }
}
#[post("/auth/login")]
pub async fn login(payload: web::Json<UserCredential>) -> HttpResponse {
    let payload: UserCredential = payload.into_inner();

    match payload.authenticate().await {
        Ok((token, user)) => HttpResponse::Ok().json(json!({
            "token": token,
            "user": user
        })),
        Err(error) => HttpResponse::Unauthorized().body(error),
    }
}
