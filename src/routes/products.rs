use actix_web::{HttpResponse, Responder, get, patch, post, web};

use crate::repository::DieselRepository;
use crate::routes::{failure_response, run_blocking};
use crate::services::products;

#[get("/product/")]
pub async fn list_products(repo: web::Data<DieselRepository>) -> impl Responder {
    let repo = repo.get_ref().clone();

    match run_blocking(move || products::list_products(&repo)).await {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => failure_response("list products", err),
    }
}

#[get("/product/{product_id}/")]
pub async fn show_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = product_id.into_inner();
    let repo = repo.get_ref().clone();

    match run_blocking(move || products::get_product(&repo, product_id)).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => failure_response("load product", err),
    }
}

#[post("/product/")]
pub async fn create_product(
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let repo = repo.get_ref().clone();

    match run_blocking(move || products::create_product(&repo, &body)).await {
        Ok(product) => HttpResponse::Created().json(product),
        Err(err) => failure_response("create product", err),
    }
}

#[patch("/product/{product_id}/")]
pub async fn update_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let product_id = product_id.into_inner();
    let repo = repo.get_ref().clone();

    match run_blocking(move || products::update_product(&repo, product_id, &body)).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => failure_response("update product", err),
    }
}
