use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, test, web};
use serde_json::json;

use pushkind_catalog::domain::tag::NewTag;
use pushkind_catalog::repository::{DieselRepository, ProductReader, TagReader, TagWriter};
use pushkind_catalog::routes::{self, ErrorMessage};
use pushkind_catalog::services::products::ProductView;

mod common;

macro_rules! init_app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .wrap(NormalizePath::new(TrailingSlash::Always))
                .app_data(web::Data::new($repo.clone()))
                .service(web::scope("/shop").configure(routes::configure)),
        )
        .await
    };
}

const NAME_REQUIRED: &str = "상품명이 필요합니다.";
const PRODUCT_NOT_FOUND: &str = "상품을 찾을 수 없습니다.";
const TAG_NOT_FOUND: &str = "태그를 찾을 수 없습니다.";
const INVALID_FORMAT: &str = "잘못된 데이터 형식입니다";

#[actix_web::test]
async fn create_product_returns_nested_representation() {
    let test_db = common::TestDb::new("api_create_product.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "TestProduct",
            "option_set": [{"name": "TestOption", "price": 1000}],
            "tag_set": [{"name": "NewTag"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ProductView = test::read_body_json(resp).await;
    assert_eq!(body.name, "TestProduct");
    assert_eq!(body.option_set.len(), 1);
    assert_eq!(body.option_set[0].name, "TestOption");
    assert_eq!(body.option_set[0].price, 1000);
    assert_eq!(body.tag_set.len(), 1);
    assert_eq!(body.tag_set[0].name, "NewTag");

    let stored = repo.get_product_by_id(body.pk).unwrap().unwrap();
    assert_eq!(stored.options.len(), 1);
    assert_eq!(stored.tags.len(), 1);
}

#[actix_web::test]
async fn create_product_links_existing_tags_by_pk_and_name() {
    let test_db = common::TestDb::new("api_create_product_existing_tags.db");
    let repo = DieselRepository::new(test_db.pool());
    let existing = repo.create_tag(&NewTag::new("ExistingTag")).unwrap();
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "Tagged",
            "tag_set": [{"pk": existing.id}, {"pk": null, "name": "ExistingTag"}, {"name": "Fresh"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ProductView = test::read_body_json(resp).await;
    assert_eq!(body.tag_set.len(), 2);
    assert_eq!(body.tag_set[0].pk, existing.id);
    assert_eq!(body.tag_set[1].name, "Fresh");
    assert_eq!(repo.list_tags().unwrap().len(), 2);
}

#[actix_web::test]
async fn create_product_reuses_tag_name_across_products() {
    let test_db = common::TestDb::new("api_create_product_duplicate_tag.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    for name in ["First", "Second"] {
        let req = test::TestRequest::post()
            .uri("/shop/product/")
            .set_json(json!({"name": name, "tag_set": [{"name": "DuplicateTag"}]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let tags = repo.list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "DuplicateTag");
}

#[actix_web::test]
async fn create_product_validation_errors() {
    let test_db = common::TestDb::new("api_create_product_validation.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let cases = [
        (json!({"option_set": [{"name": "A", "price": 1}]}), NAME_REQUIRED.to_string()),
        (json!({"name": ""}), NAME_REQUIRED.to_string()),
        (json!({"name": null}), NAME_REQUIRED.to_string()),
        (
            json!({"name": "P", "option_set": [{"name": "A"}]}),
            "필수 필드가 누락되었습니다: price".to_string(),
        ),
        (
            json!({"name": "P", "option_set": [{"price": 100}]}),
            "필수 필드가 누락되었습니다: name".to_string(),
        ),
        (
            json!({"name": "P", "tag_set": [{}]}),
            "필수 필드가 누락되었습니다: name".to_string(),
        ),
        (
            json!({"name": "P", "tag_set": [{"pk": 99999}]}),
            TAG_NOT_FOUND.to_string(),
        ),
    ];

    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/shop/product/")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let error: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(error.message, expected, "body: {body}");
    }

    assert!(repo.list_products().unwrap().is_empty());
    assert!(repo.list_tags().unwrap().is_empty());
}

#[actix_web::test]
async fn create_product_rejects_malformed_values() {
    let test_db = common::TestDb::new("api_create_product_malformed.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let bodies = [
        json!({"name": "P", "option_set": [{"name": "A", "price": "invalid_price"}]}),
        json!({"name": "P", "option_set": "not a list"}),
        json!({"name": "P", "tag_set": [{"pk": "abc"}]}),
        json!({"name": 42}),
        json!(["not", "an", "object"]),
    ];

    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/shop/product/")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let error: ErrorMessage = test::read_body_json(resp).await;
        assert!(
            error.message.starts_with(INVALID_FORMAT),
            "unexpected message {:?} for {body}",
            error.message
        );
    }

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .insert_header(ContentType::json())
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert!(error.message.starts_with(INVALID_FORMAT));

    assert!(repo.list_products().unwrap().is_empty());
}

#[actix_web::test]
async fn create_product_coerces_numeric_strings() {
    let test_db = common::TestDb::new("api_create_product_coercion.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "Coerced",
            "option_set": [
                {"name": "S", "price": " 1200 "},
                {"name": "F", "price": 99.9},
                {"name": "B", "price": true}
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ProductView = test::read_body_json(resp).await;
    assert_eq!(body.option_set[0].price, 1200);
    assert_eq!(body.option_set[1].price, 99);
    assert_eq!(body.option_set[2].price, 1);
}

#[actix_web::test]
async fn list_products_returns_every_product_in_order() {
    let test_db = common::TestDb::new("api_list_products.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::get().uri("/shop/product/").to_request();
    let empty: Vec<ProductView> = test::call_and_read_body_json(&app, req).await;
    assert!(empty.is_empty());

    for name in ["Product1", "Product2"] {
        let req = test::TestRequest::post()
            .uri("/shop/product/")
            .set_json(json!({"name": name, "option_set": [{"name": "O", "price": 1}]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/shop/product").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<ProductView> = test::read_body_json(resp).await;

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Product1");
    assert_eq!(listed[1].name, "Product2");
    assert!(listed[0].pk < listed[1].pk);
    assert_eq!(listed[1].option_set.len(), 1);
}

#[actix_web::test]
async fn show_product_returns_detail() {
    let test_db = common::TestDb::new("api_show_product.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "Detail",
            "option_set": [{"name": "Only", "price": 10}],
            "tag_set": [{"name": "T"}]
        }))
        .to_request();
    let created: ProductView = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/shop/product/{}/", created.pk))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: ProductView = test::read_body_json(resp).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn missing_products_are_not_found() {
    let test_db = common::TestDb::new("api_missing_products.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    for id in ["99999", "0", "-1", "abc", "99999999999999999999"] {
        let req = test::TestRequest::get()
            .uri(&format!("/shop/product/{id}/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {id}");
        let error: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(error.message, PRODUCT_NOT_FOUND);

        let req = test::TestRequest::patch()
            .uri(&format!("/shop/product/{id}/"))
            .set_json(json!({"name": "Ghost"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "PATCH {id}");
        let error: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(error.message, PRODUCT_NOT_FOUND);
    }

    assert!(repo.list_products().unwrap().is_empty());
}

#[actix_web::test]
async fn update_product_applies_partial_changes() {
    let test_db = common::TestDb::new("api_update_product_partial.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "OriginalProduct",
            "option_set": [{"name": "OriginalOption", "price": 1000}],
            "tag_set": [{"name": "OriginalTag"}]
        }))
        .to_request();
    let created: ProductView = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/shop/product/{}/", created.pk);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"name": "OnlyNameChanged"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let renamed: ProductView = test::read_body_json(resp).await;
    assert_eq!(renamed.name, "OnlyNameChanged");
    assert_eq!(renamed.option_set, created.option_set);
    assert_eq!(renamed.tag_set, created.tag_set);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"option_set": [{"name": "NewOption", "price": 2000}]}))
        .to_request();
    let reoptioned: ProductView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(reoptioned.name, "OnlyNameChanged");
    assert_eq!(reoptioned.option_set.len(), 1);
    assert_eq!(reoptioned.option_set[0].name, "NewOption");
    assert_eq!(reoptioned.option_set[0].price, 2000);
    assert_eq!(reoptioned.tag_set, created.tag_set);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"tag_set": [{"name": "NewTag"}]}))
        .to_request();
    let retagged: ProductView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(retagged.option_set, reoptioned.option_set);
    assert_eq!(retagged.tag_set.len(), 1);
    assert_eq!(retagged.tag_set[0].name, "NewTag");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"option_set": [], "tag_set": []}))
        .to_request();
    let cleared: ProductView = test::call_and_read_body_json(&app, req).await;
    assert!(cleared.option_set.is_empty());
    assert!(cleared.tag_set.is_empty());
    assert_eq!(cleared.name, "OnlyNameChanged");
}

#[actix_web::test]
async fn rejected_update_keeps_stored_product() {
    let test_db = common::TestDb::new("api_rejected_update.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .set_json(json!({
            "name": "Stable",
            "option_set": [{"name": "Keep", "price": 500}],
            "tag_set": [{"name": "KeepTag"}]
        }))
        .to_request();
    let created: ProductView = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/shop/product/{}/", created.pk);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"option_set": [{"name": "Bad", "price": "invalid_price"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert!(error.message.starts_with(INVALID_FORMAT));

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({
            "name": "Changed",
            "option_set": [{"name": "Replaced", "price": 1}],
            "tag_set": [{"pk": 99999}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert_eq!(error.message, TAG_NOT_FOUND);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let fetched: ProductView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn update_of_missing_product_ignores_body() {
    let test_db = common::TestDb::new("api_update_missing_ignores_body.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::patch()
        .uri("/shop/product/99999/")
        .insert_header(ContentType::json())
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert_eq!(error.message, PRODUCT_NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri("/shop/product/99999/")
        .insert_header(ContentType::plaintext())
        .set_payload("{}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert_eq!(error.message, PRODUCT_NOT_FOUND);
}

#[actix_web::test]
async fn create_with_empty_body_requires_name() {
    let test_db = common::TestDb::new("api_create_empty_body.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let req = test::TestRequest::post()
        .uri("/shop/product/")
        .insert_header(ContentType::json())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorMessage = test::read_body_json(resp).await;
    assert_eq!(error.message, NAME_REQUIRED);
}

#[actix_web::test]
async fn tag_entries_are_checked_in_request_order() {
    let test_db = common::TestDb::new("api_tag_entries_request_order.db");
    let repo = DieselRepository::new(test_db.pool());
    let app = init_app!(repo);

    let cases = [
        (json!([{"pk": 99999}, {}]), TAG_NOT_FOUND.to_string()),
        (
            json!([{"name": "Fine"}, {}, {"pk": 99999}]),
            "필수 필드가 누락되었습니다: name".to_string(),
        ),
    ];

    for (tag_set, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/shop/product/")
            .set_json(json!({"name": "P", "tag_set": tag_set}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorMessage = test::read_body_json(resp).await;
        assert_eq!(error.message, expected);
    }

    assert!(repo.list_products().unwrap().is_empty());
    assert!(repo.list_tags().unwrap().is_empty());
}
