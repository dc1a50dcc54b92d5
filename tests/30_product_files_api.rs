mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use product_files::auth::Identity;

#[tokio::test]
async fn anonymous_listing_is_forbidden() -> Result<()> {
    let app = common::test_app().await?;
    let (status, body) = common::get_as(&app, "/api/product_files", None).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_to_owned_and_purchased_files() -> Result<()> {
    let app = common::test_app().await?;

    let (status, body) = common::get_as(&app, "/api/product_files", Some(&Identity::admin("admin"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::data_ids(&body), vec!["f1", "f2", "f3"]);

    let (_, body) = common::get_as(&app, "/api/product_files", Some(&Identity::customer("seller"))).await?;
    assert_eq!(common::data_ids(&body), vec!["f1", "f2"]);

    let (_, body) = common::get_as(&app, "/api/product_files", Some(&Identity::customer("buyer"))).await?;
    assert_eq!(common::data_ids(&body), vec!["f2"]);

    let (status, body) = common::get_as(&app, "/api/product_files", Some(&Identity::customer("stranger"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(common::data_ids(&body).is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_supports_order_and_paging() -> Result<()> {
    let app = common::test_app().await?;
    let admin = Identity::admin("admin");

    let (_, body) = common::get_as(&app, "/api/product_files?order=-filesize&limit=2", Some(&admin)).await?;
    assert_eq!(common::data_ids(&body), vec!["f2", "f3"]);

    let (_, body) = common::get_as(&app, "/api/product_files?order=filename&offset=1", Some(&admin)).await?;
    assert_eq!(common::data_ids(&body), vec!["f1", "f3"]);
    Ok(())
}

#[tokio::test]
async fn find_cannot_widen_access() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::token_for(&Identity::customer("buyer"))?;

    let filter = json!({ "where": { "id": { "$in": ["f1", "f2", "f3"] } } });
    let (status, body) = common::send(&app, Method::POST, "/api/find/product_files", Some(&token), Some(filter)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::data_ids(&body), vec!["f2"]);

    let filter = json!({ "where": { "mime_type": "application/pdf" } });
    let (_, body) = common::send(&app, Method::POST, "/api/find/product_files", Some(&token), Some(filter)).await?;
    assert!(common::data_ids(&body).is_empty());
    Ok(())
}

#[tokio::test]
async fn find_rejects_unknown_operators() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::token_for(&Identity::admin("admin"))?;

    let filter = json!({ "where": { "filesize": { "$regex": ".*" } } });
    let (status, body) = common::send(&app, Method::POST, "/api/find/product_files", Some(&token), Some(filter)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn get_hides_files_the_caller_cannot_read() -> Result<()> {
    let app = common::test_app().await?;
    let buyer = Identity::customer("buyer");

    let (status, body) = common::get_as(&app, "/api/product_files/f2", Some(&buyer)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filename"], "assets.zip");

    let (status, _) = common::get_as(&app, "/api/product_files/f1", Some(&buyer)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::get_as(&app, "/api/product_files/missing", Some(&Identity::admin("admin"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_stamps_the_caller_as_owner() -> Result<()> {
    let app = common::test_app().await?;
    let seller = Identity::customer("seller");
    let token = common::token_for(&seller)?;

    let upload = json!({ "filename": "bonus.pdf", "mime_type": "application/pdf", "filesize": 10, "user": "other" });
    let (status, body) = common::send(&app, Method::POST, "/api/product_files", Some(&token), Some(upload)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"], "seller");
    assert_eq!(body["data"]["url"], "/product_files/bonus.pdf");

    // Not attached to a product yet, so only admins can read it back
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = common::get_as(&app, &format!("/api/product_files/{}", id), Some(&Identity::admin("admin"))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_requires_authentication_and_valid_mime_type() -> Result<()> {
    let app = common::test_app().await?;
    let upload = json!({ "filename": "run.sh", "mime_type": "application/x-sh" });

    let (status, _) = common::send(&app, Method::POST, "/api/product_files", None, Some(upload.clone())).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = common::token_for(&Identity::customer("seller"))?;
    let (status, body) = common::send(&app, Method::POST, "/api/product_files", Some(&token), Some(upload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["mime_type"].is_string());

    let (status, _) = common::send(&app, Method::POST, "/api/product_files", Some(&token), Some(json!(["x"]))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_admins_update_and_delete() -> Result<()> {
    let app = common::test_app().await?;
    let seller = common::token_for(&Identity::customer("seller"))?;
    let admin = common::token_for(&Identity::admin("admin"))?;

    let patch = json!({ "filename": "guide-v2.pdf", "user": "buyer" });
    let (status, _) = common::send(&app, Method::PATCH, "/api/product_files/f1", Some(&seller), Some(patch.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::send(&app, Method::PATCH, "/api/product_files/f1", Some(&admin), Some(patch)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filename"], "guide-v2.pdf");
    assert_eq!(body["data"]["user"], "seller");

    let (status, _) = common::send(&app, Method::DELETE, "/api/product_files/f1", Some(&seller), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::send(&app, Method::DELETE, "/api/product_files/f1", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::send(&app, Method::DELETE, "/api/product_files/f1", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn meta_reflects_the_callers_permissions() -> Result<()> {
    let app = common::test_app().await?;

    let (status, body) = common::get_as(&app, "/api/meta/product_files", Some(&Identity::customer("seller"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "product_files");
    assert_eq!(body["data"]["hidden"], true);
    assert_eq!(body["data"]["access"]["create"], true);
    assert_eq!(body["data"]["access"]["update"], false);

    let (_, body) = common::get_as(&app, "/api/meta/product_files", Some(&Identity::admin("admin"))).await?;
    assert_eq!(body["data"]["hidden"], false);
    assert_eq!(body["data"]["access"]["delete"], true);
    Ok(())
}
