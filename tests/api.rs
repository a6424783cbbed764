//! End-to-end REST tests over a real socket.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use common::{TestServer, error_code, str_field};
use freelance_hub::domain::UserRole;
use serde_json::{Value, json};

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/api/orders", None).await;
    assert_eq!(status, 401);
    assert_eq!(error_code(&body), Some(5001));

    let (status, _) = server.get("/api/orders", Some("garbage")).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn current_user_is_synced_from_claims() {
    let server = TestServer::start().await;
    let token = server.token("u-1", UserRole::Seller);
    let (status, body) = server.get("/api/auth/user", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], "u-1");
    assert_eq!(body["role"], "seller");
    assert_eq!(body["email"], "u-1@example.com");
}

#[tokio::test]
async fn listings_browse_search_and_owner_rules() {
    let server = TestServer::start().await;
    let seller = server.token("seller", UserRole::Seller);
    let rival = server.token("rival", UserRole::Seller);

    let logo = server.listing(&seller, "Logo Design", "50.00").await;
    server.listing(&seller, "Website Build", "900.00").await;

    let (status, body) = server.get("/api/services", None).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = server.get("/api/search?q=logo", None).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = server.get("/api/search?maxPrice=100", None).await;
    assert_eq!(status, 400);

    let (status, body) = server.get("/api/services?maxPrice=100", None).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = server
        .patch(&format!("/api/services/{logo}"), &rival, json!({ "price": "1.00" }))
        .await;
    assert_eq!(status, 403);
    assert_eq!(error_code(&body), Some(5003));

    let (status, body) = server
        .patch(&format!("/api/services/{logo}"), &seller, json!({ "price": "75.00" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["price"], "75.00");

    let slug = str_field(&body, "slug");
    let (status, body) = server.get(&format!("/api/services/slug/{slug}"), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], logo.as_str());

    let Ok(resp) = server
        .http
        .delete(server.url(&format!("/api/services/{logo}")))
        .bearer_auth(&seller)
        .send()
        .await
    else {
        panic!("delete failed");
    };
    assert_eq!(resp.status().as_u16(), 204);

    let (_, body) = server.get("/api/services", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    let (_, mine) = server.get("/api/my-services", Some(&seller)).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unknown_service_is_404() {
    let server = TestServer::start().await;
    let (status, body) = server
        .get(&format!("/api/services/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(error_code(&body), Some(2001));
}

#[tokio::test]
async fn order_lifecycle_review_and_analytics() {
    let server = TestServer::start().await;
    let seller = server.token("seller", UserRole::Seller);
    let buyer = server.token("buyer", UserRole::User);
    let stranger = server.token("stranger", UserRole::User);

    let service = server.listing(&seller, "Logo Design", "150.00").await;
    let order = server.order(&buyer, &service).await;
    let path = format!("/api/orders/{order}");

    let (status, body) = server.get(&path, Some(&buyer)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["sellerId"], "seller");
    assert_eq!(body["price"], "150.00");
    assert!(body["orderNumber"].as_str().is_some_and(|n| n.starts_with("ALP-")));

    let (status, _) = server.get(&path, Some(&stranger)).await;
    assert_eq!(status, 403);

    let (status, body) = server.patch(&path, &seller, json!({ "status": "completed" })).await;
    assert_eq!(status, 400);
    assert_eq!(error_code(&body), Some(1002));

    let (status, _) = server.patch(&path, &buyer, json!({ "status": "in_progress" })).await;
    assert_eq!(status, 403);

    let review_path = format!("{path}/reviews");
    let (status, body) = server
        .post(&review_path, &buyer, json!({ "rating": 5, "comment": "too early" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_code(&body), Some(1003));

    for next in ["in_progress", "completed"] {
        let (status, body) = server.patch(&path, &seller, json!({ "status": next })).await;
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["status"], next);
    }

    let (status, _) = server.post(&review_path, &buyer, json!({ "rating": 6 })).await;
    assert_eq!(status, 400);
    let (status, _) = server.post(&review_path, &seller, json!({ "rating": 5 })).await;
    assert_eq!(status, 403);
    let (status, body) = server
        .post(&review_path, &buyer, json!({ "rating": 4, "comment": "solid work" }))
        .await;
    assert_eq!(status, 201, "{body}");
    let (status, _) = server.post(&review_path, &buyer, json!({ "rating": 5 })).await;
    assert_eq!(status, 409);

    let (_, rating) = server.get(&format!("/api/services/{service}/rating"), None).await;
    assert_eq!(rating["totalReviews"], 1);
    assert_eq!(rating["averageRating"], 4.0);

    let (_, reviews) = server.get(&format!("/api/services/{service}/reviews"), None).await;
    assert_eq!(reviews.as_array().map(Vec::len), Some(1));

    let (status, stats) = server.get("/api/analytics/seller", Some(&seller)).await;
    assert_eq!(status, 200);
    assert_eq!(stats["totalOrders"], 1);
    assert_eq!(stats["completedOrders"], 1);
    assert_eq!(stats["totalEarnings"], "150.00");
    assert_eq!(stats["activeServices"], 1);

    let (status, dash) = server.get("/api/analytics/dashboard", Some(&buyer)).await;
    assert_eq!(status, 200);
    assert_eq!(dash["totalOrders"], 1);
}

#[tokio::test]
async fn orders_listed_by_role() {
    let server = TestServer::start().await;
    let seller = server.token("seller", UserRole::Seller);
    let buyer = server.token("buyer", UserRole::User);
    let service = server.listing(&seller, "Copywriting", "40.00").await;
    server.order(&buyer, &service).await;
    server.order(&buyer, &service).await;

    let (_, bought) = server.get("/api/orders", Some(&buyer)).await;
    assert_eq!(bought.as_array().map(Vec::len), Some(2));
    let (_, sold) = server.get("/api/orders?role=seller", Some(&seller)).await;
    assert_eq!(sold.as_array().map(Vec::len), Some(2));
    let (_, none) = server.get("/api/orders?role=seller", Some(&buyer)).await;
    assert_eq!(none.as_array().map(Vec::len), Some(0));
    let (status, _) = server.get("/api/orders?role=admin", Some(&buyer)).await;
    assert_eq!(status, 400);
    let (_, pending) = server.get("/api/orders?status=pending&limit=1", Some(&buyer)).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn chat_messages_and_read_state() {
    let server = TestServer::start().await;
    let seller = server.token("seller", UserRole::Seller);
    let buyer = server.token("buyer", UserRole::User);
    let service = server.listing(&seller, "Illustration", "80.00").await;
    let order = server.order(&buyer, &service).await;
    let path = format!("/api/orders/{order}/messages");

    let (status, _) = server.post(&path, &buyer, json!({ "message": "   " })).await;
    assert_eq!(status, 400);

    let (status, sent) = server.post(&path, &buyer, json!({ "message": "Hi there" })).await;
    assert_eq!(status, 201);
    assert_eq!(sent["receiverId"], "seller");
    assert_eq!(sent["isRead"], false);
    let message_id = str_field(&sent, "id");

    let (_, thread) = server.get(&path, Some(&seller)).await;
    assert_eq!(thread.as_array().map(Vec::len), Some(1));

    let (_, unread) = server.get("/api/messages/unread-count", Some(&seller)).await;
    assert_eq!(unread["count"], 1);

    let read_path = format!("/api/messages/{message_id}/read");
    let (status, _) = server.post(&read_path, &buyer, Value::Null).await;
    assert_eq!(status, 403);
    let (status, _) = server.post(&read_path, &seller, Value::Null).await;
    assert_eq!(status, 204);

    let (_, unread) = server.get("/api/messages/unread-count", Some(&seller)).await;
    assert_eq!(unread["count"], 0);
}

#[tokio::test]
async fn categories_and_portfolio() {
    let server = TestServer::start().await;
    let admin = server.token("root", UserRole::Admin);
    let user = server.token("maker", UserRole::Seller);

    let body = json!({ "name": "Graphic Design", "sortOrder": 1 });
    let (status, _) = server.post("/api/categories", &user, body.clone()).await;
    assert_eq!(status, 403);
    let (status, created) = server.post("/api/categories", &admin, body.clone()).await;
    assert_eq!(status, 201);
    assert_eq!(created["slug"], "graphic-design");
    let (status, _) = server.post("/api/categories", &admin, body).await;
    assert_eq!(status, 409);
    let (_, all) = server.get("/api/categories", None).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (status, item) = server
        .post("/api/portfolio", &user, json!({ "title": "Rebrand", "tags": ["logo"] }))
        .await;
    assert_eq!(status, 201);
    let (_, listed) = server.get("/api/users/maker/portfolio", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let item_id = str_field(&item, "id");
    let Ok(resp) = server
        .http
        .delete(server.url(&format!("/api/portfolio/{item_id}")))
        .bearer_auth(&admin)
        .send()
        .await
    else {
        panic!("delete failed");
    };
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn upload_accepts_allowed_types_only() {
    let server = TestServer::start().await;
    let token = server.token("uploader", UserRole::User);

    let form = reqwest::multipart::Form::new().part(
        "files",
        reqwest::multipart::Part::bytes(b"%PDF-1.4 brief".to_vec()).file_name("brief.pdf"),
    );
    let Ok(resp) = server
        .http
        .post(server.url("/api/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
    else {
        panic!("upload failed");
    };
    assert_eq!(resp.status().as_u16(), 200);
    let Ok(body) = resp.json::<Value>().await else {
        panic!("bad body");
    };
    assert_eq!(body["files"][0]["originalName"], "brief.pdf");
    assert_eq!(body["files"][0]["size"], 14);

    let form = reqwest::multipart::Form::new().part(
        "files",
        reqwest::multipart::Part::bytes(b"MZ".to_vec()).file_name("setup.exe"),
    );
    let Ok(resp) = server
        .http
        .post(server.url("/api/upload"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
    else {
        panic!("upload failed");
    };
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/api-docs/openapi.json", None).await;
    assert_eq!(status, 200);
    assert!(body["paths"].get("/api/orders").is_some());
}
