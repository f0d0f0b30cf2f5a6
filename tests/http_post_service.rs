use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedtui::error::FeedError;
use feedtui::models::{Credential, HttpPostService, PostId, PostService};

fn post_json(id: &str, likes: &[&str]) -> serde_json::Value {
    json!({
        "_id": id,
        "user": { "_id": "author", "username": "ann", "profilePic": "" },
        "text": format!("post {}", id),
        "likes": likes,
        "comments": [{ "_id": "c1", "text": "first", "user": "u2" }],
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

fn service_for(server: &MockServer) -> HttpPostService {
    HttpPostService::new(format!("{}/api", server.uri()), Some("viewer".into()))
}

fn credential() -> Credential {
    Credential::new("tok")
}

#[tokio::test]
async fn deleted_posts_send_paging_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/post/deletedposts"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post_json("p1", &[]), post_json("p2", &["viewer"])],
            "page": 2,
            "totalPages": 3,
            "total": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = service_for(&server)
        .list_deleted_posts(&credential(), 2, 5)
        .await
        .unwrap();
    assert_eq!(page.page, Some(2));
    assert_eq!(page.total_pages, Some(3));
    assert_eq!(page.total, Some(11));
    assert_eq!(page.posts.len(), 2);
    assert!(!page.posts[0].viewer_has_liked);
    assert!(page.posts[1].viewer_has_liked);
}

#[tokio::test]
async fn like_decodes_post_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/post/like/p1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "post": post_json("p1", &["viewer", "u2"])
        })))
        .expect(1)
        .mount(&server)
        .await;

    let post = service_for(&server)
        .toggle_like(&credential(), &PostId::from("p1"))
        .await
        .unwrap();
    assert_eq!(post.id, PostId::from("p1"));
    assert_eq!(post.like_count, 2);
    assert!(post.viewer_has_liked);
    assert_eq!(post.author.name, "ann");
    assert_eq!(post.comments.len(), 1);
}

#[tokio::test]
async fn comment_posts_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/post/comment/p1"))
        .and(body_json(json!({ "text": "nice!" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "post": post_json("p1", &[])
        })))
        .expect(1)
        .mount(&server)
        .await;

    let post = service_for(&server)
        .add_comment(&credential(), &PostId::from("p1"), "nice!")
        .await
        .unwrap();
    assert_eq!(post.comments[0].text, "first");
}

#[tokio::test]
async fn not_found_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/post/restore/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Post not found" })))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .restore_post(&credential(), &PostId::from("gone"))
        .await
        .unwrap_err();
    assert_eq!(err, FeedError::Status { operation: "Restore post".into(), status: 404 });
}

#[tokio::test]
async fn server_error_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/post/delete/p1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/post/myposts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert_eq!(
        service.delete_post(&credential(), &PostId::from("p1")).await,
        Err(FeedError::Status { operation: "Delete post".into(), status: 500 })
    );
    assert!(matches!(
        service.list_my_posts(&credential()).await,
        Err(FeedError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/post/likedposts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .list_liked_posts(&credential())
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Json(_)), "got {:?}", err);
}
