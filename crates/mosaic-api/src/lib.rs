//! HTTP adapter over the composed application. Handlers translate requests
//! into composition calls and add no rules of their own.

pub mod comments;
pub mod error;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

use mosaic_compositions::{PostComment, UserInvite, UserInvitePostComment};
use mosaic_concepts::{
    BasicCommentConcept, BasicInvitationConcept, BasicPostConcept, BasicUserConcept,
    PrivateUserConcept, UserConcept,
};
use mosaic_db::Database;
use mosaic_types::models::{CommentBody, PostBody, Profile};
use tracing::info;

/// The outermost composition, with the application payloads plugged in.
pub type App = UserInvitePostComment<Profile, PostBody, CommentBody>;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub app: App,
}

/// Choices made once, when the composition graph is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wiring {
    /// Use the user concept that refuses enumeration.
    pub private_users: bool,
    /// Store comments in the post collection, as older deployments did.
    pub shared_post_comment_collection: bool,
    /// Check the password when creating posts and comments.
    pub authenticate_on_create: bool,
}

/// Build the composition graph over one database.
pub fn compose(db: Arc<Database>, wiring: Wiring) -> App {
    let user: Arc<dyn UserConcept<Profile>> = if wiring.private_users {
        Arc::new(PrivateUserConcept::<Profile>::new(db.clone()))
    } else {
        Arc::new(BasicUserConcept::<Profile>::new(db.clone()))
    };
    let comment_collection = if wiring.shared_post_comment_collection {
        "posts"
    } else {
        "comments"
    };

    let user_invite = UserInvite::new(user, Arc::new(BasicInvitationConcept::new(db.clone())));
    let post_comment = PostComment::new(
        Arc::new(BasicPostConcept::<PostBody>::new(db.clone())),
        Arc::new(BasicCommentConcept::<CommentBody>::with_collection(db, comment_collection)),
    );

    info!(?wiring, "composition graph wired");
    UserInvitePostComment::new(Arc::new(user_invite), Arc::new(post_comment))
        .with_create_authentication(wiring.authenticate_on_create)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/invitations", post(users::create_invitation))
        .route("/invitations/{key}", get(users::check_invitation))
        .route("/users", post(users::register).get(users::get_users))
        .route("/auth/authenticate", post(users::authenticate))
        .route("/users/{username}", get(users::get_user))
        .route("/posts", post(posts::create_post).get(posts::get_posts))
        .route("/posts/{id}", get(posts::get_post).delete(posts::delete_post))
        .route("/comments", post(comments::create_comment).get(comments::get_comments))
        .route(
            "/comments/{id}",
            get(comments::get_comment).delete(comments::delete_comment),
        )
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_router(wiring: Wiring) -> Router {
        let db = Arc::new(Database::open_in_memory().unwrap());
        router(Arc::new(AppStateInner {
            app: compose(db, wiring),
        }))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(router: &Router, username: &str) -> String {
        let (_, invitation) = send(router, "POST", "/invitations", None).await;
        let key = invitation["key"].as_str().unwrap().to_string();
        let (status, created) = send(
            router,
            "POST",
            "/users",
            Some(json!({
                "username": username,
                "password": "secret",
                "data": { "legal_name": username, "invitation_key": key }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn end_to_end_post_lifecycle() {
        let router = test_router(Wiring::default());
        let alice_id = register(&router, "alice").await;

        let (status, user) = send(&router, "GET", "/users/alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], alice_id.as_str());
        assert_eq!(user["data"]["invitation_key"], "");
        assert!(user.get("password").is_none());

        let (status, post) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "title": "Hello", "points": 3 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let post_id = post["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &router,
            "POST",
            "/comments",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "text": "first" },
                "original_post": post_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/posts/{}", post_id),
            Some(json!({ "username": "alice", "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, comments) = send(
            &router,
            "GET",
            &format!("/comments?original_post={}", post_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(comments, json!([]));

        let (status, _) = send(&router, "GET", &format!("/posts/{}", post_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let router = test_router(Wiring::default());
        register(&router, "alice").await;
        register(&router, "bob").await;

        let (status, body) = send(
            &router,
            "POST",
            "/users",
            Some(json!({
                "username": "carol",
                "password": "pw",
                "data": { "legal_name": "Carol", "invitation_key": "guess" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid invitation key!");

        let (_, post) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "title": "t", "points": 0 }
            })),
        )
        .await;
        let uri = format!("/posts/{}", post["id"].as_str().unwrap());

        let (status, _) = send(
            &router,
            "DELETE",
            &uri,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &router,
            "DELETE",
            &uri,
            Some(json!({ "username": "bob", "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&router, "GET", "/users/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let router = test_router(Wiring::default());
        register(&router, "alice").await;

        let (_, invitation) = send(&router, "POST", "/invitations", None).await;
        let (status, _) = send(
            &router,
            "POST",
            "/users",
            Some(json!({
                "username": "alice",
                "password": "other",
                "data": { "legal_name": "A", "invitation_key": invitation["key"] }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn private_wiring_hides_user_list() {
        let router = test_router(Wiring {
            private_users: true,
            ..Wiring::default()
        });
        register(&router, "alice").await;

        let (status, users) = send(&router, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users, json!([]));

        let (_, auth) = send(
            &router,
            "POST",
            "/auth/authenticate",
            Some(json!({ "username": "alice", "password": "secret" })),
        )
        .await;
        assert_eq!(auth["authenticated"], true);
    }

    #[tokio::test]
    async fn shared_wiring_lets_comments_be_replied_to() {
        let router = test_router(Wiring {
            shared_post_comment_collection: true,
            ..Wiring::default()
        });
        register(&router, "alice").await;

        let (_, post) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "title": "Hello", "points": 1 }
            })),
        )
        .await;
        let post_id = post["id"].as_str().unwrap().to_string();

        let comment = |text: &str, parent: &str| {
            json!({
                "username": "alice",
                "password": "secret",
                "content": { "text": text },
                "original_post": parent
            })
        };
        let (status, parent) = send(&router, "POST", "/comments", Some(comment("parent", &post_id))).await;
        assert_eq!(status, StatusCode::CREATED);
        let parent_id = parent["id"].as_str().unwrap().to_string();

        let (status, reply) = send(&router, "POST", "/comments", Some(comment("reply", &parent_id))).await;
        assert_eq!(status, StatusCode::CREATED);
        let reply_id = reply["id"].as_str().unwrap().to_string();

        // Post reads skip comment records sharing the collection.
        let (_, posts) = send(&router, "GET", "/posts", None).await;
        assert_eq!(posts.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/comments/{}", parent_id),
            Some(json!({ "username": "alice", "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&router, "GET", &format!("/comments/{}", reply_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&router, "GET", &format!("/posts/{}", post_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn isolated_wiring_refuses_replies_to_comments() {
        let router = test_router(Wiring::default());
        register(&router, "alice").await;

        let (_, post) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "title": "Hello", "points": 1 }
            })),
        )
        .await;
        let (_, parent) = send(
            &router,
            "POST",
            "/comments",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "text": "parent" },
                "original_post": post["id"]
            })),
        )
        .await;

        let (status, body) = send(
            &router,
            "POST",
            "/comments",
            Some(json!({
                "username": "alice",
                "password": "secret",
                "content": { "text": "reply" },
                "original_post": parent["id"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("does not exist"));
    }

    #[tokio::test]
    async fn invitation_check_endpoint() {
        let router = test_router(Wiring::default());
        let (status, invitation) = send(&router, "POST", "/invitations", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let key = invitation["key"].as_str().unwrap();

        let (_, check) = send(&router, "GET", &format!("/invitations/{}", key), None).await;
        assert_eq!(check["valid"], true);
        let (_, check) = send(&router, "GET", "/invitations/nope", None).await;
        assert_eq!(check["valid"], false);
    }
}
