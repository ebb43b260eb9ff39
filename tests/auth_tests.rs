mod common;

use axum::http::{StatusCode, header};
use common::{ADMIN, body_text, location, session_cookie, spawn_app};

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/dashboard", "/ente_list", "/disp_list", "/query", "/user_list"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_anonymous_post_is_forbidden() {
    let app = spawn_app().await;

    let response = app.post("/ente_add", "name=Comune&short_name=CM", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store().enti().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_public_pages() {
    let app = spawn_app().await;

    let response = app.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"password\""));

    assert_eq!(app.get("/smecds", None).await.status(), StatusCode::OK);

    let response = app.get("/static/style.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/css"
    );
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = spawn_app().await;

    let wrong_password = app
        .post("/login", "username=admin&password=nope", None)
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());
    let wrong_password = body_text(wrong_password).await;

    let unknown_user = app
        .post("/login", "username=nobody&password=nope", None)
        .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_text(unknown_user).await;

    assert!(wrong_password.contains("Invalid username or password"));
    assert!(unknown_user.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(ADMIN));

    let response = app.get("/login", Some(&cookie)).await;
    assert_eq!(location(&response), "/dashboard");

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(location(&response), "/login");

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

fn set_cookie_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_remember_me_makes_cookie_persistent() {
    let app = spawn_app().await;

    let response = app
        .post("/login", "username=admin&password=admin", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let header = set_cookie_header(&response);
    assert!(!header.is_empty());
    assert!(!header.contains("Max-Age"), "{header}");

    let response = app
        .post("/login", "username=admin&password=admin&remember=on", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let header = set_cookie_header(&response);
    assert!(header.contains("Max-Age"), "{header}");

    let cookie = session_cookie(&response).unwrap();
    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let app = spawn_app().await;

    let response = app.get("/dashboard", Some("id=forged-session-id")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_add_user_and_login_with_it() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    let response = app
        .post("/user_add", "username=mario&password=abc", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/user_add", "username=mario&password=segreto", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .post("/user_add", "username=mario&password=segreto", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mario = app.login_as("mario", "segreto").await;
    assert_eq!(
        app.get("/ente_list", Some(&mario)).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_cannot_delete_self_or_last_user() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let admin = app
        .store()
        .users()
        .get_by_username(ADMIN)
        .await
        .unwrap()
        .unwrap();

    let response = app.get(&format!("/user_del/{}", admin.id), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let users = app.store().users();
    assert!(users.delete_guarded(admin.id, None).await.is_err());
    assert_eq!(users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_session_of_deleted_user_is_dropped() {
    let app = spawn_app().await;
    let admin_cookie = app.login().await;

    app.post("/user_add", "username=luigi&password=segreto", Some(&admin_cookie))
        .await;
    let luigi_cookie = app.login_as("luigi", "segreto").await;
    let luigi = app
        .store()
        .users()
        .get_by_username("luigi")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .get(&format!("/user_del/{}", luigi.id), Some(&admin_cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/dashboard", Some(&luigi_cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    let cookie = app.login().await;
    let admin = app
        .store()
        .users()
        .get_by_username(ADMIN)
        .await
        .unwrap()
        .unwrap();

    let response = app
        .post(
            &format!("/user_show/{}", admin.id),
            "password=nuovapassword",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .post("/login", "username=admin&password=admin", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    app.login_as(ADMIN, "nuovapassword").await;
}

#[tokio::test]
async fn test_unknown_page_is_404() {
    let app = spawn_app().await;
    let cookie = app.login().await;

    assert_eq!(
        app.get("/no_such_page", Some(&cookie)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/ente_show/999", Some(&cookie)).await.status(),
        StatusCode::NOT_FOUND
    );
}
