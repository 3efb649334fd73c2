mod common;

use axum::http::StatusCode;
use common::{body_text, location, multipart_body, TestApp, SMALL_GIF};
use yatube::models::PostScope;

#[tokio::test]
async fn post_detail_shows_author_text_and_group() {
    let app = TestApp::new().await;
    let (leo, _) = app.author("leo").await;
    let cats = app.db().create_group("Cats", "cats", "").await.unwrap();
    let post_id = app.post(&leo, "Тестовый текст поста", Some(cats.id)).await;

    let response = app.get(&format!("/leo/{}/", post_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Тестовый текст поста"));
    assert!(html.contains("href=\"/leo/\">leo</a>"));
    assert!(html.contains("href=\"/group/cats/\">Cats</a>"));
    assert!(html.contains("<title>leo | Тестовый текст </title>"));
}

#[tokio::test]
async fn detail_with_wrong_author_or_id_is_404() {
    let app = TestApp::new().await;
    let (leo, _) = app.author("leo").await;
    app.author("anna").await;
    let post_id = app.post(&leo, "hello", None).await;

    assert_eq!(app.get(&format!("/anna/{}/", post_id), None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/leo/9999/", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/leo/abc/", None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_authoring_redirects_to_login() {
    let app = TestApp::new().await;
    let (leo, _) = app.author("leo").await;
    let post_id = app.post(&leo, "hello", None).await;

    let response = app.get("/new/", None).await;
    assert_eq!(location(&response), "/auth/login/?next=/new/");

    let response = app.post_form("/new/", "text=sneaky", None).await;
    assert_eq!(location(&response), "/auth/login/?next=/new/");

    let edit = format!("/leo/{}/edit/", post_id);
    let response = app.get(&edit, None).await;
    assert_eq!(location(&response), format!("/auth/login/?next={}", edit));

    let response = app.get("/follow/", None).await;
    assert_eq!(location(&response), "/auth/login/?next=/follow/");

    assert_eq!(app.db().count_posts(PostScope::All).await.unwrap(), 1);
}

#[tokio::test]
async fn authenticated_create_persists_and_redirects_home() {
    let app = TestApp::new().await;
    let (leo, token) = app.author("leo").await;
    let cats = app.db().create_group("Cats", "cats", "").await.unwrap();

    let form = app.get("/new/", Some(&token)).await;
    assert_eq!(form.status(), StatusCode::OK);
    assert!(body_text(form).await.contains("<option value=\"1\">Cats</option>"));

    let response = app
        .post_form("/new/", &format!("text=A+new+post&group={}", cats.id), Some(&token))
        .await;
    assert_eq!(location(&response), "/");

    let posts = app.db().list_posts(PostScope::Author(leo.id), 10, 0).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "A new post");
    assert_eq!(posts[0].group_id, Some(cats.id));
}

#[tokio::test]
async fn invalid_post_form_is_rerendered() {
    let app = TestApp::new().await;
    let (_leo, token) = app.author("leo").await;

    let response = app.post_form("/new/", "text=+++&group=42", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("Select a valid choice."));
    assert_eq!(app.db().count_posts(PostScope::All).await.unwrap(), 0);
}

#[tokio::test]
async fn image_upload_is_stored_under_media() {
    let app = TestApp::new().await;
    let (leo, token) = app.author("leo").await;

    let body = multipart_body(&[("text", "post with image"), ("group", "")], Some(("small.gif", SMALL_GIF)));
    let response = app.post_multipart("/new/", body, Some(&token)).await;
    assert_eq!(location(&response), "/");

    let posts = app.db().list_posts(PostScope::Author(leo.id), 10, 0).await.unwrap();
    assert_eq!(posts[0].image.as_deref(), Some("posts/small.gif"));
    assert!(app.media.path().join("posts/small.gif").exists());

    let html = body_text(app.get(&format!("/leo/{}/", posts[0].id), None).await).await;
    assert!(html.contains("src=\"/media/posts/small.gif\""));

    let served = app.get("/media/posts/small.gif", None).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let app = TestApp::new().await;
    let (_leo, token) = app.author("leo").await;

    let body = multipart_body(&[("text", "not an image")], Some(("notes.gif", b"plain text".as_slice())));
    let response = app.post_multipart("/new/", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Upload a valid image."));
    assert_eq!(app.db().count_posts(PostScope::All).await.unwrap(), 0);
}

#[tokio::test]
async fn author_can_edit_post() {
    let app = TestApp::new().await;
    let (leo, token) = app.author("leo").await;
    let post_id = app.post(&leo, "original text", None).await;
    let edit = format!("/leo/{}/edit/", post_id);

    let form = body_text(app.get(&edit, Some(&token)).await).await;
    assert!(form.contains(">original text</textarea>"));

    let response = app.post_form(&edit, "text=edited+text&group=", Some(&token)).await;
    assert_eq!(location(&response), format!("/leo/{}/", post_id));
    let post = app.db().get_post(post_id).await.unwrap().unwrap();
    assert_eq!(post.text, "edited text");
}

#[tokio::test]
async fn non_author_edit_redirects_to_detail() {
    let app = TestApp::new().await;
    let (leo, _) = app.author("leo").await;
    let (_anna, anna_token) = app.author("anna").await;
    let post_id = app.post(&leo, "original text", None).await;
    let edit = format!("/leo/{}/edit/", post_id);
    let detail = format!("/leo/{}/", post_id);

    let response = app.get(&edit, Some(&anna_token)).await;
    assert_eq!(location(&response), detail);

    let response = app.post_form(&edit, "text=hijacked", Some(&anna_token)).await;
    assert_eq!(location(&response), detail);
    assert_eq!(app.db().get_post(post_id).await.unwrap().unwrap().text, "original text");
}

#[tokio::test]
async fn comments_need_login_and_text() {
    let app = TestApp::new().await;
    let (leo, _) = app.author("leo").await;
    let (_anna, anna_token) = app.author("anna").await;
    let post_id = app.post(&leo, "hello", None).await;
    let comment = format!("/leo/{}/comment/", post_id);
    let detail = format!("/leo/{}/", post_id);

    let response = app.post_form(&comment, "text=drive-by", None).await;
    assert_eq!(location(&response), format!("/auth/login/?next={}", comment));
    assert_eq!(app.db().count_comments(post_id).await.unwrap(), 0);

    let response = app.post_form(&comment, "text=+++", Some(&anna_token)).await;
    assert_eq!(location(&response), detail);
    assert_eq!(app.db().count_comments(post_id).await.unwrap(), 0);

    let response = app.post_form(&comment, "text=Great+post", Some(&anna_token)).await;
    assert_eq!(location(&response), detail);
    assert_eq!(app.db().count_comments(post_id).await.unwrap(), 1);

    let html = body_text(app.get(&detail, None).await).await;
    assert!(html.contains("Great post"));
    assert!(html.contains("href=\"/anna/\">anna</a>"));

    let response = app.get(&comment, Some(&anna_token)).await;
    assert_eq!(location(&response), detail);
}
