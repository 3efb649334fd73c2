use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::{
        middleware::Vc,
        security::{safe_redirect_target, SESSION_COOKIE},
        ViewerContext,
    },
    services::{AccountOutcome, FormErrors, LoginForm, Session, SignupForm},
    urls,
    views,
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Attach the session cookie and send the new viewer on.
fn start_session(jar: CookieJar, session: Session, location: &str) -> Response {
    (jar.add(session_cookie(session.token)), urls::found(location)).into_response()
}

pub async fn signup_form(vc: Vc) -> Html<String> {
    Html(views::auth::signup_page(&vc, "", "", &FormErrors::new()))
}

pub async fn signup(
    State(state): State<AppState>,
    vc: Vc,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let (username, full_name) = (form.username.clone(), form.full_name.clone().unwrap_or_default());
    match state.account_service.signup(form).await? {
        AccountOutcome::LoggedIn(session) => Ok(start_session(jar, session, &urls::index())),
        AccountOutcome::Invalid(errors) => {
            Ok(Html(views::auth::signup_page(&vc, &username, &full_name, &errors)).into_response())
        }
    }
}

pub async fn login_form(vc: Vc, Query(query): Query<NextQuery>) -> Html<String> {
    let next = safe_redirect_target(query.next.as_deref());
    Html(views::auth::login_page(&vc, "", next, &FormErrors::new()))
}

/// Successful logins go to `next` when it is a local path, else home.
pub async fn login(
    State(state): State<AppState>,
    vc: Vc,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.account_service.login(&form).await? {
        AccountOutcome::LoggedIn(session) => {
            let index = urls::index();
            let location = safe_redirect_target(form.next.as_deref()).unwrap_or(index.as_str());
            Ok(start_session(jar, session, location))
        }
        AccountOutcome::Invalid(errors) => {
            let next = safe_redirect_target(form.next.as_deref());
            Ok(Html(views::auth::login_page(&vc, &form.username, next, &errors)).into_response())
        }
    }
}

pub async fn logout(State(state): State<AppState>, vc: Vc, jar: CookieJar) -> AppResult<Response> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
    state.account_service.logout(token.as_deref()).await?;

    let anonymous = ViewerContext::anonymous(vc.request_id.clone());
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Html(views::auth::logged_out_page(&anonymous))).into_response())
}
