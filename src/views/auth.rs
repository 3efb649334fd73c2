use super::{escape_html, field_errors, layout};
use crate::{
    infrastructure::ViewerContext,
    services::{account_service::NON_FIELD, FormErrors},
    urls,
};

pub fn signup_page(vc: &ViewerContext, username: &str, full_name: &str, errors: &FormErrors) -> String {
    let body = format!(
        "<h1>Sign up</h1>\n<form method=\"post\" action=\"{action}\">\n{username_errors}  <label for=\"id_username\">Username</label>\n  <input type=\"text\" name=\"username\" id=\"id_username\" value=\"{username}\" maxlength=\"150\" required>\n  <label for=\"id_full_name\">Full name</label>\n  <input type=\"text\" name=\"full_name\" id=\"id_full_name\" value=\"{full_name}\">\n{password_errors}  <label for=\"id_password\">Password</label>\n  <input type=\"password\" name=\"password\" id=\"id_password\" required>\n  <button type=\"submit\">Sign up</button>\n</form>\n",
        action = urls::SIGNUP,
        username_errors = field_errors(errors, "username"),
        username = escape_html(username),
        full_name = escape_html(full_name),
        password_errors = field_errors(errors, "password"),
    );
    layout(vc, "Sign up", &body)
}

pub fn login_page(vc: &ViewerContext, username: &str, next: Option<&str>, errors: &FormErrors) -> String {
    let next_input = next
        .map(|next| format!("  <input type=\"hidden\" name=\"next\" value=\"{}\">\n", escape_html(next)))
        .unwrap_or_default();
    let body = format!(
        "<h1>Log in</h1>\n<form method=\"post\" action=\"{action}\">\n{general}{username_errors}  <label for=\"id_username\">Username</label>\n  <input type=\"text\" name=\"username\" id=\"id_username\" value=\"{username}\" required>\n{password_errors}  <label for=\"id_password\">Password</label>\n  <input type=\"password\" name=\"password\" id=\"id_password\" required>\n{next_input}  <button type=\"submit\">Log in</button>\n</form>\n<p><a href=\"{signup}\">Create an account</a></p>\n",
        action = urls::LOGIN,
        general = field_errors(errors, NON_FIELD),
        username_errors = field_errors(errors, "username"),
        username = escape_html(username),
        password_errors = field_errors(errors, "password"),
        next_input = next_input,
        signup = urls::SIGNUP,
    );
    layout(vc, "Log in", &body)
}

pub fn logged_out_page(vc: &ViewerContext) -> String {
    let body = format!(
        "<h1>You have logged out</h1>\n<p><a href=\"{}\">Log in again</a></p>\n",
        urls::LOGIN
    );
    layout(vc, "Logged out", &body)
}
