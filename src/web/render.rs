//! HTML rendering with `minijinja` over templates embedded in the binary.
//!
//! Templates end in `.html`, which turns on HTML auto-escaping for every
//! interpolated value.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{Environment, Value, context};
use rust_embed::RustEmbed;
use serde::Serialize;

use super::{AppError, auth::CurrentUser};
use crate::models::network::subnet_mask;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_loader(|name| {
            Ok(TemplateAssets::get(name)
                .map(|file| String::from_utf8_lossy(&file.data).into_owned()))
        });
        env.add_filter("mask", |bits: i32| subnet_mask(bits).unwrap_or_default());
        env
    })
}

pub fn render(name: &str, ctx: impl Serialize) -> Result<Html<String>, AppError> {
    let template = environment().get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

/// Renders a page for a signed-in user; the layout shows the navigation bar.
pub fn page(user: &CurrentUser, name: &str, ctx: Value) -> Result<Response, AppError> {
    page_with_status(user, StatusCode::OK, name, ctx)
}

pub fn page_with_status(
    user: &CurrentUser,
    status: StatusCode,
    name: &str,
    ctx: Value,
) -> Result<Response, AppError> {
    let html = render(name, context! { current_user => user.username.as_str(), ..ctx })?;
    Ok((status, html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_embedded() {
        for name in ["base.html", "login.html", "error.html", "disp_form.html"] {
            assert!(TemplateAssets::get(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(
            "error.html",
            context! { status => 400, reason => "Bad Request", message => "<script>x</script>" },
        )
        .unwrap();
        assert!(!html.0.contains("<script>x"));
        assert!(html.0.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_mask_filter() {
        let out = environment()
            .render_str("{{ 24|mask }}", context! {})
            .unwrap();
        assert_eq!(out, "255.255.255.0");
    }
}
