//! Server-rendered HTML views
//!
//! Templates are compiled into the binary and rendered with tera. Each view
//! handler delegates to the same services the JSON API uses.

pub mod handlers;

use anyhow::{Context as _, anyhow};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::core::ShopError;

pub use handlers::{ViewState, view_routes};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("home.html", include_str!("../../templates/home.html")),
    (
        "realtime_products.html",
        include_str!("../../templates/realtime_products.html"),
    ),
    ("products.html", include_str!("../../templates/products.html")),
    ("product.html", include_str!("../../templates/product.html")),
    ("cart.html", include_str!("../../templates/cart.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Compiled template set
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("money", money);
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("failed to compile view templates")?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<Html<String>, ShopError> {
        self.tera
            .render(template, context)
            .map(Html)
            .map_err(|e| ShopError::Internal(anyhow!("failed to render {}: {:?}", template, e)))
    }

    /// Turn a view result into a response, rendering failures as an error page
    pub fn respond(&self, result: Result<Html<String>, ShopError>) -> Response {
        match result {
            Ok(html) => html.into_response(),
            Err(err) => self.error_page(err),
        }
    }

    fn error_page(&self, err: ShopError) -> Response {
        let status = err.status_code();
        if let ShopError::Internal(source) = &err {
            tracing::error!(error = ?source, "view failed with internal error");
        }

        let mut context = Context::new();
        context.insert("status", &status.as_u16());
        context.insert("message", &err.to_string());

        match self.tera.render("error.html", &context) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = ?e, "failed to render error page");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// `{{ price | money }}`: a number with exactly two decimals
fn money(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("money expects a number, got {}", value)))?;
    Ok(Value::String(format!("{:.2}", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProductDraft;

    #[test]
    fn test_templates_compile() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_home_renders_products() {
        let views = Views::new().unwrap();
        let product = ProductDraft {
            title: Some("Trail Shoe".to_string()),
            description: Some("Grippy".to_string()),
            code: Some("SH-01".to_string()),
            price: Some(89.5),
            category: Some("shoes".to_string()),
            ..Default::default()
        }
        .into_product()
        .unwrap();

        let mut context = Context::new();
        context.insert("products", &vec![product]);
        let Html(body) = views.render("home.html", &context).unwrap();

        assert!(body.contains("Trail Shoe"));
        assert!(body.contains("$89.50"));
        assert!(body.contains("<a href=\"/products\">Catalog</a>"));
    }

    #[test]
    fn test_money_filter_pads_to_cents() {
        let none = HashMap::new();
        assert_eq!(money(&Value::from(89.5), &none).unwrap(), "89.50");
        assert_eq!(money(&Value::from(12), &none).unwrap(), "12.00");
        assert!(money(&Value::from("cheap"), &none).is_err());
    }

    #[test]
    fn test_error_page_carries_status() {
        let views = Views::new().unwrap();
        let response = views.respond(Err(ShopError::product_not_found(uuid::Uuid::nil())));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
