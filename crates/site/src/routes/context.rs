//! Visitor context route handlers.
//!
//! Each mutation answers with the refreshed controls fragment and an
//! `HX-Trigger: userContextChanged` header, which makes the hero and banner
//! on the same page re-fetch themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tracing::instrument;

use omni_core::{Country, VisitorContext};

use crate::context::session::VisitorStore;
use crate::error::add_breadcrumb;

/// Client-side event raised after the visitor context changed.
pub const CONTEXT_CHANGED_EVENT: &str = "userContextChanged";

/// Segment and country controls display data.
#[derive(Debug, Clone)]
pub struct ContextControlsView {
    pub is_vip: bool,
    pub country: &'static str,
}

impl From<&VisitorContext> for ContextControlsView {
    fn from(context: &VisitorContext) -> Self {
        Self {
            is_vip: context.is_vip(),
            country: context.country.code(),
        }
    }
}

/// Segment and country controls fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/context_controls.html")]
pub struct ContextControlsTemplate {
    pub controls: ContextControlsView,
}

/// Country form data.
#[derive(Debug, Deserialize)]
pub struct CountryForm {
    pub country: Country,
}

fn changed(context: &VisitorContext) -> impl IntoResponse + use<> {
    (
        AppendHeaders([("HX-Trigger", CONTEXT_CHANGED_EVENT)]),
        ContextControlsTemplate {
            controls: ContextControlsView::from(context),
        },
    )
}

/// Switch the visitor to the VIP segment.
#[instrument(skip(store))]
pub async fn become_vip(store: VisitorStore) -> impl IntoResponse {
    let context = store.become_vip().await;
    add_breadcrumb("context", "Became VIP", &[("country", context.country.code())]);
    changed(&context)
}

/// Switch the visitor to the regular segment.
#[instrument(skip(store))]
pub async fn become_regular(store: VisitorStore) -> impl IntoResponse {
    let context = store.become_regular().await;
    add_breadcrumb(
        "context",
        "Became regular",
        &[("country", context.country.code())],
    );
    changed(&context)
}

/// Set the visitor's country.
#[instrument(skip(store))]
pub async fn set_country(store: VisitorStore, Form(form): Form<CountryForm>) -> impl IntoResponse {
    let context = store.set_country(form.country).await;
    add_breadcrumb("context", "Country set", &[("country", context.country.code())]);
    changed(&context)
}
