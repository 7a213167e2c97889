//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use omni_core::{GameFlags, ThemeName};

use crate::context::session::VisitorStore;
use crate::flags::resolve_flags;
use crate::hero::HeroView;
use crate::routes::context::ContextControlsView;
use crate::state::AppState;

/// Responsible-gaming banner display data.
#[derive(Debug, Clone)]
pub struct BannerView {
    pub show: bool,
    pub message: String,
    pub link_url: String,
}

impl From<&GameFlags> for BannerView {
    fn from(flags: &GameFlags) -> Self {
        Self {
            show: flags.show_responsible_gaming_banner,
            message: flags.responsible_gaming_message.clone(),
            link_url: flags.responsible_gaming_link_url.clone(),
        }
    }
}

/// Root class for the page theme.
const fn theme_class(theme: ThemeName) -> &'static str {
    match theme {
        ThemeName::Classic => "theme-classic",
        ThemeName::Neon => "theme-neon",
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub theme_class: &'static str,
    pub hero: HeroView,
    pub controls: ContextControlsView,
    pub banner: BannerView,
}

/// Responsible-gaming banner fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/responsible_gaming.html")]
pub struct BannerTemplate {
    pub banner: BannerView,
}

/// Display the home page.
///
/// Every render mounts a fresh hero for this page.
#[instrument(skip(state, store))]
pub async fn home(State(state): State<AppState>, store: VisitorStore) -> HomeTemplate {
    let context = store.current_context().await;
    let flags = resolve_flags(state.flags(), &context).await;

    let mount = state.hero_mounts().mount().await;
    mount.apply(&flags);

    HomeTemplate {
        theme_class: theme_class(flags.theme),
        hero: mount.view(&flags),
        controls: ContextControlsView::from(&context),
        banner: BannerView::from(&flags),
    }
}

/// Re-render the banner for the current visitor.
#[instrument(skip(state, store))]
pub async fn banner(State(state): State<AppState>, store: VisitorStore) -> BannerTemplate {
    let context = store.current_context().await;
    let flags = resolve_flags(state.flags(), &context).await;

    BannerTemplate {
        banner: BannerView::from(&flags),
    }
}
