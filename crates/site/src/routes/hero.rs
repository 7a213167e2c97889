//! Hero route handlers.
//!
//! A hero is addressed by the mount id it received when the page was
//! rendered. Every handler re-resolves flags for the current visitor and
//! applies them to the mount before rendering, so a segment change made in
//! the same tab shows up on the next hero request.

use std::convert::Infallible;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tracing::instrument;
use uuid::Uuid;

use omni_core::GameFlags;

use crate::context::session::VisitorStore;
use crate::error::{AppError, Result};
use crate::flags::resolve_flags;
use crate::hero::{HeroMount, HeroView, Navigation};
use crate::state::AppState;

/// SSE event name for auto-advance ticks.
pub const SLIDE_EVENT: &str = "slide";

/// Hero fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/hero.html")]
pub struct HeroFragmentTemplate {
    pub hero: HeroView,
}

async fn find_mount(state: &AppState, id: Uuid) -> Result<Arc<HeroMount>> {
    state
        .hero_mounts()
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("hero mount {id}")))
}

/// Look up the mount and apply the visitor's current flags to it.
async fn refresh(
    state: &AppState,
    store: &VisitorStore,
    id: Uuid,
) -> Result<(Arc<HeroMount>, GameFlags)> {
    let mount = find_mount(state, id).await?;
    let context = store.current_context().await;
    let flags = resolve_flags(state.flags(), &context).await;
    mount.apply(&flags);
    Ok((mount, flags))
}

async fn navigate(
    state: &AppState,
    store: &VisitorStore,
    id: Uuid,
    navigation: Navigation,
) -> Result<HeroFragmentTemplate> {
    let (mount, flags) = refresh(state, store, id).await?;
    if !mount.navigate(navigation) {
        tracing::debug!(mount = %id, ?navigation, "ignored slide navigation");
    }
    Ok(HeroFragmentTemplate {
        hero: mount.view(&flags),
    })
}

/// Re-render the hero with fresh flags.
#[instrument(skip(state, store))]
pub async fn show(
    State(state): State<AppState>,
    store: VisitorStore,
    Path(id): Path<Uuid>,
) -> Result<HeroFragmentTemplate> {
    let (mount, flags) = refresh(&state, &store, id).await?;
    Ok(HeroFragmentTemplate {
        hero: mount.view(&flags),
    })
}

#[instrument(skip(state, store))]
pub async fn next(
    State(state): State<AppState>,
    store: VisitorStore,
    Path(id): Path<Uuid>,
) -> Result<HeroFragmentTemplate> {
    navigate(&state, &store, id, Navigation::Next).await
}

#[instrument(skip(state, store))]
pub async fn previous(
    State(state): State<AppState>,
    store: VisitorStore,
    Path(id): Path<Uuid>,
) -> Result<HeroFragmentTemplate> {
    navigate(&state, &store, id, Navigation::Previous).await
}

/// Jump to a slide. Out-of-range indices leave the slide unchanged.
#[instrument(skip(state, store))]
pub async fn jump_to(
    State(state): State<AppState>,
    store: VisitorStore,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<HeroFragmentTemplate> {
    navigate(&state, &store, id, Navigation::JumpTo(index)).await
}

/// Record a CTA click.
#[instrument(skip(state, store))]
pub async fn cta(
    State(state): State<AppState>,
    store: VisitorStore,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let (mount, flags) = refresh(&state, &store, id).await?;
    mount.cta_click(&flags);
    Ok(StatusCode::NO_CONTENT)
}

/// Stream auto-advance ticks for a mount.
///
/// Each tick also marks the mount as used, so a page with an open stream is
/// never evicted. Closing the stream leaves the mount in place; the client
/// may reconnect until the mount idles out.
#[instrument(skip(state))]
pub async fn events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let ticks = find_mount(&state, id).await?.subscribe();
    let mounts = state.hero_mounts().clone();

    let stream = futures::stream::unfold((ticks, mounts), move |(mut ticks, mounts)| async move {
        ticks.changed().await.ok()?;
        if !mounts.touch(id).await {
            return None;
        }
        let index = *ticks.borrow_and_update();
        let event = Event::default().event(SLIDE_EVENT).data(index.to_string());
        Some((Ok::<_, Infallible>(event), (ticks, mounts)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Unmount a hero.
#[instrument(skip(state))]
pub async fn unmount(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if state.hero_mounts().unmount(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("hero mount {id}")))
    }
}
