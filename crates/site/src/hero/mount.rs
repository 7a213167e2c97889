//! Per-page hero state.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use omni_core::{GameFlags, UiVariant};

use super::autoplay::AutoAdvance;
use super::carousel::Carousel;
use super::slides::{REGULAR_SLIDES, slides_for};
use super::view::HeroView;
use crate::tracking::Tracker;

/// A visitor-initiated slide change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    JumpTo(usize),
}

/// The hero of one rendered page.
///
/// Flags are applied on every request that renders the hero. Applying a
/// different slide-set size starts over at the first slide and re-arms the
/// auto-advance timer. Applying a different A/B variant than last time emits
/// an exposure event.
pub struct HeroMount {
    id: Uuid,
    period: Duration,
    tracker: Tracker,
    state: Mutex<MountState>,
    ticks: watch::Sender<usize>,
}

struct MountState {
    carousel: Carousel,
    variant: Option<UiVariant>,
    autoplay: Option<AutoAdvance>,
}

impl HeroMount {
    #[must_use]
    pub fn new(id: Uuid, period: Duration, tracker: Tracker) -> Arc<Self> {
        let (ticks, _) = watch::channel(0);
        Arc::new(Self {
            id,
            period,
            tracker,
            state: Mutex::new(MountState {
                carousel: Carousel::new(REGULAR_SLIDES.len()),
                variant: None,
                autoplay: None,
            }),
            ticks,
        })
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Receive the slide index after every auto-advance.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.ticks.subscribe()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.lock().carousel.index()
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.lock().carousel.len()
    }

    /// Apply freshly evaluated flags.
    ///
    /// Must be called from within a tokio runtime; the first call starts the
    /// auto-advance timer.
    pub fn apply(self: &Arc<Self>, flags: &GameFlags) {
        let vip = flags.is_vip();
        let variant = flags.ui_variant;

        let exposed = {
            let mut state = self.lock();
            let resized = state.carousel.resize(slides_for(vip).len());
            if resized || state.autoplay.is_none() {
                state.autoplay = Some(self.arm());
                tracing::debug!(mount = %self.id, slides = state.carousel.len(), "auto-advance armed");
            }
            state.variant.replace(variant) != Some(variant)
        };

        if exposed {
            self.tracker.hero_exposure(variant, vip);
        }
    }

    /// Move the carousel. Returns `false` if the request was ignored.
    pub fn navigate(&self, navigation: Navigation) -> bool {
        let mut state = self.lock();
        match navigation {
            Navigation::Next => state.carousel.next(),
            Navigation::Previous => state.carousel.previous(),
            Navigation::JumpTo(index) => return state.carousel.jump_to(index),
        }
        true
    }

    /// Content for the current slide.
    #[must_use]
    pub fn view(&self, flags: &GameFlags) -> HeroView {
        HeroView::resolve(self.id, flags, self.current_index())
    }

    pub fn cta_click(&self, flags: &GameFlags) {
        let vip = flags.is_vip();
        tracing::debug!(mount = %self.id, vip, "hero CTA clicked");
        self.tracker.hero_cta_click(flags.ui_variant, vip);
    }

    fn advance(&self) {
        let index = {
            let mut state = self.lock();
            state.carousel.next();
            state.carousel.index()
        };
        self.ticks.send_replace(index);
    }

    fn arm(self: &Arc<Self>) -> AutoAdvance {
        let mount = Arc::downgrade(self);
        AutoAdvance::start(self.period, move || {
            let Some(mount) = mount.upgrade() else {
                return ControlFlow::Break(());
            };
            mount.advance();
            ControlFlow::Continue(())
        })
    }

    fn lock(&self) -> MutexGuard<'_, MountState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HeroMount {
    fn drop(&mut self) {
        tracing::debug!(mount = %self.id, "hero unmounted");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use omni_core::VipStatus;

    use super::*;
    use crate::tracking::{EventSink, HERO_EXPOSURE, TrackedEvent};

    const PERIOD: Duration = Duration::from_secs(8);

    #[derive(Default)]
    struct Recorded(Mutex<Vec<TrackedEvent>>);

    impl EventSink for Recorded {
        fn track(&self, event: TrackedEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl Recorded {
        fn count(&self, name: &str) -> usize {
            self.0.lock().unwrap().iter().filter(|e| e.name == name).count()
        }
    }

    fn mount() -> (Arc<HeroMount>, Arc<Recorded>) {
        let sink = Arc::new(Recorded::default());
        let mount = HeroMount::new(Uuid::new_v4(), PERIOD, Tracker::new(sink.clone()));
        (mount, sink)
    }

    fn flags(vip: bool, variant: UiVariant) -> GameFlags {
        GameFlags {
            vip_experience: if vip { VipStatus::Vip } else { VipStatus::None },
            ui_variant: variant,
            ..GameFlags::default()
        }
    }

    async fn sleep_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_cycles() {
        let (mount, _) = mount();
        mount.apply(&flags(false, UiVariant::Control));

        sleep_secs(9).await;
        assert_eq!(mount.current_index(), 1);
        sleep_secs(8).await;
        assert_eq!(mount.current_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_segment_change_resets_and_rearms() {
        let (mount, _) = mount();
        mount.apply(&flags(false, UiVariant::Control));
        sleep_secs(12).await;
        assert_eq!(mount.current_index(), 1);

        mount.apply(&flags(true, UiVariant::Control));
        assert_eq!(mount.slide_count(), 3);
        assert_eq!(mount.current_index(), 0);

        // The old timer would have fired at t=16.
        sleep_secs(7).await;
        assert_eq!(mount.current_index(), 0);
        sleep_secs(2).await;
        assert_eq!(mount.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_segment_keeps_timer_and_index() {
        let (mount, _) = mount();
        mount.apply(&flags(true, UiVariant::Control));
        sleep_secs(5).await;
        mount.navigate(Navigation::JumpTo(2));
        mount.apply(&flags(true, UiVariant::Bold));
        assert_eq!(mount.current_index(), 2);

        sleep_secs(4).await;
        assert_eq!(mount.current_index(), 0);
    }

    #[tokio::test]
    async fn test_navigation() {
        let (mount, _) = mount();
        mount.apply(&flags(true, UiVariant::Control));

        assert!(mount.navigate(Navigation::Previous));
        assert_eq!(mount.current_index(), 2);
        assert!(mount.navigate(Navigation::Next));
        assert_eq!(mount.current_index(), 0);
        assert!(!mount.navigate(Navigation::JumpTo(3)));
        assert_eq!(mount.current_index(), 0);
        assert!(mount.navigate(Navigation::JumpTo(1)));
        assert_eq!(mount.view(&flags(true, UiVariant::Control)).title, "VIP Technology Platform");
    }

    #[tokio::test]
    async fn test_exposure_on_first_apply_and_variant_change() {
        let (mount, sink) = mount();

        mount.apply(&flags(false, UiVariant::Control));
        mount.apply(&flags(false, UiVariant::Control));
        mount.apply(&flags(true, UiVariant::Control));
        assert_eq!(sink.count(HERO_EXPOSURE), 1);

        mount.apply(&flags(true, UiVariant::Bold));
        mount.apply(&flags(false, UiVariant::Control));
        assert_eq!(sink.count(HERO_EXPOSURE), 3);
    }

    #[tokio::test]
    async fn test_cta_click_tracks_variant() {
        let (mount, sink) = mount();
        mount.cta_click(&flags(true, UiVariant::Bold));

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].properties["variant"], "bold");
        assert_eq!(events[0].properties["vip"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_published_until_dropped() {
        let (mount, _) = mount();
        let mut ticks = mount.subscribe();
        mount.apply(&flags(false, UiVariant::Control));

        ticks.changed().await.unwrap();
        assert_eq!(*ticks.borrow_and_update(), 1);

        drop(mount);
        assert!(ticks.changed().await.is_err());
    }
}
