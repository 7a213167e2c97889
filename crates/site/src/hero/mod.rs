//! Hero banner presentation.
//!
//! The hero shows one of two fixed slide sets (regular or VIP), picked from
//! the `vip-gaming-experience` flag, with copy overrides and CTA styling
//! driven by further flags.
//!
//! Every rendered page owns a [`HeroMount`]: the carousel index, the
//! auto-advance timer and the exposure bookkeeping for that page. Mounts are
//! kept in [`HeroMounts`] and addressed by id from the page's HTMX requests.

pub mod autoplay;
pub mod carousel;
pub mod mount;
pub mod registry;
pub mod slides;
pub mod view;

pub use autoplay::AutoAdvance;
pub use carousel::Carousel;
pub use mount::{HeroMount, Navigation};
pub use registry::HeroMounts;
pub use slides::{HeroSlide, REGULAR_SLIDES, VIP_SLIDES, slides_for};
pub use view::{HeroView, SlideIndicator};
