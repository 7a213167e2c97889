//! Render-ready hero content.

use uuid::Uuid;

use omni_core::{GameFlags, UiVariant};

use super::slides::{slide_at, slides_for};

/// CTA classes shared by both variants.
pub const CTA_BASE_CLASS: &str =
    "bg-gaming-gold hover:bg-gaming-gold/90 text-primary-foreground font-semibold px-8 py-4 text-lg";

/// Extra CTA classes for the `bold` variant.
pub const CTA_BOLD_CLASS: &str = "text-xl py-5 shadow-lg";

const VIP_CTA_TEXT: &str = "Explore VIP Features";
const REGULAR_CTA_TEXT: &str = "Learn more";

/// One slide indicator button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideIndicator {
    pub index: usize,
    pub active: bool,
}

/// Everything the hero template needs for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroView {
    pub mount_id: String,
    pub is_vip: bool,
    pub variant: &'static str,
    pub title: String,
    pub subtitle: String,
    pub description: &'static str,
    pub image: &'static str,
    pub cta_text: String,
    pub cta_class: String,
    pub content_padding: &'static str,
    pub indicators: Vec<SlideIndicator>,
    pub slide_count: usize,
    pub current: usize,
}

impl HeroView {
    /// Resolve content for slide `index` under the given flags.
    ///
    /// Copy overrides only apply when non-empty.
    #[must_use]
    pub fn resolve(mount_id: Uuid, flags: &GameFlags, index: usize) -> Self {
        let is_vip = flags.is_vip();
        let slide_count = slides_for(is_vip).len();
        let current = if index < slide_count { index } else { 0 };
        let slide = slide_at(is_vip, current);

        let default_cta = if is_vip { VIP_CTA_TEXT } else { REGULAR_CTA_TEXT };
        let cta_class = match flags.ui_variant {
            UiVariant::Bold => format!("{CTA_BASE_CLASS} {CTA_BOLD_CLASS}"),
            UiVariant::Control => CTA_BASE_CLASS.to_string(),
        };

        Self {
            mount_id: mount_id.to_string(),
            is_vip,
            variant: flags.ui_variant.as_str(),
            title: override_or(&flags.hero_title, slide.title),
            subtitle: override_or(&flags.hero_subtitle, slide.subtitle),
            description: slide.description,
            image: slide.image,
            cta_text: override_or(&flags.hero_primary_cta, default_cta),
            cta_class,
            content_padding: if is_vip { "pt-40" } else { "pt-32" },
            indicators: (0..slide_count)
                .map(|index| SlideIndicator {
                    index,
                    active: index == current,
                })
                .collect(),
            slide_count,
            current,
        }
    }
}

fn override_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
