//! Flag catalog and typed flag snapshot.
//!
//! The flag service is a black-box key to value lookup. Every key the site
//! reads is listed in [`FlagKey`] together with its default, and
//! [`GameFlags`] is the typed view of one evaluation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::visitor::VipStatus;

/// Default responsible-gaming banner message.
pub const DEFAULT_RESPONSIBLE_GAMING_MESSAGE: &str =
    "We are committed to promoting safe and responsible gaming practices.";

/// Default responsible-gaming banner link.
pub const DEFAULT_RESPONSIBLE_GAMING_LINK_URL: &str = "https://www.begambleaware.org/";

/// A/B test arm for call-to-action styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiVariant {
    #[default]
    Control,
    Bold,
}

impl UiVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Bold => "bold",
        }
    }
}

/// Visual theme under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Classic,
    Neon,
}

impl ThemeName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Neon => "neon",
        }
    }
}

/// Closed catalog of flags read by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    Vip,
    UiVariant,
    Theme,
    SpinCost,
    RtpTarget,
    DailyBonus,
    ConfettiOnWin,
    SpinCta,
    RngSeed,
    ShowResponsibleGamingBanner,
    ResponsibleGamingMessage,
    ResponsibleGamingLinkUrl,
    HeroTitle,
    HeroSubtitle,
    HeroPrimaryCta,
}

impl FlagKey {
    /// Every catalog entry.
    pub const ALL: [Self; 15] = [
        Self::Vip,
        Self::UiVariant,
        Self::Theme,
        Self::SpinCost,
        Self::RtpTarget,
        Self::DailyBonus,
        Self::ConfettiOnWin,
        Self::SpinCta,
        Self::RngSeed,
        Self::ShowResponsibleGamingBanner,
        Self::ResponsibleGamingMessage,
        Self::ResponsibleGamingLinkUrl,
        Self::HeroTitle,
        Self::HeroSubtitle,
        Self::HeroPrimaryCta,
    ];

    /// Key as known to the flag service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vip => "vip-gaming-experience",
            Self::UiVariant => "ui.variant",
            Self::Theme => "theme.name",
            Self::SpinCost => "economy.spinCost",
            Self::RtpTarget => "economy.rtpTarget",
            Self::DailyBonus => "features.dailyBonus",
            Self::ConfettiOnWin => "features.confettiOnWin",
            Self::SpinCta => "copy.spinCta",
            Self::RngSeed => "rng.seedFromFlag",
            Self::ShowResponsibleGamingBanner => "market.showResponsibleGamingBanner",
            Self::ResponsibleGamingMessage => "market.responsibleGamingMessage",
            Self::ResponsibleGamingLinkUrl => "market.responsibleGamingLinkUrl",
            Self::HeroTitle => "copy.heroTitle",
            Self::HeroSubtitle => "copy.heroSubtitle",
            Self::HeroPrimaryCta => "copy.heroPrimaryCta",
        }
    }

    /// Read this flag from a set of evaluated values.
    ///
    /// Returns `default` when the key is missing or its value does not
    /// deserialize as `T`.
    #[must_use]
    pub fn read<T: DeserializeOwned>(self, values: &Map<String, Value>, default: T) -> T {
        values
            .get(self.as_str())
            .and_then(|value| T::deserialize(value).ok())
            .unwrap_or(default)
    }
}

/// Typed snapshot of one flag evaluation.
///
/// `Default` yields the documented default of every catalog entry, which is
/// what the site renders when the flag service is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFlags {
    #[serde(rename = "vip-gaming-experience")]
    pub vip_experience: VipStatus,
    #[serde(rename = "ui.variant")]
    pub ui_variant: UiVariant,
    #[serde(rename = "theme.name")]
    pub theme: ThemeName,
    #[serde(rename = "economy.spinCost")]
    pub spin_cost: f64,
    #[serde(rename = "economy.rtpTarget")]
    pub rtp_target: f64,
    #[serde(rename = "features.dailyBonus")]
    pub daily_bonus: bool,
    #[serde(rename = "features.confettiOnWin")]
    pub confetti_on_win: bool,
    #[serde(rename = "copy.spinCta")]
    pub spin_cta: String,
    #[serde(rename = "rng.seedFromFlag")]
    pub rng_seed: String,
    #[serde(rename = "market.showResponsibleGamingBanner")]
    pub show_responsible_gaming_banner: bool,
    #[serde(rename = "market.responsibleGamingMessage")]
    pub responsible_gaming_message: String,
    #[serde(rename = "market.responsibleGamingLinkUrl")]
    pub responsible_gaming_link_url: String,
    #[serde(rename = "copy.heroTitle")]
    pub hero_title: String,
    #[serde(rename = "copy.heroSubtitle")]
    pub hero_subtitle: String,
    #[serde(rename = "copy.heroPrimaryCta")]
    pub hero_primary_cta: String,
}

impl Default for GameFlags {
    fn default() -> Self {
        Self {
            vip_experience: VipStatus::None,
            ui_variant: UiVariant::Control,
            theme: ThemeName::Classic,
            spin_cost: 10.0,
            rtp_target: 0.92,
            daily_bonus: true,
            confetti_on_win: true,
            spin_cta: "Spin Now".to_string(),
            rng_seed: String::new(),
            show_responsible_gaming_banner: true,
            responsible_gaming_message: DEFAULT_RESPONSIBLE_GAMING_MESSAGE.to_string(),
            responsible_gaming_link_url: DEFAULT_RESPONSIBLE_GAMING_LINK_URL.to_string(),
            hero_title: String::new(),
            hero_subtitle: String::new(),
            hero_primary_cta: String::new(),
        }
    }
}

impl GameFlags {
    /// Build a snapshot from evaluated values, key by key.
    ///
    /// A missing or mistyped value only affects its own key.
    #[must_use]
    pub fn from_values(values: &Map<String, Value>) -> Self {
        let d = Self::default();
        Self {
            vip_experience: FlagKey::Vip.read(values, d.vip_experience),
            ui_variant: FlagKey::UiVariant.read(values, d.ui_variant),
            theme: FlagKey::Theme.read(values, d.theme),
            spin_cost: FlagKey::SpinCost.read(values, d.spin_cost),
            rtp_target: FlagKey::RtpTarget.read(values, d.rtp_target),
            daily_bonus: FlagKey::DailyBonus.read(values, d.daily_bonus),
            confetti_on_win: FlagKey::ConfettiOnWin.read(values, d.confetti_on_win),
            spin_cta: FlagKey::SpinCta.read(values, d.spin_cta),
            rng_seed: FlagKey::RngSeed.read(values, d.rng_seed),
            show_responsible_gaming_banner: FlagKey::ShowResponsibleGamingBanner
                .read(values, d.show_responsible_gaming_banner),
            responsible_gaming_message: FlagKey::ResponsibleGamingMessage
                .read(values, d.responsible_gaming_message),
            responsible_gaming_link_url: FlagKey::ResponsibleGamingLinkUrl
                .read(values, d.responsible_gaming_link_url),
            hero_title: FlagKey::HeroTitle.read(values, d.hero_title),
            hero_subtitle: FlagKey::HeroSubtitle.read(values, d.hero_subtitle),
            hero_primary_cta: FlagKey::HeroPrimaryCta.read(values, d.hero_primary_cta),
        }
    }

    #[must_use]
    pub const fn is_vip(&self) -> bool {
        self.vip_experience.is_vip()
    }
}
