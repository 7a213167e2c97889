//! Built-in hero slide content.

/// Background image shared by every slide.
pub const HERO_IMAGE: &str = "/static/images/hero-gaming.jpg";

/// One hero slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroSlide {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub image: &'static str,
}

/// Slides shown to regular visitors.
pub static REGULAR_SLIDES: [HeroSlide; 2] = [
    HeroSlide {
        id: "slide1",
        title: "We are Demo1",
        subtitle: "Next level",
        description: "With 30 years' experience, Demo1 is a leader on the game of chance market. We offer a unique omnichannel experience based on a responsible approach.",
        image: HERO_IMAGE,
    },
    HeroSlide {
        id: "slide2",
        title: "Technology Platform",
        subtitle: "Gaming Excellence",
        description: "Drawing on experience from our own casinos, we offer comprehensive technology platforms for online gaming operations.",
        image: HERO_IMAGE,
    },
];

/// Slides shown to VIP visitors.
pub static VIP_SLIDES: [HeroSlide; 3] = [
    HeroSlide {
        id: "slide1",
        title: "Exclusive VIP Gaming",
        subtitle: "Elite Experience",
        description: "Welcome to your exclusive VIP gaming experience! Enjoy premium features, personalized service, and the highest level of gaming excellence with 30 years of industry expertise.",
        image: HERO_IMAGE,
    },
    HeroSlide {
        id: "slide2",
        title: "VIP Technology Platform",
        subtitle: "Premium Gaming Excellence",
        description: "Experience our cutting-edge VIP gaming platform designed for discerning players. Advanced features, enhanced rewards, and personalized gaming experiences await our VIP members.",
        image: HERO_IMAGE,
    },
    HeroSlide {
        id: "slide3",
        title: "VIP Member Benefits",
        subtitle: "Exclusive Rewards",
        description: "Unlock exclusive VIP benefits including priority support, enhanced bonuses, personalized gaming recommendations, and access to premium gaming content only available to VIP members.",
        image: HERO_IMAGE,
    },
];

/// The slide set for a segment. Sets are swapped wholesale, never merged.
#[must_use]
pub fn slides_for(vip: bool) -> &'static [HeroSlide] {
    if vip { &VIP_SLIDES } else { &REGULAR_SLIDES }
}

/// Slide `index` of a segment's set, or its first slide when out of range.
#[must_use]
pub fn slide_at(vip: bool, index: usize) -> &'static HeroSlide {
    let slides = slides_for(vip);
    slides
        .get(index)
        .or_else(|| slides.first())
        .unwrap_or(&REGULAR_SLIDES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_sizes() {
        assert_eq!(slides_for(false).len(), 2);
        assert_eq!(slides_for(true).len(), 3);
    }

    #[test]
    fn test_slide_at_out_of_range_falls_back_to_first() {
        assert_eq!(slide_at(false, 2).title, "We are Demo1");
        assert_eq!(slide_at(true, 2).title, "VIP Member Benefits");
        assert_eq!(slide_at(true, 9).title, "Exclusive VIP Gaming");
    }
}
