//! Per-bubble rendering decisions derived from the message list.
//!
//! Nothing here is stored: the plan is recomputed from the list on every
//! render, so edits and deletes can never leave stale grouping behind.

use mockchat_store::{
    DEFAULT_IMAGE_DIMENSIONS, ImageDimensions, ImageSize, Message, MessageId,
    PORTRAIT_IMAGE_DIMENSIONS, Side,
};
use serde::{Deserialize, Serialize};

/// Longest text (in characters) that still shares a row with its time.
pub const SHORT_MESSAGE_MAX_CHARS: usize = 25;

const TIGHT_GAP_POINTS: f32 = 1.0;
const REGULAR_GAP_POINTS: f32 = 2.0;
const WIDE_GAP_POINTS: f32 = 8.0;
const BUBBLE_RADIUS_POINTS: f32 = 8.0;
const FLATTENED_RADIUS_POINTS: f32 = 2.0;

/// Layout constants, overridable from the profile settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub short_message_max_chars: usize,
    pub portrait_image_width: u32,
    pub portrait_image_height: u32,
    pub default_image_width: u32,
    pub default_image_height: u32,
    pub tight_gap: f32,
    pub regular_gap: f32,
    pub wide_gap: f32,
    pub bubble_radius: f32,
    pub flattened_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            short_message_max_chars: SHORT_MESSAGE_MAX_CHARS,
            portrait_image_width: PORTRAIT_IMAGE_DIMENSIONS.width,
            portrait_image_height: PORTRAIT_IMAGE_DIMENSIONS.height,
            default_image_width: DEFAULT_IMAGE_DIMENSIONS.width,
            default_image_height: DEFAULT_IMAGE_DIMENSIONS.height,
            tight_gap: TIGHT_GAP_POINTS,
            regular_gap: REGULAR_GAP_POINTS,
            wide_gap: WIDE_GAP_POINTS,
            bubble_radius: BUBBLE_RADIUS_POINTS,
            flattened_radius: FLATTENED_RADIUS_POINTS,
        }
    }
}

impl LayoutConfig {
    pub fn portrait_image(&self) -> ImageDimensions {
        ImageDimensions::new(self.portrait_image_width, self.portrait_image_height)
    }

    pub fn default_image(&self) -> ImageDimensions {
        ImageDimensions::new(self.default_image_width, self.default_image_height)
    }

    pub fn gap_points(&self, gap: Gap) -> f32 {
        match gap {
            Gap::Tight => self.tight_gap,
            Gap::Regular => self.regular_gap,
            Gap::Wide => self.wide_gap,
        }
    }

    /// Radius of the bubble's outer-bottom corner.
    pub fn outer_corner_radius(&self, corner: BubbleCorner) -> f32 {
        match corner {
            BubbleCorner::Tail(_) => self.bubble_radius,
            BubbleCorner::Flattened => self.flattened_radius,
        }
    }
}

/// How text and time share a text bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// Text and time on one row, pushed apart.
    Inline,
    /// Time under the text, right-aligned.
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailSide {
    Left,
    Right,
}

impl TailSide {
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Receiver => Self::Left,
            Side::Sender => Self::Right,
        }
    }
}

/// Outer-bottom corner treatment of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleCorner {
    Tail(TailSide),
    /// Reduced radius so the bubble merges with the next one of its run.
    Flattened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    /// Text continuing an image from the same side.
    Tight,
    Regular,
    /// Sender/receiver transition.
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDisplay {
    Fixed(ImageDimensions),
    /// Default box; the image keeps its native aspect ratio inside it.
    Native(ImageDimensions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    pub display: ImageDisplay,
    pub show_caption: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleBody {
    Text(TextLayout),
    Image(ImageLayout),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleLayout {
    pub message_id: MessageId,
    pub side: Side,
    pub body: BubbleBody,
    pub last_in_run: bool,
    pub corner: BubbleCorner,
    pub margin_top: Gap,
    pub margin_bottom: Gap,
}

/// True when `index` ends its run: it is the final message or the next one
/// comes from the other side.
pub fn is_last_in_run(messages: &[Message], index: usize) -> bool {
    match (messages.get(index), messages.get(index + 1)) {
        (Some(current), Some(next)) => current.is_received != next.is_received,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// `None` for image messages, whose caption has its own rules.
pub fn text_layout(message: &Message, config: &LayoutConfig) -> Option<TextLayout> {
    if message.is_image() {
        return None;
    }

    if message.text.chars().count() <= config.short_message_max_chars {
        Some(TextLayout::Inline)
    } else {
        Some(TextLayout::Stacked)
    }
}

pub fn image_display(size: ImageSize, config: &LayoutConfig) -> ImageDisplay {
    match size {
        ImageSize::Portrait => ImageDisplay::Fixed(config.portrait_image()),
        ImageSize::Original => ImageDisplay::Native(config.default_image()),
    }
}

pub fn image_layout(message: &Message, config: &LayoutConfig) -> Option<ImageLayout> {
    let size = message.image_size()?;
    Some(ImageLayout {
        display: image_display(size, config),
        show_caption: !message.text.trim().is_empty(),
    })
}

pub fn top_gap(messages: &[Message], index: usize) -> Gap {
    let (Some(previous), Some(current)) = (
        index.checked_sub(1).and_then(|prev| messages.get(prev)),
        messages.get(index),
    ) else {
        return Gap::Regular;
    };

    if previous.is_received != current.is_received {
        Gap::Wide
    } else if previous.is_image() && !current.is_image() {
        Gap::Tight
    } else {
        Gap::Regular
    }
}

pub fn bottom_gap(messages: &[Message], index: usize) -> Gap {
    match (messages.get(index), messages.get(index + 1)) {
        (Some(current), Some(next)) if current.is_received != next.is_received => Gap::Wide,
        _ => Gap::Regular,
    }
}

pub fn plan_bubble(
    messages: &[Message],
    index: usize,
    config: &LayoutConfig,
) -> Option<BubbleLayout> {
    let message = messages.get(index)?;
    let body = match image_layout(message, config) {
        Some(image) => BubbleBody::Image(image),
        None => BubbleBody::Text(text_layout(message, config)?),
    };
    let last_in_run = is_last_in_run(messages, index);
    let corner = if last_in_run {
        BubbleCorner::Tail(TailSide::for_side(message.side()))
    } else {
        BubbleCorner::Flattened
    };

    Some(BubbleLayout {
        message_id: message.id.clone(),
        side: message.side(),
        body,
        last_in_run,
        corner,
        margin_top: top_gap(messages, index),
        margin_bottom: bottom_gap(messages, index),
    })
}

pub fn plan_bubbles(messages: &[Message], config: &LayoutConfig) -> Vec<BubbleLayout> {
    (0..messages.len())
        .filter_map(|index| plan_bubble(messages, index, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use mockchat_store::MessageContent;

    use super::*;

    fn text(id: &str, side: Side, body: &str) -> Message {
        Message {
            id: MessageId::new(id),
            text: body.to_string(),
            is_received: side.is_received(),
            time: "9:41 AM".to_string(),
            content: MessageContent::Text,
        }
    }

    fn image(id: &str, side: Side, size: ImageSize, caption: &str) -> Message {
        Message {
            content: MessageContent::Image {
                uri: format!("file:///{id}.jpg"),
                size,
            },
            ..text(id, side, caption)
        }
    }

    #[test]
    fn only_the_last_message_of_a_run_gets_the_tail() {
        let messages = vec![
            text("a", Side::Sender, "one"),
            text("b", Side::Sender, "two"),
            text("c", Side::Receiver, "three"),
        ];

        assert!(!is_last_in_run(&messages, 0));
        assert!(is_last_in_run(&messages, 1));
        assert!(is_last_in_run(&messages, 2));
        assert!(!is_last_in_run(&messages, 3));

        let plan = plan_bubbles(&messages, &LayoutConfig::default());
        assert_eq!(plan[0].corner, BubbleCorner::Flattened);
        assert_eq!(plan[1].corner, BubbleCorner::Tail(TailSide::Right));
        assert_eq!(plan[2].corner, BubbleCorner::Tail(TailSide::Left));
    }

    #[test]
    fn short_layout_boundary_is_twenty_five_characters() {
        let config = LayoutConfig::default();
        let at_limit = text("a", Side::Sender, &"x".repeat(25));
        let over_limit = text("b", Side::Sender, &"x".repeat(26));

        assert_eq!(text_layout(&at_limit, &config), Some(TextLayout::Inline));
        assert_eq!(text_layout(&over_limit, &config), Some(TextLayout::Stacked));
    }

    #[test]
    fn short_layout_counts_characters_not_bytes() {
        let config = LayoutConfig::default();
        let accented = text("a", Side::Sender, &"é".repeat(25));
        assert_eq!(text_layout(&accented, &config), Some(TextLayout::Inline));
    }

    #[test]
    fn threshold_follows_configuration() {
        let config = LayoutConfig {
            short_message_max_chars: 3,
            ..LayoutConfig::default()
        };
        let message = text("a", Side::Sender, "four");
        assert_eq!(text_layout(&message, &config), Some(TextLayout::Stacked));
    }

    #[test]
    fn whitespace_caption_is_hidden() {
        let config = LayoutConfig::default();
        let blank = image("a", Side::Sender, ImageSize::Original, "  ");
        let captioned = image("b", Side::Sender, ImageSize::Original, "ok");

        assert_eq!(image_layout(&blank, &config).map(|layout| layout.show_caption), Some(false));
        assert_eq!(
            image_layout(&captioned, &config).map(|layout| layout.show_caption),
            Some(true)
        );
        assert!(text_layout(&blank, &config).is_none());
    }

    #[test]
    fn portrait_images_get_a_fixed_box() {
        let config = LayoutConfig::default();
        assert_eq!(
            image_display(ImageSize::Portrait, &config),
            ImageDisplay::Fixed(ImageDimensions::new(245, 340))
        );
        assert_eq!(
            image_display(ImageSize::Original, &config),
            ImageDisplay::Native(ImageDimensions::new(250, 290))
        );
    }

    #[test]
    fn captionless_image_still_carries_the_tail() {
        let messages = vec![image("a", Side::Receiver, ImageSize::Portrait, "")];
        let plan = plan_bubbles(&messages, &LayoutConfig::default());

        assert_eq!(
            plan[0].body,
            BubbleBody::Image(ImageLayout {
                display: ImageDisplay::Fixed(ImageDimensions::new(245, 340)),
                show_caption: false,
            })
        );
        assert_eq!(plan[0].corner, BubbleCorner::Tail(TailSide::Left));
    }

    #[test]
    fn text_after_same_side_image_is_pulled_up() {
        let messages = vec![
            image("a", Side::Sender, ImageSize::Original, ""),
            text("b", Side::Sender, "look at this"),
            text("c", Side::Receiver, "nice"),
            image("d", Side::Receiver, ImageSize::Original, ""),
            text("e", Side::Sender, "right?"),
        ];

        assert_eq!(top_gap(&messages, 0), Gap::Regular);
        assert_eq!(top_gap(&messages, 1), Gap::Tight);
        assert_eq!(top_gap(&messages, 2), Gap::Wide);
        assert_eq!(top_gap(&messages, 3), Gap::Regular);
        // Side change wins over the image continuation rule.
        assert_eq!(top_gap(&messages, 4), Gap::Wide);

        assert_eq!(bottom_gap(&messages, 0), Gap::Regular);
        assert_eq!(bottom_gap(&messages, 1), Gap::Wide);
        assert_eq!(bottom_gap(&messages, 4), Gap::Regular);
    }

    #[test]
    fn corner_radius_follows_tail_state() {
        let config = LayoutConfig::default();
        assert_eq!(config.outer_corner_radius(BubbleCorner::Flattened), 2.0);
        assert_eq!(
            config.outer_corner_radius(BubbleCorner::Tail(TailSide::Left)),
            8.0
        );
        assert_eq!(config.gap_points(Gap::Wide), 8.0);
    }

    #[test]
    fn empty_list_has_an_empty_plan() {
        assert!(plan_bubbles(&[], &LayoutConfig::default()).is_empty());
    }
}
