//! Page data model: decorative nodes and the named things the engine touches.
//!
//! Nothing here has persisted identity. Decorations live as long as their
//! node on the page; groups and targets are names the [`Surface`] resolves.
//!
//! [`Surface`]: crate::surface::Surface

use serde::{Deserialize, Serialize};

/// Container a decoration is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Background hearts (`.hearts-container`)
    Hearts,
    /// Confetti burst pieces (`.confetti-container`)
    Confetti,
    /// Hearts inside the secret modal (`.floating-hearts-small`)
    ModalHearts,
}

impl Layer {
    /// Whether nodes in this layer carry the `heart` class.
    pub fn is_heart_layer(self) -> bool {
        matches!(self, Layer::Hearts | Layer::ModalHearts)
    }
}

/// A named collection of page elements with per-member reveal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Message paragraphs and the signature
    Messages,
    /// Timeline entries
    Timeline,
    /// Quality cards
    Qualities,
    /// Song lyric lines
    Lyrics,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Messages, Group::Timeline, Group::Qualities, Group::Lyrics];
}

/// A single named element the engine writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Modal,
    Title,
    Body,
    PlayingIndicator,
    Progress,
    PlayIcon,
    MuteIcon,
    VolumeSlider,
    SongTitle,
    PhotoFrame(usize),
    SocialButton(usize),
}

/// Shape of a decorative node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Heart,
    Circle,
    Square,
}

/// Horizontal offset of a decorative node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Offset {
    /// Percentage of viewport width (`vw`)
    Viewport(f64),
    /// Percentage of the containing block (`%`)
    Percent(f64),
}

impl Offset {
    pub fn css(&self) -> String {
        match self {
            Offset::Viewport(v) => format!("{}vw", v),
            Offset::Percent(p) => format!("{}%", p),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Offset::Viewport(v) | Offset::Percent(v) => *v,
        }
    }
}

/// How a decoration's animation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Iteration {
    /// Loops forever (`infinite`)
    Infinite,
    /// Runs once and holds the final frame (`forwards`)
    Forwards,
}

/// A transient decorative element: a heart or a confetti piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub shape: Shape,
    pub left: Offset,
    /// Width and height in pixels
    pub size: f64,
    pub color: String,
    /// CSS keyframes name
    pub animation: String,
    /// Animation duration in seconds
    pub duration: f64,
    /// Animation delay in seconds
    pub delay: f64,
    pub iteration: Iteration,
}

impl Decoration {
    /// Animation duration in whole milliseconds, rounded up.
    pub fn duration_ms(&self) -> u64 {
        (self.duration * 1000.0).ceil().max(0.0) as u64
    }

    /// CSS class the node carries.
    pub fn class_name(&self) -> &'static str {
        match self.shape {
            Shape::Heart => "heart",
            Shape::Circle | Shape::Square => "confetti",
        }
    }

    /// Inline style declarations for this decoration, in application order.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let iteration = match self.iteration {
            Iteration::Infinite => "infinite",
            Iteration::Forwards => "forwards",
        };
        let mut decls = vec![
            ("left", self.left.css()),
            ("width", format!("{}px", self.size)),
            ("height", format!("{}px", self.size)),
            ("animation", format!("{} {}s linear {}", self.animation, self.duration, iteration)),
            ("animation-delay", format!("{}s", self.delay)),
        ];
        match self.shape {
            Shape::Heart => {
                if let Offset::Percent(_) = self.left {
                    decls.push(("position", "absolute".to_string()));
                }
                decls.push(("color", self.color.clone()));
            }
            Shape::Circle => {
                decls.push(("background", self.color.clone()));
                decls.push(("border-radius", "50%".to_string()));
            }
            Shape::Square => {
                decls.push(("background", self.color.clone()));
                decls.push(("border-radius", "0".to_string()));
            }
        }
        decls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confetti(shape: Shape) -> Decoration {
        Decoration {
            shape,
            left: Offset::Viewport(42.5),
            size: 7.0,
            color: "#d23669".to_string(),
            animation: "floatUp".to_string(),
            duration: 2.5,
            delay: 0.0,
            iteration: Iteration::Forwards,
        }
    }

    #[test]
    fn test_duration_ms_rounds_up() {
        let mut d = confetti(Shape::Circle);
        assert_eq!(d.duration_ms(), 2500);
        d.duration = 2.0001;
        assert_eq!(d.duration_ms(), 2001);
    }

    #[test]
    fn test_confetti_css() {
        let decls = confetti(Shape::Circle).css_declarations();
        assert!(decls.contains(&("left", "42.5vw".to_string())));
        assert!(decls.contains(&("animation", "floatUp 2.5s linear forwards".to_string())));
        assert!(decls.contains(&("border-radius", "50%".to_string())));
        assert!(decls.contains(&("background", "#d23669".to_string())));

        let square = confetti(Shape::Square).css_declarations();
        assert!(square.contains(&("border-radius", "0".to_string())));
    }

    #[test]
    fn test_modal_heart_is_absolutely_positioned() {
        let heart = Decoration {
            shape: Shape::Heart,
            left: Offset::Percent(22.0),
            size: 12.0,
            color: "#ff6b93".to_string(),
            animation: "float".to_string(),
            duration: 6.0,
            delay: 0.3,
            iteration: Iteration::Infinite,
        };
        let decls = heart.css_declarations();
        assert!(decls.contains(&("left", "22%".to_string())));
        assert!(decls.contains(&("position", "absolute".to_string())));
        assert!(decls.contains(&("color", "#ff6b93".to_string())));
        assert_eq!(heart.class_name(), "heart");
    }

    #[test]
    fn test_heart_layers() {
        assert!(Layer::Hearts.is_heart_layer());
        assert!(Layer::ModalHearts.is_heart_layer());
        assert!(!Layer::Confetti.is_heart_layer());
    }
}
