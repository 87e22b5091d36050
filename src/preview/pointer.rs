//! Pointer-driven selection over thumbnail cells and focused-view controls
//!
//! A selection is a precise click: press and release must land on the same
//! cell at the same position. In the focused view two square controls overlay
//! the image when more than one exists; when a release qualifies for both,
//! the first control in declared order (cycle, then close) wins.

use crate::constants::preview::CONTROL_SIZE;
use egui::{Pos2, Rect, Vec2};

/// Overlay controls of the focused view, in declared (tie-break) order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Advances the selected index, wrapping past the end
    Cycle,
    /// Returns to the overview
    Close,
}

pub const CONTROLS: [Control; 2] = [Control::Cycle, Control::Close];

/// What the pointer was over when the press started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressTarget {
    Cell(usize),
    Control(Control),
}

/// Recorded at press time; a release only acts when it matches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressRecord {
    pub target: PressTarget,
    pub pos: Pos2,
}

/// Per-frame pointer snapshot handed in by the host canvas
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerFrame {
    pub pos: Option<Pos2>,
    /// Primary button went down this frame
    pub pressed: bool,
    /// Primary button is currently held
    pub down: bool,
    /// Primary button was released this frame
    pub released: bool,
}

impl PointerFrame {
    pub fn hovering(pos: Pos2) -> Self {
        Self {
            pos: Some(pos),
            ..Self::default()
        }
    }

    pub fn press(pos: Pos2) -> Self {
        Self {
            pos: Some(pos),
            pressed: true,
            down: true,
            released: false,
        }
    }

    pub fn release(pos: Pos2) -> Self {
        Self {
            pos: Some(pos),
            pressed: false,
            down: false,
            released: true,
        }
    }
}

/// First cell in layout order containing the pointer; at most one cell is
/// hovered per frame
pub fn hover_cell(rects: &[Rect], pos: Pos2) -> Option<usize> {
    rects.iter().position(|rect| rect.contains(pos))
}

/// Rectangle of one overlay control for the given displayed image: the cycle
/// control sits in the bottom-right corner, close in the top-right
pub fn control_rect(image: Rect, control: Control) -> Rect {
    let size = Vec2::splat(CONTROL_SIZE);
    match control {
        Control::Cycle => Rect::from_min_size(image.max - size, size),
        Control::Close => Rect::from_min_size(
            Pos2::new(image.max.x - CONTROL_SIZE, image.min.y),
            size,
        ),
    }
}

/// First control under the pointer, in declared order
pub fn hover_control(image: Rect, pos: Pos2) -> Option<Control> {
    CONTROLS
        .into_iter()
        .find(|control| control_rect(image, *control).contains(pos))
}
