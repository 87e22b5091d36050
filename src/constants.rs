//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Node sizing constants
pub mod node {
    /// Base width a node starts from before widgets widen it
    pub const BASE_WIDTH: f32 = 140.0;

    /// Height of the title bar
    pub const TITLE_HEIGHT: f32 = 24.0;

    /// Height of one widget row
    pub const WIDGET_ROW_HEIGHT: f32 = 22.0;

    /// Padding below the last widget row
    pub const BODY_PADDING: f32 = 6.0;

    /// Approximate width of one label character, used for natural-size estimates
    pub const CHAR_WIDTH: f32 = 7.0;

    /// Horizontal padding reserved around a widget label
    pub const WIDGET_PADDING: f32 = 24.0;

    /// Horizontal bias applied to the natural width so widget labels
    /// have breathing room
    pub const WIDTH_BIAS: f32 = 1.5;

    /// Spacing between ports along a node edge
    pub const PORT_SPACING: f32 = 30.0;
}

/// Image preview constants
pub mod preview {
    /// Nodes shorter than this grow when images arrive
    pub const GROW_THRESHOLD: f32 = 100.0;

    /// Fixed height a node grows to when it first shows images
    pub const PREVIEW_HEIGHT: f32 = 250.0;

    /// Side length of the square overlay controls in the focused view
    pub const CONTROL_SIZE: f32 = 30.0;

    /// Margin between the preview area and the node border
    pub const AREA_MARGIN: f32 = 4.0;
}
