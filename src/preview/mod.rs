//! Image previews inside node bodies
//!
//! Three behaviorally distinct states, derived from current data each frame:
//! no images, multi-image overview (packed thumbnail grid), and a focused
//! single image with overlay controls. New output payloads are detected by
//! reference-sequence identity, decoded off-frame, and adopted atomically
//! once every image settled.

pub mod grid;
pub mod loader;
pub mod pointer;

pub use grid::{fit_single, plan, GridLayout};
pub use loader::{
    BatchResult, DecodedImage, FsImageFetcher, ImageFetcher, ImageLoader, LoadError,
};
pub use pointer::{Control, PointerFrame, PressRecord, PressTarget};

use crate::engine::{Drawable, MenuAction, MenuContributor, MenuEntry, NodeLookup};
use crate::nodes::{GraphNode, NodeId};
use crate::outputs::{ImageRef, OutputStore};
use egui::{
    Align2, Color32, CornerRadius, FontId, Painter, Pos2, Rect, Stroke, StrokeKind,
    TextureHandle, TextureOptions, Vec2,
};
use log::debug;
use std::sync::Arc;

/// One displayable image together with the reference it was decoded from,
/// so a selection can still be opened at full size
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub image: DecodedImage,
    pub source: ImageRef,
}

/// Per-node preview state. Owned exclusively by its node instance and only
/// touched from that node's own draw/interaction callbacks.
#[derive(Default)]
pub struct PreviewState {
    /// Reference sequence whose decode was last requested; identity is
    /// compared against the output store to detect new data
    current_refs: Option<Arc<[ImageRef]>>,
    images: Vec<PreviewImage>,
    textures: Vec<Option<TextureHandle>>,
    /// Displayed rectangles, canvas space, refreshed every drawn frame
    pub image_rects: Vec<Rect>,
    /// Explicitly selected image, if any
    pub image_index: Option<usize>,
    /// Cell currently under the pointer in the overview
    pub over_index: Option<usize>,
    pointer_down: Option<PressRecord>,
    focused_rect: Option<Rect>,
    hovered_control: Option<Control>,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[PreviewImage] {
        &self.images
    }

    /// Selected index, with a singleton auto-selected: one image skips the
    /// overview even without a click
    pub fn effective_index(&self) -> Option<usize> {
        self.image_index
            .or_else(|| (self.images.len() == 1).then_some(0))
    }

    /// Index the context menu should open: the selection, else the hovered
    /// cell
    pub fn menu_index(&self) -> Option<usize> {
        self.effective_index().or(self.over_index)
    }

    pub fn hovered_control(&self) -> Option<Control> {
        self.hovered_control
    }

    pub fn press_target(&self) -> Option<PressTarget> {
        self.pointer_down.map(|record| record.target)
    }

    /// Compare the store's payload against the last-seen sequence and kick
    /// off a decode when it changed. Prior images keep rendering while the
    /// new batch is in flight.
    pub fn sync(&mut self, node: NodeId, store: &OutputStore, loader: &ImageLoader) {
        let latest = store.get(node).and_then(|output| output.images.clone());
        let unchanged = match (&self.current_refs, &latest) {
            (Some(previous), Some(new)) => Arc::ptr_eq(previous, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.current_refs = latest.clone();
        match latest {
            Some(refs) if !refs.is_empty() => loader.submit(node, refs),
            _ => self.clear_images(),
        }
    }

    /// Adopt a finished decode batch, unless it was superseded while in
    /// flight. Failed images are dropped from the displayable sequence; a
    /// batch with no survivors degrades to the no-images state.
    pub fn commit(&mut self, batch: BatchResult) -> bool {
        let still_current = self
            .current_refs
            .as_ref()
            .is_some_and(|refs| Arc::ptr_eq(refs, &batch.refs));
        if !still_current {
            debug!("discarding superseded decode batch for node {}", batch.node);
            return false;
        }

        let images: Vec<PreviewImage> = batch
            .refs
            .iter()
            .cloned()
            .zip(batch.images)
            .filter_map(|(source, decoded)| decoded.map(|image| PreviewImage { image, source }))
            .collect();

        self.textures = vec![None; images.len()];
        self.images = images;
        self.image_index = None;
        self.over_index = None;
        self.pointer_down = None;
        self.hovered_control = None;
        self.image_rects.clear();
        self.focused_rect = None;
        true
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
        self.textures.clear();
        self.image_rects.clear();
        self.image_index = None;
        self.over_index = None;
        self.pointer_down = None;
        self.hovered_control = None;
        self.focused_rect = None;
    }

    /// Advance hover/press/selection state from this frame's pointer
    /// snapshot. Returns true when something visible changed.
    pub fn handle_pointer(&mut self, frame: &PointerFrame) -> bool {
        let mut changed = false;

        let Some(pos) = frame.pos else {
            changed |= self.over_index.take().is_some();
            changed |= self.hovered_control.take().is_some();
            if frame.released {
                self.pointer_down = None;
            }
            return changed;
        };

        let count = self.images.len();
        if count == 0 {
            return changed;
        }

        match self.effective_index() {
            None => changed |= self.pointer_overview(pos, frame),
            Some(index) => changed |= self.pointer_focused(index, count, pos, frame),
        }
        changed
    }

    fn pointer_overview(&mut self, pos: Pos2, frame: &PointerFrame) -> bool {
        let mut changed = false;

        let over = pointer::hover_cell(&self.image_rects, pos);
        if over != self.over_index {
            self.over_index = over;
            changed = true;
        }

        if frame.pressed {
            if let Some(index) = over {
                self.pointer_down = Some(PressRecord {
                    target: PressTarget::Cell(index),
                    pos,
                });
            }
        }

        if frame.released {
            if let Some(record) = self.pointer_down.take() {
                // A precise click: same cell, same position as the press
                if let (PressTarget::Cell(pressed), Some(current)) = (record.target, over) {
                    if pressed == current && record.pos == pos {
                        self.image_index = Some(pressed);
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    fn pointer_focused(&mut self, index: usize, count: usize, pos: Pos2, frame: &PointerFrame) -> bool {
        let mut changed = false;

        if self.over_index.take().is_some() {
            changed = true;
        }

        // A lone image has no controls to hit
        let hovered = match (count > 1, self.focused_rect) {
            (true, Some(rect)) => pointer::hover_control(rect, pos),
            _ => None,
        };
        if hovered != self.hovered_control {
            self.hovered_control = hovered;
            changed = true;
        }

        if frame.pressed {
            if let Some(control) = hovered {
                self.pointer_down = Some(PressRecord {
                    target: PressTarget::Control(control),
                    pos,
                });
            }
        }

        if frame.released {
            if let Some(record) = self.pointer_down.take() {
                if let (PressTarget::Control(pressed), Some(current)) = (record.target, hovered) {
                    if pressed == current && record.pos == pos {
                        match pressed {
                            Control::Cycle => self.image_index = Some((index + 1) % count),
                            Control::Close => self.image_index = None,
                        }
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    #[cfg(test)]
    pub(crate) fn sync_refs_for_test(&mut self, refs: Arc<[ImageRef]>) {
        self.current_refs = Some(refs);
    }

    fn ensure_textures(&mut self, ctx: &egui::Context, node: NodeId) {
        for (i, slot) in self.textures.iter_mut().enumerate() {
            if slot.is_none() {
                if let Some(preview) = self.images.get(i) {
                    *slot = Some(ctx.load_texture(
                        format!("node-{node}-preview-{i}"),
                        preview.image.color.clone(),
                        TextureOptions::LINEAR,
                    ));
                }
            }
        }
    }
}

impl std::fmt::Debug for PreviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewState")
            .field("images", &self.images.len())
            .field("image_index", &self.image_index)
            .field("over_index", &self.over_index)
            .field("pointer_down", &self.pointer_down)
            .finish()
    }
}

/// Route finished decode batches to their nodes. Returns true when any node
/// adopted new images and the canvas should repaint.
pub fn pump_images(loader: &ImageLoader, nodes: &mut dyn NodeLookup) -> bool {
    let mut committed = false;
    for batch in loader.poll() {
        match nodes.node_mut(batch.node) {
            Some(node) => committed |= node.commit_images(batch),
            None => debug!("dropping decode batch for unknown node {}", batch.node),
        }
    }
    committed
}

const UV_FULL: Rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));

/// Image-preview capability, composed into every synthesized node type at
/// construction. All state lives on the node instance; this type is shared.
pub struct ImagePreview;

impl Drawable for ImagePreview {
    fn draw(&self, node: &mut GraphNode, painter: &Painter, pointer: &PointerFrame) -> bool {
        draw_preview(node, painter, pointer)
    }
}

impl MenuContributor for ImagePreview {
    fn contribute(&self, node: &GraphNode, entries: &mut Vec<MenuEntry>) {
        let state = &node.preview;
        if !state.has_images() {
            return;
        }
        let Some(index) = state.menu_index() else {
            return;
        };
        let Some(preview) = state.images().get(index) else {
            return;
        };
        entries.insert(
            0,
            MenuEntry {
                label: "Open Image".to_string(),
                action: MenuAction::OpenUrl(preview.source.view_url()),
            },
        );
    }
}

/// Draw the node's preview and advance its interaction state. Returns true
/// when the canvas should schedule another repaint.
pub fn draw_preview(node: &mut GraphNode, painter: &Painter, pointer: &PointerFrame) -> bool {
    if !node.preview.has_images() {
        return node.preview.handle_pointer(pointer);
    }

    let area = node.preview_area();
    if area.width() < 1.0 || area.height() < 1.0 {
        return false;
    }

    node.preview.ensure_textures(painter.ctx(), node.id);
    match node.preview.effective_index() {
        None => draw_overview(&mut node.preview, area, painter),
        Some(index) => draw_focused(&mut node.preview, area, painter, index),
    }
    node.preview.handle_pointer(pointer)
}

fn draw_overview(state: &mut PreviewState, area: Rect, painter: &Painter) {
    let sizes: Vec<Vec2> = state.images.iter().map(|p| p.image.size()).collect();
    let layout = grid::plan(area.size(), &sizes);
    state.image_rects = layout
        .rects
        .iter()
        .map(|rect| rect.translate(area.min.to_vec2()))
        .collect();
    state.focused_rect = None;

    for (i, rect) in state.image_rects.iter().enumerate() {
        if let Some(Some(texture)) = state.textures.get(i) {
            painter.image(texture.id(), *rect, UV_FULL, Color32::WHITE);
        }
        if state.over_index == Some(i) {
            let pressed = matches!(
                state.pointer_down,
                Some(PressRecord { target: PressTarget::Cell(j), .. }) if j == i
            );
            let stroke = if pressed {
                Stroke::new(2.0, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_gray(200))
            };
            painter.rect_stroke(*rect, CornerRadius::ZERO, stroke, StrokeKind::Inside);
        }
    }
}

fn draw_focused(state: &mut PreviewState, area: Rect, painter: &Painter, index: usize) {
    let Some(preview) = state.images.get(index) else {
        return;
    };
    let rect = grid::fit_single(area, preview.image.size());
    state.image_rects = vec![rect];
    state.focused_rect = Some(rect);

    if let Some(Some(texture)) = state.textures.get(index) {
        painter.image(texture.id(), rect, UV_FULL, Color32::WHITE);
    }

    let count = state.images.len();
    if count < 2 {
        return;
    }

    for control in pointer::CONTROLS {
        let control_rect = pointer::control_rect(rect, control);
        let hovered = state.hovered_control == Some(control);
        let pressed = hovered
            && matches!(
                state.pointer_down,
                Some(PressRecord { target: PressTarget::Control(c), .. }) if c == control
            );
        let fill = if pressed {
            Color32::from_black_alpha(220)
        } else if hovered {
            Color32::from_black_alpha(170)
        } else {
            Color32::from_black_alpha(110)
        };
        painter.rect_filled(control_rect, CornerRadius::ZERO, fill);

        let label = match control {
            Control::Cycle => format!("{}/{}", index + 1, count),
            Control::Close => "x".to_string(),
        };
        painter.text(
            control_rect.center(),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(12.0),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::ColorImage;

    fn decoded(w: usize, h: usize) -> DecodedImage {
        DecodedImage::new(ColorImage::new([w, h], Color32::BLACK))
    }

    fn state_with_images(n: usize) -> PreviewState {
        let refs: Arc<[ImageRef]> = (0..n)
            .map(|i| ImageRef::new(format!("img_{i}.png"), "", "output"))
            .collect::<Vec<_>>()
            .into();
        let mut state = PreviewState::new();
        state.current_refs = Some(refs.clone());
        state.commit(BatchResult {
            node: 1,
            refs,
            images: (0..n).map(|_| Some(decoded(64, 64))).collect(),
        });
        state
    }

    fn lay_out_overview(state: &mut PreviewState, area: Rect) {
        let sizes: Vec<Vec2> = state.images.iter().map(|p| p.image.size()).collect();
        let layout = grid::plan(area.size(), &sizes);
        state.image_rects = layout
            .rects
            .iter()
            .map(|rect| rect.translate(area.min.to_vec2()))
            .collect();
        state.focused_rect = None;
    }

    fn lay_out_focused(state: &mut PreviewState, area: Rect, index: usize) {
        let rect = grid::fit_single(area, state.images[index].image.size());
        state.image_rects = vec![rect];
        state.focused_rect = Some(rect);
    }

    const AREA: Rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(200.0, 200.0));

    #[test]
    fn singleton_is_auto_selected() {
        let state = state_with_images(1);
        assert_eq!(state.image_index, None);
        assert_eq!(state.effective_index(), Some(0));
    }

    #[test]
    fn click_on_cell_selects_it() {
        let mut state = state_with_images(4);
        lay_out_overview(&mut state, AREA);
        let target = state.image_rects[2].center();

        state.handle_pointer(&PointerFrame::press(target));
        state.handle_pointer(&PointerFrame::release(target));
        assert_eq!(state.image_index, Some(2));
    }

    #[test]
    fn drag_is_not_a_selection() {
        let mut state = state_with_images(4);
        lay_out_overview(&mut state, AREA);
        let press_at = state.image_rects[1].center();
        let release_at = press_at + Vec2::new(5.0, 0.0);

        state.handle_pointer(&PointerFrame::press(press_at));
        state.handle_pointer(&PointerFrame::release(release_at));
        assert_eq!(state.image_index, None);
    }

    #[test]
    fn hover_tracks_first_cell_under_pointer() {
        let mut state = state_with_images(4);
        lay_out_overview(&mut state, AREA);

        let changed = state.handle_pointer(&PointerFrame::hovering(state.image_rects[3].center()));
        assert!(changed);
        assert_eq!(state.over_index, Some(3));

        // Pointer leaving the node clears the hover
        let changed = state.handle_pointer(&PointerFrame::default());
        assert!(changed);
        assert_eq!(state.over_index, None);
    }

    #[test]
    fn cycle_control_wraps_past_the_end() {
        let mut state = state_with_images(3);
        state.image_index = Some(2);
        lay_out_focused(&mut state, AREA, 2);

        let target = pointer::control_rect(state.focused_rect.unwrap(), Control::Cycle).center();
        state.handle_pointer(&PointerFrame::press(target));
        state.handle_pointer(&PointerFrame::release(target));
        assert_eq!(state.image_index, Some(0));
    }

    #[test]
    fn close_control_returns_to_overview() {
        let mut state = state_with_images(3);
        state.image_index = Some(1);
        lay_out_focused(&mut state, AREA, 1);

        let target = pointer::control_rect(state.focused_rect.unwrap(), Control::Close).center();
        state.handle_pointer(&PointerFrame::press(target));
        state.handle_pointer(&PointerFrame::release(target));
        assert_eq!(state.image_index, None);
    }

    #[test]
    fn singleton_has_no_controls() {
        let mut state = state_with_images(1);
        lay_out_focused(&mut state, AREA, 0);

        let target = pointer::control_rect(state.focused_rect.unwrap(), Control::Close).center();
        state.handle_pointer(&PointerFrame::press(target));
        state.handle_pointer(&PointerFrame::release(target));
        assert_eq!(state.effective_index(), Some(0));
    }

    #[test]
    fn identical_payload_triggers_no_redecode() {
        let fetch_counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        struct CountingFetcher(Arc<std::sync::atomic::AtomicUsize>);
        impl ImageFetcher for CountingFetcher {
            fn fetch(&self, _image: &ImageRef) -> Result<DecodedImage, LoadError> {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(DecodedImage::new(ColorImage::new([4, 4], Color32::BLACK)))
            }
        }

        let loader = ImageLoader::new(Arc::new(CountingFetcher(fetch_counter.clone())));
        let mut store = OutputStore::new();
        let mut state = PreviewState::new();

        store.set(
            9,
            crate::outputs::NodeOutput::with_images(vec![ImageRef::new("a.png", "", "output")]),
        );
        state.sync(9, &store, &loader);
        let batch = loader.wait(std::time::Duration::from_secs(5)).unwrap();
        assert!(state.commit(batch));
        assert_eq!(fetch_counter.load(std::sync::atomic::Ordering::SeqCst), 1);

        // Same Arc redelivered: no new decode work
        state.sync(9, &store, &loader);
        assert!(loader.wait(std::time::Duration::from_millis(200)).is_none());
        assert_eq!(fetch_counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn partial_decode_failure_keeps_survivors() {
        let refs: Arc<[ImageRef]> = vec![
            ImageRef::new("ok_0.png", "", "output"),
            ImageRef::new("broken.png", "", "output"),
            ImageRef::new("ok_2.png", "", "output"),
        ]
        .into();

        let mut state = PreviewState::new();
        state.current_refs = Some(refs.clone());
        assert!(state.commit(BatchResult {
            node: 1,
            refs,
            images: vec![Some(decoded(8, 8)), None, Some(decoded(8, 8))],
        }));

        assert_eq!(state.image_count(), 2);
        assert_eq!(state.images()[0].source.filename, "ok_0.png");
        assert_eq!(state.images()[1].source.filename, "ok_2.png");
    }

    #[test]
    fn total_decode_failure_degrades_to_no_images() {
        let refs: Arc<[ImageRef]> = vec![ImageRef::new("broken.png", "", "output")].into();
        let mut state = PreviewState::new();
        state.current_refs = Some(refs.clone());
        state.commit(BatchResult {
            node: 1,
            refs,
            images: vec![None],
        });
        assert!(!state.has_images());
    }

    #[test]
    fn superseded_batch_is_discarded() {
        let mut state = state_with_images(2);
        let stale: Arc<[ImageRef]> = vec![ImageRef::new("old.png", "", "output")].into();
        assert!(!state.commit(BatchResult {
            node: 1,
            refs: stale,
            images: vec![Some(decoded(8, 8))],
        }));
        assert_eq!(state.image_count(), 2);
    }

    #[test]
    fn menu_prefers_selection_over_hover() {
        let mut state = state_with_images(3);
        state.over_index = Some(1);
        assert_eq!(state.menu_index(), Some(1));
        state.image_index = Some(2);
        assert_eq!(state.menu_index(), Some(2));
    }
}
