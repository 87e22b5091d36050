//! Background image fetch + decode
//!
//! A batch covers every reference in a node's new output payload. All images
//! of a batch are fetched and decoded in parallel worker threads; the result
//! preserves order, with `None` in the slot of any image that failed. Results
//! come back over a channel the host drains once per frame, so decoding never
//! blocks a repaint. There is no explicit cancellation: a stale batch is
//! recognized by reference-sequence identity at commit time and discarded.

use crate::nodes::NodeId;
use crate::outputs::ImageRef;
use crossbeam_channel::{unbounded, Receiver, Sender};
use egui::{ColorImage, Vec2};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving or decoding one image
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read image data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded image ready for upload to the canvas
#[derive(Clone)]
pub struct DecodedImage {
    pub color: ColorImage,
}

impl DecodedImage {
    pub fn new(color: ColorImage) -> Self {
        Self { color }
    }

    pub fn width(&self) -> usize {
        self.color.size[0]
    }

    pub fn height(&self) -> usize {
        self.color.size[1]
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.color.size[0] as f32, self.color.size[1] as f32)
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Resolves an image reference to decoded pixels
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, image: &ImageRef) -> Result<DecodedImage, LoadError>;
}

/// Reads images from the server's output directory on disk, laid out as
/// `<root>/<subfolder>/<filename>`
pub struct FsImageFetcher {
    root: PathBuf,
}

impl FsImageFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for FsImageFetcher {
    fn fetch(&self, image: &ImageRef) -> Result<DecodedImage, LoadError> {
        let path = self.root.join(&image.subfolder).join(&image.filename);
        let bytes = std::fs::read(&path)?;
        let decoded = image::load_from_memory(&bytes)?.to_rgba8();
        let size = [decoded.width() as usize, decoded.height() as usize];
        Ok(DecodedImage::new(ColorImage::from_rgba_unmultiplied(
            size,
            decoded.as_raw(),
        )))
    }
}

/// One finished decode batch; `images` is index-aligned with `refs`
pub struct BatchResult {
    pub node: NodeId,
    pub refs: Arc<[ImageRef]>,
    pub images: Vec<Option<DecodedImage>>,
}

/// Hands decode batches to worker threads and collects their results
pub struct ImageLoader {
    fetcher: Arc<dyn ImageFetcher>,
    tx: Sender<BatchResult>,
    rx: Receiver<BatchResult>,
}

impl ImageLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (tx, rx) = unbounded();
        Self { fetcher, tx, rx }
    }

    /// Decode every reference of a batch concurrently; the result arrives on
    /// the poll channel once all of them settled
    pub fn submit(&self, node: NodeId, refs: Arc<[ImageRef]>) {
        debug!("decoding {} image(s) for node {node}", refs.len());
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let batch_refs = refs.clone();

        thread::spawn(move || {
            let workers: Vec<_> = batch_refs
                .iter()
                .cloned()
                .map(|image| {
                    let fetcher = fetcher.clone();
                    thread::spawn(move || match fetcher.fetch(&image) {
                        Ok(decoded) => Some(decoded),
                        Err(err) => {
                            warn!("failed to load {:?}: {err}", image.filename);
                            None
                        }
                    })
                })
                .collect();

            let images = workers
                .into_iter()
                .map(|worker| worker.join().unwrap_or_default())
                .collect();

            // The receiver may be gone on shutdown; nothing to do then
            let _ = tx.send(BatchResult {
                node,
                refs: batch_refs,
                images,
            });
        });
    }

    /// Everything that finished since the last poll; never blocks
    pub fn poll(&self) -> Vec<BatchResult> {
        self.rx.try_iter().collect()
    }

    /// Block up to `timeout` for one batch; used by hosts that want to drive
    /// decoding to completion outside a frame loop
    pub fn wait(&self, timeout: Duration) -> Option<BatchResult> {
        self.rx.recv_timeout(timeout).ok()
    }
}
