use std::path::Path;

use crate::{
    assets::loader::{AssetLoader, LoadRequest},
    catalog::AssetList,
};

/// Index into the image list, moving from 0 up to `len` (terminal).
#[derive(Clone, Debug)]
pub struct PlaylistCursor {
    images: AssetList,
    position: usize,
}

impl PlaylistCursor {
    pub fn new(images: AssetList) -> Self {
        Self {
            images,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.position)
    }

    pub fn peek_next(&self) -> Option<&Path> {
        self.images.get(self.position + 1)
    }

    pub fn is_final(&self) -> bool {
        !self.images.is_empty() && self.position == self.images.len() - 1
    }

    pub fn is_second_to_last(&self) -> bool {
        self.images.len() >= 2 && self.position == self.images.len() - 2
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.images.len()
    }

    /// Request the current and following images; used once when a run starts.
    pub fn prime(&self, loader: &mut dyn AssetLoader) {
        for index in [self.position, self.position + 1] {
            self.request(index, loader);
        }
    }

    /// Move one step and prefetch the image after the new position. No-op past the end.
    pub fn advance(&mut self, loader: &mut dyn AssetLoader) {
        if self.is_finished() {
            return;
        }
        self.position += 1;
        self.request(self.position + 1, loader);
    }

    /// Ask for the image at `index` if it exists.
    pub fn request(&self, index: usize, loader: &mut dyn AssetLoader) {
        if let Some(path) = self.images.get(index) {
            loader.request(LoadRequest {
                index,
                path: path.to_path_buf(),
            });
        }
    }
}
