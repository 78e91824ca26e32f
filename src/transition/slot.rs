use std::sync::Arc;

use crate::{
    assets::PreparedImage,
    foundation::core::{alpha_to_u8, clamp_alpha},
    pan::{PanRequest, PanState},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    Current,
    Next,
}

/// One of the two on-screen image holders.
///
/// A slot is *bound* to a playlist index and *holds* whatever image last loaded into it. The two
/// can disagree: the previous image stays until the bound index finishes loading.
#[derive(Clone, Debug)]
pub struct Slot {
    index: Option<usize>,
    image: Option<(usize, Arc<PreparedImage>)>,
    alpha: f64,
    pan: PanState,
    pan_request: Option<PanRequest>,
}

impl Slot {
    pub fn empty() -> Self {
        Self {
            index: None,
            image: None,
            alpha: 0.0,
            pan: PanState::cleared(),
            pan_request: None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn image(&self) -> Option<&Arc<PreparedImage>> {
        self.image.as_ref().map(|(_, img)| img)
    }

    /// Whether the held image belongs to the bound index.
    pub fn is_ready(&self) -> bool {
        matches!((&self.image, self.index), (Some((held, _)), Some(idx)) if *held == idx)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_u8(&self) -> u8 {
        alpha_to_u8(self.alpha)
    }

    pub fn pan(&self) -> &PanState {
        &self.pan
    }

    pub fn is_static(&self) -> bool {
        self.pan.is_static()
    }

    /// Dimensions of the bound index's image, when it has loaded.
    pub fn ready_dimensions(&self) -> Option<(u32, u32)> {
        if self.is_ready() {
            self.image().map(|img| img.dimensions())
        } else {
            None
        }
    }

    /// Bind to `index` (or nothing). Alpha and drift reset; the held image is kept.
    pub(crate) fn rebind(&mut self, index: Option<usize>) {
        self.index = index;
        self.alpha = 0.0;
        self.pan = PanState::cleared();
        self.pan_request = None;
    }

    /// Store a loaded image if it belongs to the bound index.
    pub(crate) fn accept(&mut self, index: usize, image: Arc<PreparedImage>) -> bool {
        if self.index != Some(index) {
            return false;
        }
        self.image = Some((index, image));
        true
    }

    pub(crate) fn set_pan(&mut self, req: PanRequest, pan: PanState) {
        self.pan_request = Some(req);
        self.pan = pan;
    }

    pub(crate) fn pan_request(&self) -> Option<&PanRequest> {
        self.pan_request.as_ref()
    }

    pub(crate) fn set_alpha(&mut self, a: f64) {
        self.alpha = clamp_alpha(a);
    }

    pub(crate) fn ramp_up(&mut self, step: f64) {
        self.set_alpha(self.alpha + step);
    }

    pub(crate) fn ramp_down(&mut self, step: f64) {
        self.set_alpha(self.alpha - step);
    }

    pub(crate) fn advance_pan(&mut self) {
        if self.index.is_some() {
            self.pan.advance();
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Arc<PreparedImage> {
        Arc::new(PreparedImage {
            width: 4,
            height: 2,
            pixels: vec![0; 4 * 2 * 4],
        })
    }

    #[test]
    fn accepts_only_the_bound_index() {
        let mut s = Slot::empty();
        s.rebind(Some(3));
        assert!(!s.accept(2, image()));
        assert!(s.image().is_none());
        assert!(s.accept(3, image()));
        assert!(s.is_ready());
        assert_eq!(s.ready_dimensions(), Some((4, 2)));
    }

    #[test]
    fn rebinding_keeps_the_previous_image_but_not_its_readiness() {
        let mut s = Slot::empty();
        s.rebind(Some(0));
        s.accept(0, image());
        s.set_alpha(255.0);
        s.rebind(Some(1));
        assert!(s.image().is_some());
        assert!(!s.is_ready());
        assert_eq!(s.ready_dimensions(), None);
        assert_eq!(s.alpha(), 0.0);
    }

    #[test]
    fn alpha_ramps_are_clamped() {
        let mut s = Slot::empty();
        s.ramp_up(200.0);
        s.ramp_up(200.0);
        assert_eq!(s.alpha(), 255.0);
        s.ramp_down(300.0);
        assert_eq!(s.alpha(), 0.0);
        assert_eq!(s.alpha_u8(), 0);
    }
}
