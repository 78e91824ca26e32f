use std::sync::Arc;

use crate::{
    assets::PreparedImage,
    foundation::core::{Point, Size, Viewport},
    pan::cover_size,
    transition::{Slot, SlotRole},
};

/// One image to composite this tick.
#[derive(Clone, Debug)]
pub struct SlotDraw {
    pub role: SlotRole,
    pub image: Arc<PreparedImage>,
    pub alpha: u8,
    /// Absolute centre in viewport pixels.
    pub center: Point,
    /// Cover-fit draw size, overscan included.
    pub size: Size,
}

impl SlotDraw {
    /// `None` when the slot holds no image or is fully transparent.
    pub fn from_slot(role: SlotRole, slot: &Slot, viewport: Viewport) -> Option<Self> {
        let image = slot.image()?;
        let alpha = slot.alpha_u8();
        if alpha == 0 {
            return None;
        }
        let pan = slot.pan();
        Some(Self {
            role,
            image: Arc::clone(image),
            alpha,
            center: viewport.center() + pan.offset,
            size: cover_size(viewport, Some(image.dimensions()), pan.overscan),
        })
    }
}

/// Everything the render surface needs for one frame, bottom layer first.
#[derive(Clone, Debug)]
pub struct DrawList {
    pub viewport: Viewport,
    pub slots: Vec<SlotDraw>,
}

impl DrawList {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            slots: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, role: SlotRole) -> Option<&SlotDraw> {
        self.slots.iter().find(|s| s.role == role)
    }
}
