use std::time::Duration;

use crate::{
    assets::{AssetLoader, LoadCompletion},
    config::{FadeInCompletion, GroupingConfig, PanConfig, ShowConfig, TimingConfig},
    foundation::{
        core::{ALPHA_MAX, TickRate, Viewport, millis},
        error::ShowResult,
    },
    pan::{PanAngleSequencer, PanRequest, PanState},
    playlist::PlaylistCursor,
    render::{DrawList, SlotDraw},
    transition::{
        phase::{Phase, PhaseChange},
        profile::TimingProfile,
        slot::{Slot, SlotRole},
    },
};

/// The single, configuration-driven presentation machine.
///
/// Owns the two slots and all per-run counters. Drive it with [`TransitionMachine::start`] once,
/// then [`TransitionMachine::step`] once per tick with a monotonically increasing `now`.
#[derive(Debug)]
pub struct TransitionMachine {
    timing: TimingConfig,
    pan_cfg: PanConfig,
    grouping: Option<GroupingConfig>,
    viewport: Viewport,
    tick_rate: TickRate,
    sequencer: PanAngleSequencer,
    bias_sign: f64,
    len: usize,

    phase: Phase,
    phase_started: Duration,
    /// Start of the current image's cycle: run start, rotation or group skip.
    cycle_started: Duration,
    profile: TimingProfile,
    group_count: u32,
    current: Slot,
    next: Slot,
}

impl TransitionMachine {
    pub fn new(config: &ShowConfig) -> ShowResult<Self> {
        let sequencer = PanAngleSequencer::new(&config.pan.angles)?;
        Ok(Self {
            timing: config.timing.clone(),
            pan_cfg: config.pan.clone(),
            grouping: config.grouping.clone(),
            viewport: config.viewport,
            tick_rate: config.tick_rate,
            sequencer,
            bias_sign: 1.0,
            len: 0,
            phase: Phase::FadeIn,
            phase_started: Duration::ZERO,
            cycle_started: Duration::ZERO,
            profile: TimingProfile::for_position(0, 1, &config.timing, config.tick_rate),
            group_count: 0,
            current: Slot::empty(),
            next: Slot::empty(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_ended()
    }

    pub fn current(&self) -> &Slot {
        &self.current
    }

    pub fn next(&self) -> &Slot {
        &self.next
    }

    pub fn profile(&self) -> &TimingProfile {
        &self.profile
    }

    /// Images shown since the last group boundary.
    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Bind the slots to the cursor's first two images, request them and begin `FadeIn`.
    pub fn start(
        &mut self,
        now: Duration,
        cursor: &mut PlaylistCursor,
        loader: &mut dyn AssetLoader,
    ) {
        self.len = cursor.len();
        self.group_count = 0;
        if cursor.is_finished() {
            tracing::warn!("no images to show");
            self.phase = Phase::Ended;
            return;
        }

        cursor.prime(loader);
        self.bind_slots(cursor);
        self.assign_pan(SlotRole::Current);
        self.phase = Phase::FadeIn;
        self.phase_started = now;
        self.cycle_started = now;
        tracing::debug!(images = self.len, profile = ?self.profile.kind, "transition machine started");
    }

    /// Advance one tick. Returns the phase transition taken, if any.
    pub fn step(
        &mut self,
        now: Duration,
        cursor: &mut PlaylistCursor,
        loader: &mut dyn AssetLoader,
    ) -> Option<PhaseChange> {
        self.drain(loader);
        if self.phase.is_ended() {
            return None;
        }

        let in_phase = millis(now.saturating_sub(self.phase_started));
        let in_cycle = millis(now.saturating_sub(self.cycle_started));
        let step = self.profile.alpha_step;
        let showcase = self.current.is_static() && self.next.index().is_some();

        let to = match self.phase {
            Phase::FadeIn => {
                self.current.ramp_up(step);
                let done = match self.timing.fade_in_completion {
                    FadeInCompletion::Alpha => self.current.alpha() >= ALPHA_MAX,
                    FadeInCompletion::Elapsed => in_phase >= self.profile.fade_ms,
                };
                if done {
                    self.current.set_alpha(ALPHA_MAX);
                    self.assign_pan(SlotRole::Next);
                    Some(Phase::SecondImageFadeIn)
                } else {
                    None
                }
            }
            Phase::SecondImageFadeIn => {
                if showcase {
                    self.current.ramp_down(step);
                } else {
                    self.current.set_alpha(ALPHA_MAX);
                }
                self.next.ramp_up(step);
                (self.next.alpha() >= ALPHA_MAX).then_some(Phase::CrossfadePlay)
            }
            Phase::CrossfadePlay => {
                self.current
                    .set_alpha(if showcase { 0.0 } else { ALPHA_MAX });
                self.next.set_alpha(ALPHA_MAX);
                if in_cycle >= self.profile.display_ms * self.display_multiplier() {
                    self.group_count += 1;
                    if self.group_boundary_reached(cursor) {
                        Some(Phase::AllFadeOut)
                    } else {
                        Some(Phase::CrossfadeOut)
                    }
                } else {
                    None
                }
            }
            Phase::CrossfadeOut => {
                self.current.ramp_down(step);
                if cursor.is_final() {
                    self.next.ramp_down(step);
                    if self.current.alpha() <= 0.0 && self.next.alpha() <= 0.0 {
                        Some(Phase::Pause)
                    } else {
                        None
                    }
                } else {
                    self.next.set_alpha(ALPHA_MAX);
                    if self.current.alpha() <= 0.0 {
                        self.rotate(now, cursor, loader);
                        Some(Phase::FadeIn)
                    } else {
                        None
                    }
                }
            }
            Phase::AllFadeOut => self.step_all_fade_out(now, in_phase, cursor, loader),
            Phase::Pause => {
                if in_phase >= self.profile.pause_ms {
                    cursor.advance(loader);
                    self.current.rebind(None);
                    self.next.rebind(None);
                    tracing::info!(at_ms = millis(now), "slideshow ended");
                    Some(Phase::Ended)
                } else {
                    None
                }
            }
            Phase::Ended => None,
        };

        if !matches!(self.phase, Phase::Pause | Phase::Ended) {
            self.current.advance_pan();
            if self.phase.shows_next() {
                self.next.advance_pan();
            }
        }

        to.map(|to| self.enter(to, now, cursor))
    }

    /// Store finished loads in whichever slot is still bound to their index.
    pub fn drain(&mut self, loader: &mut dyn AssetLoader) {
        for completion in loader.poll() {
            self.accept(completion);
        }
    }

    pub fn accept(&mut self, completion: LoadCompletion) {
        let LoadCompletion {
            index,
            path,
            result,
        } = completion;
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(index, path = %path.display(), error = %err, "image failed to load, slot keeps its previous contents");
                return;
            }
        };

        let role = if self.current.accept(index, image.clone()) {
            SlotRole::Current
        } else if self.next.accept(index, image) {
            SlotRole::Next
        } else {
            tracing::debug!(index, "dropping stale image completion");
            return;
        };
        tracing::trace!(index, ?role, "image ready");
        self.refresh_pan(role);
    }

    /// Slots to composite for the current tick, current first.
    pub fn draw_list(&self) -> DrawList {
        let mut list = DrawList::new(self.viewport);
        if self.phase.is_ended() {
            return list;
        }
        list.slots.extend(SlotDraw::from_slot(
            SlotRole::Current,
            &self.current,
            self.viewport,
        ));
        if self.phase.shows_next() && self.next.index().is_some() {
            list.slots
                .extend(SlotDraw::from_slot(SlotRole::Next, &self.next, self.viewport));
        }
        list
    }

    fn enter(&mut self, to: Phase, now: Duration, cursor: &PlaylistCursor) -> PhaseChange {
        let from = self.phase;
        self.phase = to;
        self.phase_started = now;
        tracing::debug!(?from, ?to, position = cursor.position(), "phase change");
        PhaseChange {
            at_ms: millis(now),
            from,
            to,
            position: cursor.position(),
        }
    }

    fn step_all_fade_out(
        &mut self,
        now: Duration,
        in_phase: f64,
        cursor: &mut PlaylistCursor,
        loader: &mut dyn AssetLoader,
    ) -> Option<Phase> {
        let Some(grouping) = &self.grouping else {
            return Some(Phase::CrossfadeOut);
        };
        let (grace_ms, floor_ms) = (grouping.grace_ms as f64, grouping.floor_ms as f64);

        if in_phase >= grace_ms {
            let step = self.profile.alpha_step;
            self.current.ramp_down(step);
            self.next.ramp_down(step);
        }
        let black = self.current.alpha() <= 0.0 && self.next.alpha() <= 0.0;
        if !(black && in_phase >= floor_ms) {
            return None;
        }

        cursor.advance(loader);
        cursor.advance(loader);
        tracing::info!(position = cursor.position(), "group finished, skipping past its last image");
        self.group_count = 0;
        self.bind_slots(cursor);
        self.assign_pan(SlotRole::Current);
        self.assign_pan(SlotRole::Next);
        self.cycle_started = now;
        Some(Phase::FadeIn)
    }

    /// `next` becomes `current` with its alpha, image and drift; `next` is rebound to the
    /// following index.
    fn rotate(&mut self, now: Duration, cursor: &mut PlaylistCursor, loader: &mut dyn AssetLoader) {
        cursor.advance(loader);
        let position = cursor.position();
        self.current = std::mem::take(&mut self.next);
        self.next
            .rebind(cursor.peek_next().map(|_| position + 1));
        self.profile = self.profile_at(position);
        self.cycle_started = now;
        tracing::info!(position, profile = ?self.profile.kind, "rotated to next image");
    }

    fn bind_slots(&mut self, cursor: &PlaylistCursor) {
        let position = cursor.position();
        self.current.rebind(cursor.current().map(|_| position));
        self.next.rebind(cursor.peek_next().map(|_| position + 1));
        self.profile = self.profile_at(position);
    }

    fn profile_at(&self, index: usize) -> TimingProfile {
        TimingProfile::for_position(index, self.len, &self.timing, self.tick_rate)
    }

    fn display_multiplier(&self) -> f64 {
        let lead = match &self.grouping {
            Some(g) if self.group_count == 0 => g.lead_multiplier,
            _ => 1.0,
        };
        self.timing.display_multiplier * lead
    }

    /// A boundary only applies while two more images exist to skip into.
    fn group_boundary_reached(&self, cursor: &PlaylistCursor) -> bool {
        let Some(g) = &self.grouping else {
            return false;
        };
        if self.group_count < g.group_size {
            return false;
        }
        if cursor.position() + 2 >= self.len {
            tracing::debug!(position = cursor.position(), "group boundary too close to the end, crossfading instead");
            return false;
        }
        true
    }

    /// Pick a direction for a slot. Each assignment to `next` flips the horizontal bias sign.
    fn assign_pan(&mut self, role: SlotRole) {
        let index = match role {
            SlotRole::Current => self.current.index(),
            SlotRole::Next => self.next.index(),
        };
        let Some(index) = index else {
            return;
        };

        let angle = self.sequencer.next_angle();
        if role == SlotRole::Next {
            self.bias_sign = -self.bias_sign;
        }
        let on_screen_ms = self.profile_at(index).on_screen_ms();
        let still = self.pan_cfg.still_first_image && index == 0;
        let bias = self.bias_sign * self.pan_cfg.alternate_bias;

        let slot = match role {
            SlotRole::Current => &mut self.current,
            SlotRole::Next => &mut self.next,
        };
        let req = PanRequest {
            angle,
            bias,
            still,
            on_screen_ms,
            image: slot.ready_dimensions(),
        };
        let pan = PanState::derive(&req, &self.pan_cfg, self.viewport, self.tick_rate);
        tracing::trace!(index, ?role, angle, bias, "pan assigned");
        slot.set_pan(req, pan);
    }

    /// Re-derive drift with real image dimensions while the slot is still invisible.
    fn refresh_pan(&mut self, role: SlotRole) {
        let slot = match role {
            SlotRole::Current => &mut self.current,
            SlotRole::Next => &mut self.next,
        };
        if slot.alpha() > 0.0 {
            return;
        }
        let Some(req) = slot.pan_request().copied() else {
            return;
        };
        if req.image.is_some() {
            return;
        }
        let req = PanRequest {
            image: slot.ready_dimensions(),
            ..req
        };
        let pan = PanState::derive(&req, &self.pan_cfg, self.viewport, self.tick_rate);
        slot.set_pan(req, pan);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/machine.rs"]
mod tests;
