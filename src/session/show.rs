use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    assets::AssetLoader,
    audio::{AudioLoopController, AudioPlayer},
    catalog::{Catalogs, MediaKind},
    config::ShowConfig,
    foundation::error::{ShowError, ShowResult},
    playlist::PlaylistCursor,
    render::DrawList,
    session::host::HostShell,
    transition::{PhaseChange, TransitionMachine},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Running,
    /// Reached the natural end; audio stopped and close requested.
    Finished,
    /// Terminated from outside before the end.
    Stopped,
}

/// One run of the slideshow.
///
/// Owns the playlist cursor, the transition machine and the audio loop, plus the loader, player
/// and host surfaces they talk to. The only state shared with the audio side is the `active` flag.
#[derive(Debug)]
pub struct SlideshowSession<L, P, H> {
    cursor: PlaylistCursor,
    machine: TransitionMachine,
    audio: AudioLoopController,
    loader: L,
    player: P,
    host: H,
    active: Arc<AtomicBool>,
    state: SessionState,
    close_sent: bool,
}

impl<L: AssetLoader, P: AudioPlayer, H: HostShell> SlideshowSession<L, P, H> {
    pub fn new(
        config: &ShowConfig,
        catalogs: Catalogs,
        loader: L,
        player: P,
        host: H,
    ) -> ShowResult<Self> {
        config.validate()?;
        if catalogs.images.is_empty() {
            return Err(ShowError::CatalogEmpty {
                kind: MediaKind::Image,
                dir: config.image_dir.clone(),
            });
        }

        let active = Arc::new(AtomicBool::new(true));
        Ok(Self {
            cursor: PlaylistCursor::new(catalogs.images),
            machine: TransitionMachine::new(config)?,
            audio: AudioLoopController::new(catalogs.audio, Arc::clone(&active)),
            loader,
            player,
            host,
            active,
            state: SessionState::Ready,
            close_sent: false,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, SessionState::Finished | SessionState::Stopped)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Handle another thread can clear to end the show at the next tick.
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    pub fn machine(&self) -> &TransitionMachine {
        &self.machine
    }

    pub fn cursor(&self) -> &PlaylistCursor {
        &self.cursor
    }

    pub fn audio(&self) -> &AudioLoopController {
        &self.audio
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_parts(self) -> (L, P, H) {
        (self.loader, self.player, self.host)
    }

    pub fn start(&mut self, now: Duration) {
        if self.state != SessionState::Ready {
            return;
        }
        tracing::info!(images = self.cursor.len(), "slideshow starting");
        self.machine.start(now, &mut self.cursor, &mut self.loader);
        self.audio.start(&mut self.player);
        self.audio.pump(now, &mut self.player);
        self.state = SessionState::Running;
        if self.machine.is_ended() {
            self.finish();
        }
    }

    /// One driving tick: audio events, then the image machine.
    pub fn tick(&mut self, now: Duration) -> Option<PhaseChange> {
        if !self.is_running() {
            return None;
        }
        if !self.is_active() {
            self.stop();
            return None;
        }

        self.audio.pump(now, &mut self.player);
        let change = self.machine.step(now, &mut self.cursor, &mut self.loader);
        if self.machine.is_ended() {
            self.finish();
        }
        change
    }

    pub fn draw_list(&self) -> DrawList {
        self.machine.draw_list()
    }

    /// Terminate from outside (window closed, interrupted). Audio stops; no close request is sent.
    pub fn stop(&mut self) {
        if self.is_done() {
            return;
        }
        self.active.store(false, Ordering::SeqCst);
        self.audio.stop(&mut self.player);
        self.state = SessionState::Stopped;
        tracing::info!(position = self.cursor.position(), "slideshow stopped");
    }

    /// Natural end: audio goes silent before the host is asked to close, exactly once.
    fn finish(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        self.audio.stop(&mut self.player);
        if !self.close_sent {
            self.close_sent = true;
            self.host.request_close();
        }
        self.state = SessionState::Finished;
        tracing::info!("slideshow finished");
    }
}
