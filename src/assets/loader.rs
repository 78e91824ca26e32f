use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    path::{Path, PathBuf},
    sync::{
        Arc,
        mpsc::{Receiver, Sender, channel},
    },
};

use crate::{
    assets::decode::{PreparedImage, read_image},
    foundation::error::{ShowError, ShowResult},
};

/// Turns a file into a ready-to-draw image.
pub type DecodeFn = fn(&Path) -> ShowResult<PreparedImage>;

/// Request to load the image at `index` of the image list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub index: usize,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub index: usize,
    pub path: PathBuf,
    pub result: ShowResult<Arc<PreparedImage>>,
}

/// Fire-and-forget image loading.
///
/// `request` returns immediately; results are collected with `poll` from the tick that owns the
/// slots. There is no cancellation: a superseded request still completes and the receiver decides
/// whether the result is still wanted.
pub trait AssetLoader {
    fn request(&mut self, req: LoadRequest);

    /// Drain every completion that arrived since the last call.
    fn poll(&mut self) -> Vec<LoadCompletion>;
}

/// Runs `decode`, reporting a panic inside the decoder as a load failure of that one file.
fn decode_guarded(decode: DecodeFn, path: &Path) -> ShowResult<Arc<PreparedImage>> {
    match catch_unwind(AssertUnwindSafe(|| decode(path))) {
        Ok(result) => result.map(Arc::new),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(path = %path.display(), %reason, "image decoder panicked");
            Err(ShowError::asset_load(format!(
                "decoder panicked on '{}': {reason}",
                path.display()
            )))
        }
    }
}

/// Decodes on the rayon global pool and reports back over a channel.
#[derive(Debug)]
pub struct PooledLoader {
    decode: DecodeFn,
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
}

impl PooledLoader {
    pub fn new() -> Self {
        Self::with_decoder(read_image)
    }

    pub fn with_decoder(decode: DecodeFn) -> Self {
        let (tx, rx) = channel();
        Self { decode, tx, rx }
    }
}

impl Default for PooledLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for PooledLoader {
    fn request(&mut self, req: LoadRequest) {
        let tx = self.tx.clone();
        let decode = self.decode;
        tracing::trace!(index = req.index, path = %req.path.display(), "queue image load");
        rayon::spawn(move || {
            let result = decode_guarded(decode, &req.path);
            // The receiver only goes away when the session is torn down.
            let _ = tx.send(LoadCompletion {
                index: req.index,
                path: req.path,
                result,
            });
        });
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        self.rx.try_iter().collect()
    }
}

/// Decodes synchronously inside `request`; completions are handed out on the next `poll`.
#[derive(Debug)]
pub struct InlineLoader {
    decode: DecodeFn,
    ready: Vec<LoadCompletion>,
}

impl InlineLoader {
    pub fn new() -> Self {
        Self::with_decoder(read_image)
    }

    pub fn with_decoder(decode: DecodeFn) -> Self {
        Self {
            decode,
            ready: Vec::new(),
        }
    }
}

impl Default for InlineLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for InlineLoader {
    fn request(&mut self, req: LoadRequest) {
        let result = decode_guarded(self.decode, &req.path);
        self.ready.push(LoadCompletion {
            index: req.index,
            path: req.path,
            result,
        });
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.ready)
    }
}

/// Never produces images; used for timing-only runs.
#[derive(Debug, Default)]
pub struct NullLoader {
    requested: Vec<usize>,
}

impl NullLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices requested so far, in order.
    pub fn requested(&self) -> &[usize] {
        &self.requested
    }
}

impl AssetLoader for NullLoader {
    fn request(&mut self, req: LoadRequest) {
        self.requested.push(req.index);
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        Vec::new()
    }
}
