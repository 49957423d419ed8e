// gallery.rs — 图片来源（文件夹 / 清单）与后台解码 -> egui 纹理

use image::GenericImageView;
use sphere_grid::ImageRecord;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];
/// 球面上的图片很小，解码后缩到此边长以内
const MAX_TEXTURE_EDGE: u32 = 1024;

/// Every image file in `dir`, sorted by name, as sphere records.
pub fn images_from_dir(dir: &Path) -> std::io::Result<Vec<ImageRecord>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    paths.sort();

    Ok(paths
        .iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stem = p
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            ImageRecord::new(name, p.to_string_lossy(), stem.clone()).with_title(stem)
        })
        .collect())
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Relative `src` values resolve against the manifest's directory.
pub fn resolve_src(src: &str, base_dir: Option<&Path>) -> PathBuf {
    let p = PathBuf::from(src);
    match base_dir {
        Some(base) if p.is_relative() => base.join(p),
        _ => p,
    }
}

/// Thumbnails feed the sphere tiles; the detail view asks for one image at
/// full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Thumbnail,
    Full,
}

struct Decoded {
    generation: u64,
    index: usize,
    kind: Kind,
    result: Result<image::RgbaImage, String>,
}

/// Decodes images on worker threads and turns them into egui textures on
/// the UI thread.
pub struct Gallery {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
    /// Bumped on every `load`; workers of an older load stop at their next job.
    generation: Arc<AtomicU64>,
    paths: Vec<PathBuf>,
    textures: HashMap<usize, egui::TextureHandle>,
    failed: HashSet<usize>,
    pending: usize,
    detail: Option<(usize, Option<egui::TextureHandle>)>,
}

impl Gallery {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            generation: Arc::new(AtomicU64::new(0)),
            paths: Vec::new(),
            textures: HashMap::new(),
            failed: HashSet::new(),
            pending: 0,
            detail: None,
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop current textures and start decoding `images`. Workers of an
    /// earlier load stop before their next decode.
    pub fn load(&mut self, images: &[ImageRecord], base_dir: Option<&Path>) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.textures.clear();
        self.failed.clear();
        self.detail = None;
        self.pending = images.len();

        log::info!(
            "{}",
            crate::i18n::tr_with("log.loading_images", &[("count", images.len().to_string())])
        );

        self.paths = images
            .iter()
            .map(|img| resolve_src(&img.src, base_dir))
            .collect();
        let jobs: Vec<(usize, PathBuf)> = self.paths.iter().cloned().enumerate().collect();
        let tx = self.tx.clone();
        let current = Arc::clone(&self.generation);

        thread::spawn(move || run_jobs(jobs, Kind::Thumbnail, generation, &current, &tx));
    }

    /// Start a full-resolution decode of image `index` for the detail view.
    /// Repeated requests for the same image are ignored.
    pub fn request_detail(&mut self, index: usize) {
        if matches!(self.detail, Some((i, _)) if i == index) {
            return;
        }
        let Some(path) = self.paths.get(index).cloned() else {
            return;
        };
        self.detail = Some((index, None));

        let tx = self.tx.clone();
        let current = Arc::clone(&self.generation);
        let generation = self.current_generation();
        thread::spawn(move || run_jobs(vec![(index, path)], Kind::Full, generation, &current, &tx));
    }

    pub fn clear_detail(&mut self) {
        self.detail = None;
    }

    /// The full-resolution texture for `index`, once decoded.
    pub fn detail_texture(&self, index: usize) -> Option<&egui::TextureHandle> {
        match &self.detail {
            Some((i, tex)) if *i == index => tex.as_ref(),
            _ => None,
        }
    }

    /// Upload finished decodes. Call once per frame.
    pub fn poll(&mut self, ctx: &egui::Context) {
        let generation = self.current_generation();
        while let Ok(done) = self.rx.try_recv() {
            if done.generation != generation {
                continue;
            }
            match done.kind {
                Kind::Thumbnail => {
                    self.pending = self.pending.saturating_sub(1);
                    match done.result {
                        Ok(rgba) => {
                            let handle = upload(ctx, format!("sphere-{}-{}", generation, done.index), &rgba);
                            self.textures.insert(done.index, handle);
                        }
                        Err(err) => {
                            log::error!("{}", err);
                            self.failed.insert(done.index);
                        }
                    }
                }
                Kind::Full => {
                    // 详情窗口已切换或关闭
                    let wanted = matches!(self.detail, Some((i, None)) if i == done.index);
                    match done.result {
                        Ok(rgba) if wanted => {
                            let handle = upload(ctx, format!("sphere-detail-{}", done.index), &rgba);
                            self.detail = Some((done.index, Some(handle)));
                        }
                        Ok(_) => {}
                        Err(err) => log::error!("{}", err),
                    }
                }
            }
        }
    }

    pub fn texture(&self, index: usize) -> Option<&egui::TextureHandle> {
        self.textures.get(&index)
    }

    pub fn is_broken(&self, index: usize) -> bool {
        self.failed.contains(&index)
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

fn upload(ctx: &egui::Context, name: String, rgba: &image::RgbaImage) -> egui::TextureHandle {
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    ctx.load_texture(name, color, egui::TextureOptions::LINEAR)
}

/// Decode `jobs` in order, giving up as soon as `current` moves past
/// `generation` or the receiver is gone.
fn run_jobs(
    jobs: Vec<(usize, PathBuf)>,
    kind: Kind,
    generation: u64,
    current: &AtomicU64,
    tx: &Sender<Decoded>,
) {
    for (index, path) in jobs {
        if current.load(Ordering::Acquire) != generation {
            log::debug!("stale image load {} abandoned", generation);
            return;
        }
        let max_edge = match kind {
            Kind::Thumbnail => Some(MAX_TEXTURE_EDGE),
            Kind::Full => None,
        };
        let result = decode(&path, max_edge);
        if tx
            .send(Decoded {
                generation,
                index,
                kind,
                result,
            })
            .is_err()
        {
            return;
        }
    }
}

fn decode(path: &Path, max_edge: Option<u32>) -> Result<image::RgbaImage, String> {
    let src = path.display().to_string();
    let img = image::open(path).map_err(|e| {
        crate::i18n::tr_with(
            "error.decode_image",
            &[("src", src.clone()), ("err", e.to_string())],
        )
    })?;

    let (w, h) = img.dimensions();
    log::debug!(
        "{}",
        crate::i18n::tr_with(
            "log.image_loaded",
            &[("src", src), ("w", w.to_string()), ("h", h.to_string())]
        )
    );

    let img = match max_edge {
        Some(edge) if w > edge || h > edge => img.thumbnail(edge, edge),
        _ => img,
    };
    Ok(img.to_rgba8())
}
