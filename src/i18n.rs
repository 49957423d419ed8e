// i18n.rs — 运行时界面文案
//
// Strings come from, in order:
//   A) assets/i18n/<lang>.json next to the executable or in the working dir
//   B) the English table compiled into the binary
// Lookup: tr("key") / tr_with("key", &[("name", ...)]) with {name} placeholders.
//
// Language selection: `--lang <code>`, then env SPHERE_GRID_LANG, then "en".

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const DEFAULT_LANG: &str = "en";
const BUILTIN_EN: &str = include_str!("../assets/i18n/en.json");

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    map: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Catalog {
    pub fn from_maps(map: HashMap<String, String>, fallback: HashMap<String, String>) -> Self {
        Self { map, fallback }
    }

    pub fn load(lang: &str) -> Self {
        let fallback = builtin_english();
        let map = match find_lang_file(lang) {
            Some(path) => match read_table(&path) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("ignoring {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            None if lang == DEFAULT_LANG => HashMap::new(),
            None => {
                log::warn!("no translation table for `{}`, using English", lang);
                HashMap::new()
            }
        };
        Self::from_maps(map, fallback)
    }

    /// Missing keys come back as the key itself.
    pub fn tr(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Placeholders without a matching argument are left as-is.
    pub fn tr_with(&self, key: &str, args: &[(&str, String)]) -> String {
        args.iter().fold(self.tr(key), |s, (k, v)| {
            s.replace(&format!("{{{}}}", k), v)
        })
    }
}

fn builtin_english() -> HashMap<String, String> {
    serde_json::from_str(BUILTIN_EN).unwrap_or_default()
}

fn read_table(path: &Path) -> Result<HashMap<String, String>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn find_lang_file(lang: &str) -> Option<PathBuf> {
    let rel = Path::new("assets").join("i18n").join(format!("{}.json", lang));
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&rel)));
    beside_exe.into_iter().chain(Some(rel)).find(|p| p.exists())
}

static CATALOG: Lazy<RwLock<Catalog>> = Lazy::new(|| RwLock::new(Catalog::load(DEFAULT_LANG)));

/// Switch the global language. Safe to call repeatedly.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let catalog = Catalog::load(&lang);
    if let Ok(mut w) = CATALOG.write() {
        *w = catalog;
    }
}

pub fn tr(key: &str) -> String {
    match CATALOG.read() {
        Ok(c) => c.tr(key),
        Err(_) => key.to_string(),
    }
}

pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    match CATALOG.read() {
        Ok(c) => c.tr_with(key, args),
        Err(_) => key.to_string(),
    }
}

/// Language from `--lang <code>` or SPHERE_GRID_LANG.
pub fn resolve_lang(args: &[String]) -> String {
    if let Some(v) = args
        .windows(2)
        .find(|w| w[0] == "--lang")
        .map(|w| w[1].clone())
    {
        return v;
    }
    match std::env::var("SPHERE_GRID_LANG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_LANG.to_string(),
    }
}
