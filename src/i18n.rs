// i18n.rs
//
// Runtime UI strings:
// - Built-in tables are compiled in from assets/i18n.json
//   (format: { "<lang>": { "key": "value" } })
// - assets/i18n/<lang>.json next to the executable (or in the working dir)
//   overrides individual keys of the built-in table
// - Lookup order: selected lang -> fallback "en" -> the key itself
//
// Language selection: --lang <code>, then DUAL_PANO_LANG, then "en".

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";
pub const LANG_ENV: &str = "DUAL_PANO_LANG";

/// Languages offered in the UI, as (code, native name).
pub const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("pt-BR", "Português (Brasil)")];

const BUILTIN: &str = include_str!("../assets/i18n.json");

type Table = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct I18n {
    pub lang: String,
    map: Table,
    fallback_map: Table,
}

impl I18n {
    pub fn load(lang: &str) -> Self {
        let map = load_lang(lang);
        let fallback_map = if lang == FALLBACK_LANG {
            map.clone()
        } else {
            load_lang(FALLBACK_LANG)
        };
        Self {
            lang: lang.to_string(),
            map,
            fallback_map,
        }
    }

    pub fn get(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.fallback_map.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn builtin_table(lang: &str) -> Table {
    let all: HashMap<String, Table> = match serde_json::from_str(BUILTIN) {
        Ok(all) => all,
        Err(err) => {
            log::error!("built-in i18n table is malformed: {err}");
            return Table::new();
        }
    };
    all.get(lang).cloned().unwrap_or_default()
}

fn load_override(path: &Path) -> Option<Table> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(map) => Some(map),
        Err(err) => {
            log::warn!("ignoring {}: {err}", path.display());
            None
        }
    }
}

/// assets/i18n/<lang>.json beside the executable, then under the working dir.
fn find_override(lang: &str) -> Option<PathBuf> {
    let file = format!("{lang}.json");

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::new()))
        .map(|dir| dir.join("assets").join("i18n").join(&file))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> Table {
    let mut table = builtin_table(lang);
    if let Some(path) = find_override(lang) {
        if let Some(overrides) = load_override(&path) {
            log::debug!("i18n overrides for {lang} from {}", path.display());
            table.extend(overrides);
        }
    }
    table
}

/// Initialize global i18n. Later calls switch the current language.
pub fn init(lang: impl Into<String>) {
    let i = I18n::load(&lang.into());
    log::info!("UI language: {}", i.lang);

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|i| i.lang.clone()))
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Get localized text by key. If key missing, returns key itself.
pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(i) => i.get(key),
        None => key.to_string(),
    }
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    substitute(tr(key), args)
}

fn substitute(mut s: String, args: &[(&str, String)]) -> String {
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

/// `--lang` wins, then the environment, then the fallback.
pub fn resolve_lang(cli_lang: Option<&str>) -> String {
    cli_lang
        .map(str::to_string)
        .or_else(|| std::env::var(LANG_ENV).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}
