use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::GameConfig;
use crate::words::WordList;

const DEFAULT_WORDS_EN: &[&str] = &[
    "Pineapple", "Farm", "Clown", "Dartboard", "Elephant", "Football", "Guitar", "Harbor",
    "Igloo", "Jungle", "Kangaroo", "Lighthouse", "Mountain", "Notebook", "Orchestra",
    "Penguin", "Queen", "Rainbow", "Satellite", "Tornado", "Umbrella", "Volcano",
    "Waterfall", "Xylophone", "Yacht", "Zebra", "Castle", "Desert", "Firework", "Glacier",
    "Honey", "Island", "Jellyfish", "Kitchen", "Library", "Magnet", "Nest", "Octopus",
    "Pirate", "Robot",
];

const DEFAULT_WORDS_DE: &[&str] = &[
    "Ananas", "Bauernhof", "Clown", "Dartscheibe", "Elefant", "Fussball", "Gitarre", "Hafen",
    "Iglu", "Dschungel", "Känguru", "Leuchtturm", "Berg", "Notizbuch", "Orchester",
    "Pinguin", "Königin", "Regenbogen", "Satellit", "Wirbelsturm", "Regenschirm", "Vulkan",
    "Wasserfall", "Xylophon", "Jacht", "Zebra", "Burg", "Wüste", "Feuerwerk", "Gletscher",
    "Honig", "Insel", "Qualle", "Küche", "Bibliothek", "Magnet", "Nest", "Krake",
    "Pirat", "Roboter",
];

/// Base config directory, from `CONFIG_PATH` or `./config`.
pub fn config_dir() -> PathBuf {
    PathBuf::from(std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string()))
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Initialize config directory with defaults if missing.
pub fn init(base: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(base).map_err(io_err(base))?;

    let game_path = base.join("game.json");
    if !game_path.exists() {
        let defaults = serde_json::to_string_pretty(&GameConfig::default()).map_err(|source| {
            ConfigError::Parse {
                path: game_path.clone(),
                source,
            }
        })?;
        fs::write(&game_path, defaults).map_err(io_err(&game_path))?;
    }

    let words_dir = base.join("words");
    if !words_dir.exists() {
        fs::create_dir_all(&words_dir).map_err(io_err(&words_dir))?;
        for (language, words) in [("en", DEFAULT_WORDS_EN), ("de", DEFAULT_WORDS_DE)] {
            let path = words_dir.join(format!("{language}.txt"));
            fs::write(&path, words.join("\n")).map_err(io_err(&path))?;
        }
        tracing::info!("Wrote default word lists to {}", words_dir.display());
    }

    Ok(())
}

/// Load the game configuration.
pub fn load_game_config(base: &Path) -> Result<GameConfig, ConfigError> {
    let path = base.join("game.json");
    let data = fs::read_to_string(&path).map_err(io_err(&path))?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
}

/// Load every word list in the words directory. The file stem is the
/// language code; one word per line, `#` starts a comment. For `.csv`
/// files only the first column is used.
pub fn load_word_list(base: &Path) -> Result<WordList, ConfigError> {
    let words_dir = base.join("words");
    let entries = fs::read_dir(&words_dir).map_err(io_err(&words_dir))?;

    let mut list = WordList::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str());
        if !matches!(ext, Some("txt") | Some("csv")) {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let words = match fs::read_to_string(&path) {
            Ok(data) if ext == Some("csv") => parse_csv_words(&data),
            Ok(data) => Ok(parse_words(&data)),
            Err(e) => {
                tracing::error!("Failed to read word list {}: {}", path.display(), e);
                continue;
            }
        };
        match words {
            Ok(words) => {
                tracing::info!("Loaded {} words for language '{}'", words.len(), language);
                list = list.with_language(language, words);
            }
            Err(e) => tracing::error!("Failed to parse word list {}: {}", path.display(), e),
        }
    }

    if list.is_empty() {
        return Err(ConfigError::NoWordLists(words_dir));
    }
    Ok(list)
}

fn parse_words(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// First column of every record. Quoted fields may contain commas.
fn parse_csv_words(data: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut words = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(word) = record.get(0).filter(|w| !w.is_empty()) {
            words.push(word.to_string());
        }
    }
    Ok(words)
}
