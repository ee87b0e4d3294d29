use std::fs;
use std::io;
use std::path::Path;

/// Stock word list used when no custom list is configured
pub const DEFAULT_WORDS: [&str; 30] = [
    "dinosaur",
    "love",
    "pineapple",
    "calendar",
    "robot",
    "building",
    "population",
    "weather",
    "bottle",
    "history",
    "dream",
    "character",
    "money",
    "absolute",
    "discipline",
    "machine",
    "accurate",
    "connection",
    "rainbow",
    "bicycle",
    "eclipse",
    "calculator",
    "trouble",
    "watermelon",
    "developer",
    "philosophy",
    "database",
    "capitalism",
    "abominable",
    "phone",
];

pub fn default_dictionary() -> Vec<String> {
    DEFAULT_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Parse a word list: one word per line, `#` comments and blank lines skipped.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn load_word_list<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let words = parse_word_list(&fs::read_to_string(path.as_ref())?);
    if words.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no words found in {}", path.as_ref().display()),
        ));
    }
    Ok(words)
}
