//! Utility functions shared across the codebase

/// Convert an asset path to the correct format for the current platform.
/// On desktop: paths are relative to the working directory (e.g., "assets/sprites/boy/down.png")
/// On Android: paths are relative to the APK's assets folder (e.g., "sprites/boy/down.png")
pub fn asset_path(path: &str) -> String {
    #[cfg(target_os = "android")]
    {
        if let Some(stripped) = path.strip_prefix("assets/") {
            stripped.to_string()
        } else {
            path.to_string()
        }
    }
    #[cfg(not(target_os = "android"))]
    {
        path.to_string()
    }
}

/// Break text into lines of at most `max_chars` characters, on word boundaries
/// where possible. Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let needed = if line.is_empty() { word.len() } else { line.chars().count() + 1 + word.len() };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !word.is_empty() {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.extend(word);
            }
        }
        lines.push(line);
    }

    lines
}
