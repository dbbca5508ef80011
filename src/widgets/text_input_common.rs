use color_eyre::Result;
use std::fs;
use std::io::{BufRead, BufReader, Write};

use crate::cache::CacheManager;

/// Load history from `<id>_history.txt` in the cache directory
pub fn load_history_impl(cache: &CacheManager, history_id: &str) -> Result<Vec<String>> {
    let history_file = cache.cache_file(&format!("{}_history.txt", history_id));

    if !history_file.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(&history_file)?;
    let reader = BufReader::new(file);
    let mut history = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            history.push(line);
        }
    }

    Ok(history)
}

/// Save the most recent `limit` entries, holding an exclusive lock while writing
pub fn save_history_impl(
    cache: &CacheManager,
    history_id: &str,
    history: &[String],
    limit: usize,
) -> Result<()> {
    cache.ensure_cache_dir()?;
    let history_file = cache.cache_file(&format!("{}_history.txt", history_id));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&history_file)?;

    // Another daviz instance may be writing the same file
    if let Err(e) = fs2::FileExt::try_lock_exclusive(&file) {
        tracing::warn!(error = %e, file = %history_file.display(), "could not lock history file");
    }

    let start = history.len().saturating_sub(limit);
    for entry in history.iter().skip(start) {
        writeln!(file, "{}", entry)?;
    }
    file.flush()?;

    Ok(())
}

/// Add entry to history, skipping consecutive duplicates
pub fn add_to_history(history: &mut Vec<String>, entry: String) {
    if history.last() == Some(&entry) {
        return;
    }
    history.push(entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_to_history() {
        let mut history = Vec::new();

        add_to_history(&mut history, "Bar of Revenue".to_string());
        add_to_history(&mut history, "Line of Date".to_string());
        assert_eq!(history.len(), 2);

        // Consecutive duplicate
        add_to_history(&mut history, "Line of Date".to_string());
        assert_eq!(history.len(), 2);

        // Non-consecutive duplicate is kept
        add_to_history(&mut history, "Bar of Revenue".to_string());
        assert_eq!(history.len(), 3);
        assert_eq!(history[2], "Bar of Revenue");
    }

    #[test]
    fn test_history_round_trip_respects_limit() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(dir.path().join("cache"));
        let history: Vec<String> = (0..5).map(|i| format!("entry {}", i)).collect();

        save_history_impl(&cache, "description", &history, 3).unwrap();
        let loaded = load_history_impl(&cache, "description").unwrap();
        assert_eq!(loaded, vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_missing_history_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(dir.path().to_path_buf());
        assert!(load_history_impl(&cache, "nothing").unwrap().is_empty());
    }
}
