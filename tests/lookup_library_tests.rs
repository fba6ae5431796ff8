use anyhow::Result;
use exfind::config::{Config, expand_pattern, load_lookup_table};
use exfind::enrich::enrich_matches;
use exfind::search::{SearchOptions, search_files};
use std::fs;
use tempfile::TempDir;

/// Tests for lookup-library precedence and run-to-run stability
#[cfg(test)]
mod lookup_library_tests {
    use super::*;

    /// Directory order decides precedence: the later directory's value wins
    #[test]
    fn test_directory_precedence_last_writer_wins() -> Result<()> {
        let base = TempDir::new()?;
        let overlay = TempDir::new()?;
        fs::write(base.path().join("lib.json"), r#"{"word": "base"}"#)?;
        fs::write(overlay.path().join("lib.json"), r#"{"word": "overlay"}"#)?;

        let config = Config {
            lib_dirs: vec![base.path().to_path_buf(), overlay.path().to_path_buf()],
            template: None,
        };

        let lookup = load_lookup_table(&config.lib_dirs)?;
        assert_eq!(expand_pattern("{word}", &lookup)?, "overlay");

        // Reversed order flips the winner.
        let lookup = load_lookup_table(&[
            overlay.path().to_path_buf(),
            base.path().to_path_buf(),
        ])?;
        assert_eq!(expand_pattern("{word}", &lookup)?, "base");

        Ok(())
    }

    /// Several lookup files merge into one table, disjoint keys intact
    #[test]
    fn test_disjoint_keys_merge() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("words.json"), r#"{"word": "[a-z]+"}"#)?;
        fs::write(dir.path().join("digits.json"), r#"{"num": "[0-9]+"}"#)?;

        let lookup = load_lookup_table(&[dir.path().to_path_buf()])?;
        assert_eq!(expand_pattern("{word}-{num}", &lookup)?, "[a-z]+-[0-9]+");

        Ok(())
    }

    /// The same pattern and library resolve identically on every run
    #[test]
    fn test_resolution_is_stable_across_runs() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("lib.json"), r#"{"frag": "a(b|c)d"}"#)?;

        let first = expand_pattern("{frag}+", &load_lookup_table(&[dir.path().to_path_buf()])?)?;
        let second = expand_pattern("{frag}+", &load_lookup_table(&[dir.path().to_path_buf()])?)?;
        assert_eq!(first, second);

        Ok(())
    }

    /// Digests for an unchanged file are stable across whole pipeline runs
    #[test]
    fn test_digests_stable_across_pipeline_runs() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("stable.txt"), "needle in here\n")?;

        let run = || -> Result<String> {
            let events = search_files("needle", dir.path(), &SearchOptions::default())?;
            let entries = enrich_matches(&events)?;
            let entry = entries
                .get(&dir.path().join("stable.txt"))
                .expect("entry for stable.txt");
            Ok(entry.hashes["sha256"].clone())
        };

        assert_eq!(run()?, run()?);

        Ok(())
    }
}
