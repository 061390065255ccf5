use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Lua sources found, in path order.
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

/// Collect the Lua sources under `base_dir`.
///
/// `includes` narrows the scan to the listed directories or files (glob
/// patterns allowed); an empty list scans all of `base_dir`. Paths matching
/// `ignore_patterns` are skipped.
pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    let roots: Vec<PathBuf> = if includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten()),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid glob pattern '{}': {}",
                                "warning:".bold().yellow(),
                                inc,
                                e
                            );
                        }
                    }
                }
            } else {
                let path = base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else if verbose {
                    eprintln!(
                        "{} Include path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
        paths
    };

    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            let path_str = path.to_string_lossy();
            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if entry.file_type().is_file() && is_lua_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}

fn is_lua_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("lua")
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn names(result: &ScanResult, base: &Path) -> Vec<String> {
        result
            .files
            .iter()
            .map(|f| {
                f.strip_prefix(base)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_scan_lua_files() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        File::create(dir_path.join("main.lua")).unwrap();
        File::create(dir_path.join("conf.lua")).unwrap();
        File::create(dir_path.join("README.md")).unwrap();

        let result = scan_files(dir_path, &[], &[], false);

        assert_eq!(names(&result, dir_path), vec!["conf.lua", "main.lua"]);
    }

    #[test]
    fn test_scan_nested_directories() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let ui = dir_path.join("ui").join("widgets");
        fs::create_dir_all(&ui).unwrap();
        File::create(ui.join("button.lua")).unwrap();
        File::create(dir_path.join("init.lua")).unwrap();

        let result = scan_files(dir_path, &[], &[], false);

        assert_eq!(
            names(&result, dir_path),
            vec!["init.lua", "ui/widgets/button.lua"]
        );
    }

    #[test]
    fn test_scan_ignores_glob_pattern() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let modules = dir_path.join("lua_modules");
        fs::create_dir(&modules).unwrap();
        File::create(modules.join("dep.lua")).unwrap();
        File::create(dir_path.join("main.lua")).unwrap();

        let result = scan_files(dir_path, &[], &["**/lua_modules/**".to_owned()], false);

        assert_eq!(names(&result, dir_path), vec!["main.lua"]);
    }

    #[test]
    fn test_scan_ignores_literal_path() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let vendor = dir_path.join("vendor");
        fs::create_dir(&vendor).unwrap();
        File::create(vendor.join("lib.lua")).unwrap();
        File::create(dir_path.join("main.lua")).unwrap();

        let result = scan_files(dir_path, &[], &["vendor".to_owned()], false);

        assert_eq!(names(&result, dir_path), vec!["main.lua"]);
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let src = dir_path.join("src");
        fs::create_dir(&src).unwrap();
        File::create(src.join("app.lua")).unwrap();
        File::create(dir_path.join("build.lua")).unwrap();
        File::create(dir_path.join("extra.lua")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned(), "extra.lua".to_owned(), "missing".to_owned()],
            &[],
            false,
        );

        assert_eq!(names(&result, dir_path), vec!["extra.lua", "src/app.lua"]);
    }

    #[test]
    fn test_scan_deduplicates_overlapping_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let nested = dir_path.join("src").join("ui");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("menu.lua")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned(), "src/ui".to_owned(), "src/*".to_owned()],
            &[],
            false,
        );

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_is_lua_file() {
        assert!(is_lua_file(Path::new("main.lua")));
        assert!(!is_lua_file(Path::new("main.luac")));
        assert!(!is_lua_file(Path::new("lua")));
    }
}
