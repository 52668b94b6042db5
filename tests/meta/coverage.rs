//! Keeps tests/unit mirroring src and every test file wired and non-empty

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";

    /// Every directory and `.rs` file below `root`, relative to it
    fn tree(root: &Path) -> io::Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let is_source = path.extension().is_some_and(|ext| ext == "rs");
                if !path.is_dir() && !is_source {
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .map_err(|_| io::Error::other("path outside scanned root"))?
                    .to_string_lossy()
                    .into_owned();
                found.insert(relative);
                if path.is_dir() {
                    pending.push(path);
                }
            }
        }

        Ok(found)
    }

    /// Rust files below `root`, recursively
    fn rust_files(root: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(tree(root)?
            .into_iter()
            .map(|relative| root.join(relative))
            .filter(|path| path.is_file())
            .collect())
    }

    fn is_module_file(relative: &str) -> bool {
        relative == "mod.rs" || relative.ends_with("/mod.rs")
    }

    fn scan(root: &str) -> BTreeSet<String> {
        tree(Path::new(root)).unwrap_or_else(|e| panic!("cannot scan {root}: {e}"))
    }

    #[test]
    fn test_all_src_files_have_unit_tests() {
        let unit = scan(UNIT_DIR);

        // Entry points and module wiring carry no logic of their own
        let missing: Vec<String> = scan(SRC_DIR)
            .into_iter()
            .filter(|path| path != "main.rs" && path != "lib.rs" && !is_module_file(path))
            .filter(|path| !unit.contains(path))
            .map(|path| format!("  - src/{path} -> {UNIT_DIR}/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source paths without a unit test counterpart:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let src = scan(SRC_DIR);

        let orphaned: Vec<String> = scan(UNIT_DIR)
            .into_iter()
            .filter(|path| !is_module_file(path) && !src.contains(path))
            .map(|path| format!("  - {UNIT_DIR}/{path} (no src/{path})"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test paths without a source counterpart:\n{}",
            orphaned.join("\n")
        );
    }

    #[test]
    fn test_unit_modules_are_declared() {
        let root = Path::new(UNIT_DIR);
        let mut undeclared = Vec::new();

        for relative in scan(UNIT_DIR) {
            let path = root.join(&relative);
            let Some(name) = path.file_stem().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if name == "mod" {
                continue;
            }
            let Some(parent) = path.parent() else {
                continue;
            };
            let wiring = parent.join("mod.rs");
            let declarations = fs::read_to_string(&wiring).unwrap_or_default();

            // A file missing from its mod.rs compiles silently and never runs
            if !declarations.contains(&format!("mod {name};")) {
                undeclared.push(format!("  - {} (in {})", path.display(), wiring.display()));
            }
        }

        assert!(
            undeclared.is_empty(),
            "Unit test modules not declared in their mod.rs:\n{}",
            undeclared.join("\n")
        );
    }

    #[test]
    fn test_all_test_files_contain_tests() {
        let files = rust_files(Path::new("tests"))
            .unwrap_or_else(|e| panic!("cannot scan tests: {e}"));

        let empty: Vec<String> = files
            .iter()
            .filter(|path| path.file_name().is_some_and(|name| name != "mod.rs"))
            .filter(|path| {
                fs::read_to_string(path).map_or(true, |content| !content.contains("#[test]"))
            })
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }
}
