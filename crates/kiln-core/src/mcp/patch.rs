//! Idempotent preamble injection into source and compiled files.
//!
//! A patch is skipped whenever its marker substring is already present, so
//! applying it any number of times yields the same bytes as applying it once.

use std::path::Path;

use anyhow::Context;

use crate::error::SetupError;

const NODE_SHEBANG: &str = "#!/usr/bin/env node";

/// Where the preamble goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Right after the first occurrence of this line; no change when absent
    AfterLine(&'static str),
    /// After the node shebang, adding one when the file has none
    AfterShebang,
    /// At the top of the file
    Prepend,
}

/// Text inserted into a file unless `marker` is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreamblePatch {
    /// Path relative to the repository directory
    pub relative_path: &'static str,
    pub marker: &'static str,
    /// Must contain `marker`
    pub preamble: &'static str,
    pub placement: Placement,
    /// A missing file is an error instead of a skip
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchResult {
    Applied,
    AlreadyPresent,
    AnchorMissing,
    FileMissing,
}

/// Apply a patch to file content.
pub fn apply_preamble(content: &str, patch: &PreamblePatch) -> (String, PatchResult) {
    if content.contains(patch.marker) {
        return (content.to_string(), PatchResult::AlreadyPresent);
    }

    let patched = match patch.placement {
        Placement::AfterLine(anchor) => {
            if !content.contains(anchor) {
                return (content.to_string(), PatchResult::AnchorMissing);
            }
            content.replacen(anchor, &format!("{anchor}\n{}", patch.preamble), 1)
        }
        Placement::AfterShebang => {
            if content.contains(NODE_SHEBANG) {
                content.replacen(
                    NODE_SHEBANG,
                    &format!("{NODE_SHEBANG}\n{}", patch.preamble),
                    1,
                )
            } else {
                format!("{NODE_SHEBANG}\n{}\n\n{content}", patch.preamble)
            }
        }
        Placement::Prepend => format!("{}\n\n{content}", patch.preamble),
    };

    (patched, PatchResult::Applied)
}

/// Apply a patch to `root/patch.relative_path` in place.
pub fn patch_file(root: &Path, patch: &PreamblePatch) -> anyhow::Result<PatchResult> {
    let path = root.join(patch.relative_path);
    if !path.exists() {
        if patch.required {
            return Err(SetupError::MissingArtifact(path).into());
        }
        tracing::debug!("Skipping patch, {} does not exist", path.display());
        return Ok(PatchResult::FileMissing);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (patched, result) = apply_preamble(&content, patch);

    match result {
        PatchResult::Applied => {
            std::fs::write(&path, patched)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Added env loading to {}", path.display());
        }
        PatchResult::AnchorMissing => {
            tracing::warn!(
                "Could not find insertion point in {}, leaving it unchanged",
                path.display()
            );
        }
        PatchResult::AlreadyPresent | PatchResult::FileMissing => {}
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHEBANG_PATCH: PreamblePatch = PreamblePatch {
        relative_path: "build/index.js",
        marker: "import dotenv from",
        preamble: "import dotenv from 'dotenv';\ndotenv.config();",
        placement: Placement::AfterShebang,
        required: false,
    };

    const ANCHOR_PATCH: PreamblePatch = PreamblePatch {
        relative_path: "index.ts",
        marker: "import * as dotenv from 'dotenv';",
        preamble: "import * as dotenv from 'dotenv';\ndotenv.config();\n",
        placement: Placement::AfterLine("import { google } from 'googleapis';"),
        required: false,
    };

    #[test]
    fn inserts_after_existing_shebang() {
        let (out, result) = apply_preamble("#!/usr/bin/env node\nconsole.log(1);\n", &SHEBANG_PATCH);
        assert_eq!(result, PatchResult::Applied);
        assert_eq!(
            out,
            "#!/usr/bin/env node\nimport dotenv from 'dotenv';\ndotenv.config();\nconsole.log(1);\n"
        );
    }

    #[test]
    fn adds_shebang_when_missing() {
        let (out, _) = apply_preamble("console.log(1);\n", &SHEBANG_PATCH);
        assert!(out.starts_with("#!/usr/bin/env node\nimport dotenv from 'dotenv';"));
        assert!(out.ends_with("\n\nconsole.log(1);\n"));
    }

    #[test]
    fn inserts_after_anchor_line() {
        let src = "import { google } from 'googleapis';\nconst x = 1;\n";
        let (out, result) = apply_preamble(src, &ANCHOR_PATCH);
        assert_eq!(result, PatchResult::Applied);
        assert!(out.starts_with(
            "import { google } from 'googleapis';\nimport * as dotenv from 'dotenv';"
        ));
    }

    #[test]
    fn missing_anchor_leaves_content_unchanged() {
        let src = "const x = 1;\n";
        let (out, result) = apply_preamble(src, &ANCHOR_PATCH);
        assert_eq!(result, PatchResult::AnchorMissing);
        assert_eq!(out, src);
    }

    #[test]
    fn patching_twice_matches_patching_once() {
        for (patch, src) in [
            (SHEBANG_PATCH, "#!/usr/bin/env node\nmain();\n"),
            (SHEBANG_PATCH, "main();\n"),
            (ANCHOR_PATCH, "import { google } from 'googleapis';\nmain();\n"),
        ] {
            let (once, _) = apply_preamble(src, &patch);
            let (twice, result) = apply_preamble(&once, &patch);
            assert_eq!(once, twice);
            assert_eq!(result, PatchResult::AlreadyPresent);
        }
    }

    #[test]
    fn file_patch_is_idempotent_on_disk() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("build")).unwrap();
        let path = temp.path().join("build/index.js");
        std::fs::write(&path, "#!/usr/bin/env node\nmain();\n").unwrap();

        assert_eq!(patch_file(temp.path(), &SHEBANG_PATCH).unwrap(), PatchResult::Applied);
        let once = std::fs::read(&path).unwrap();
        assert_eq!(
            patch_file(temp.path(), &SHEBANG_PATCH).unwrap(),
            PatchResult::AlreadyPresent
        );
        let twice = std::fs::read(&path).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let required = PreamblePatch {
            required: true,
            ..SHEBANG_PATCH
        };

        let err = patch_file(temp.path(), &required).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::MissingArtifact(_))
        ));
        assert_eq!(
            patch_file(temp.path(), &SHEBANG_PATCH).unwrap(),
            PatchResult::FileMissing
        );
    }
}
