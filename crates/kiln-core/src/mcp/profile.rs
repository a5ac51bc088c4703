//! Per-kind setup data.
//!
//! Kinds differ only in what they require, install, patch and launch; the
//! steps themselves live in [`super::handler`].

use super::kind::McpKind;
use super::manifest::ManifestPatch;
use super::patch::{Placement, PreamblePatch};
use crate::config::properties::UV_PATH;

/// How dependencies are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPlan {
    /// `npm install <pkg>` for each extra package, then `npm install`
    Npm { extra_packages: &'static [&'static str] },
    /// Fresh virtualenv in `server_dir/.venv`, then pip-install `packages`
    PythonVenv {
        server_dir: &'static str,
        packages: &'static [&'static str],
    },
}

/// Command used for the liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePlan {
    /// `npm start` in the repository
    NpmStart,
    /// `<uv> --directory <repo>/<server_dir> run main.py`
    UvRun { server_dir: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCommand {
    Literal(&'static str),
    /// Value of a properties-file key
    Property(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateArg {
    Literal(&'static str),
    /// Path relative to the install directory, made absolute on render
    InstallPath(&'static str),
}

/// Desktop launcher entry before install paths and env are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopTemplate {
    pub command: TemplateCommand,
    pub args: &'static [TemplateArg],
    /// Env keys emitted with empty values when the repository declares none.
    /// `None` omits the env block unless the repository declares env
    pub env_keys: Option<&'static [&'static str]>,
}

/// Everything that distinguishes one kind's setup from another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    pub kind: McpKind,
    /// Checked before anything touches the repository
    pub required_vars: &'static [&'static str],
    /// When set, setup pauses after install until this variable is non-blank
    pub pending_until: Option<&'static str>,
    /// Checked once the pause condition is satisfied
    pub full_vars: &'static [&'static str],
    /// Properties key naming a tool binary that must exist
    pub required_tool: Option<&'static str>,
    pub writes_credentials: bool,
    pub manifest_patch: Option<ManifestPatch>,
    pub install: InstallPlan,
    /// Applied before the build
    pub source_patches: &'static [PreamblePatch],
    pub build: bool,
    /// Applied after the build
    pub artifact_patches: &'static [PreamblePatch],
    pub probe: ProbePlan,
    pub desktop: DesktopTemplate,
    /// Printed when setup pauses on `pending_until`
    pub pending_instructions: &'static [&'static str],
    /// Printed after a successful setup
    pub post_install_notes: &'static [&'static str],
}

const GOOGLE_OAUTH_VARS: &[&str] = &[
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REFRESH_TOKEN",
    "GOOGLE_REDIRECT_URI",
];

const NODE_BUILD_ENTRY: &[TemplateArg] = &[TemplateArg::InstallPath("build/index.js")];

const DOTENV_AFTER_SHEBANG: PreamblePatch = PreamblePatch {
    relative_path: "build/index.js",
    marker: "import dotenv from",
    preamble: "import dotenv from 'dotenv';\ndotenv.config();",
    placement: Placement::AfterShebang,
    required: false,
};

const DOTENV_CONFIG_PREPEND: PreamblePatch = PreamblePatch {
    relative_path: "build/config.js",
    marker: "import dotenv from",
    preamble: "import dotenv from 'dotenv';\ndotenv.config();",
    placement: Placement::Prepend,
    required: true,
};

const CALENDAR_DOTENV_PREAMBLE: &str =
    "import * as dotenv from 'dotenv';\n\n// Load environment variables\ndotenv.config();\n";

const CALENDAR_SOURCE_PATCH: PreamblePatch = PreamblePatch {
    relative_path: "index.ts",
    marker: "import * as dotenv from 'dotenv';",
    preamble: CALENDAR_DOTENV_PREAMBLE,
    placement: Placement::AfterLine("import { calendar_v3 } from '@googleapis/calendar';"),
    required: false,
};

const CALENDAR_ARTIFACT_PATCH: PreamblePatch = PreamblePatch {
    relative_path: "build/index.js",
    marker: "import * as dotenv from 'dotenv';",
    preamble: CALENDAR_DOTENV_PREAMBLE,
    placement: Placement::AfterLine("import { google } from 'googleapis';"),
    required: false,
};

/// Directory of the Python server inside the WhatsApp repository.
pub const WHATSAPP_SERVER_DIR: &str = "whatsapp-mcp-server";

const TRELLO: KindProfile = KindProfile {
    kind: McpKind::Trello,
    required_vars: &["TRELLO_API_KEY", "TRELLO_TOKEN"],
    pending_until: None,
    full_vars: &[],
    required_tool: None,
    writes_credentials: true,
    manifest_patch: Some(ManifestPatch::BuildWithTsc),
    install: InstallPlan::Npm {
        extra_packages: &["dotenv"],
    },
    source_patches: &[],
    build: true,
    artifact_patches: &[DOTENV_AFTER_SHEBANG],
    probe: ProbePlan::NpmStart,
    desktop: DesktopTemplate {
        command: TemplateCommand::Literal("node"),
        args: NODE_BUILD_ENTRY,
        env_keys: Some(&["TRELLO_API_KEY", "TRELLO_TOKEN", "TRELLO_BOARD_ID"]),
    },
    pending_instructions: &[],
    post_install_notes: &[],
};

const GOOGLE_CALENDAR: KindProfile = KindProfile {
    kind: McpKind::GoogleCalendar,
    required_vars: &["GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"],
    pending_until: Some("GOOGLE_REFRESH_TOKEN"),
    full_vars: GOOGLE_OAUTH_VARS,
    required_tool: None,
    writes_credentials: true,
    manifest_patch: Some(ManifestPatch::TscScriptsWithDotenv),
    install: InstallPlan::Npm { extra_packages: &[] },
    source_patches: &[CALENDAR_SOURCE_PATCH],
    build: true,
    artifact_patches: &[CALENDAR_ARTIFACT_PATCH],
    probe: ProbePlan::NpmStart,
    desktop: DesktopTemplate {
        command: TemplateCommand::Literal("node"),
        args: NODE_BUILD_ENTRY,
        env_keys: Some(GOOGLE_OAUTH_VARS),
    },
    pending_instructions: &[
        "No Google refresh token is configured yet.",
        "1. Run the Google OAuth helper with GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET set",
        "2. Complete the consent flow in the browser",
        "3. Copy the refresh token it prints",
        "4. Set GOOGLE_REFRESH_TOKEN in repositories.json (or as a %placeholder% in .env)",
        "5. Delete the google-calendar repository directory and run `kiln setup` again",
    ],
    post_install_notes: &[],
};

const GMAIL: KindProfile = KindProfile {
    kind: McpKind::Gmail,
    required_vars: GOOGLE_OAUTH_VARS,
    pending_until: None,
    full_vars: &[],
    required_tool: None,
    writes_credentials: true,
    manifest_patch: None,
    install: InstallPlan::Npm { extra_packages: &[] },
    source_patches: &[],
    build: true,
    artifact_patches: &[],
    probe: ProbePlan::NpmStart,
    desktop: DesktopTemplate {
        command: TemplateCommand::Literal("node"),
        args: &[TemplateArg::InstallPath("dist/index.js")],
        env_keys: Some(GOOGLE_OAUTH_VARS),
    },
    pending_instructions: &[],
    post_install_notes: &[],
};

const LINKEDIN_EXTRACT: KindProfile = KindProfile {
    kind: McpKind::LinkedinExtract,
    required_vars: &["APIFY_TOKEN"],
    pending_until: None,
    full_vars: &[],
    required_tool: None,
    writes_credentials: true,
    manifest_patch: Some(ManifestPatch::BuildWithTsc),
    install: InstallPlan::Npm { extra_packages: &[] },
    source_patches: &[],
    build: true,
    artifact_patches: &[DOTENV_CONFIG_PREPEND],
    probe: ProbePlan::NpmStart,
    desktop: DesktopTemplate {
        command: TemplateCommand::Literal("node"),
        args: NODE_BUILD_ENTRY,
        env_keys: Some(&["APIFY_TOKEN"]),
    },
    pending_instructions: &[],
    post_install_notes: &[],
};

const WHATSAPP: KindProfile = KindProfile {
    kind: McpKind::Whatsapp,
    required_vars: &[],
    pending_until: None,
    full_vars: &[],
    required_tool: Some(UV_PATH),
    writes_credentials: false,
    manifest_patch: None,
    install: InstallPlan::PythonVenv {
        server_dir: WHATSAPP_SERVER_DIR,
        packages: &["httpx>=0.28.1", "mcp[cli]>=1.6.0", "requests>=2.32.3"],
    },
    source_patches: &[],
    build: false,
    artifact_patches: &[],
    probe: ProbePlan::UvRun {
        server_dir: WHATSAPP_SERVER_DIR,
    },
    desktop: DesktopTemplate {
        command: TemplateCommand::Property(UV_PATH),
        args: &[
            TemplateArg::Literal("--directory"),
            TemplateArg::InstallPath(WHATSAPP_SERVER_DIR),
            TemplateArg::Literal("run"),
            TemplateArg::Literal("main.py"),
        ],
        env_keys: None,
    },
    pending_instructions: &[],
    post_install_notes: &[
        "The WhatsApp bridge must run as a separate service:",
        "1. In whatsapp-bridge, run `go run main.go` and scan the QR code with WhatsApp",
        "   Wait for the initial sync to finish, then close the terminal",
        "2. Run setup_whatsapp_service.ps1 as administrator to install the bridge service",
        "3. Restart it with `Restart-Service whatsapp-bridge`",
        "4. Stop it with `Stop-Service whatsapp-bridge`",
        "5. Remove it with `nssm remove whatsapp-bridge confirm`",
    ],
};

impl KindProfile {
    pub fn for_kind(kind: McpKind) -> &'static KindProfile {
        match kind {
            McpKind::Trello => &TRELLO,
            McpKind::GoogleCalendar => &GOOGLE_CALENDAR,
            McpKind::Gmail => &GMAIL,
            McpKind::LinkedinExtract => &LINKEDIN_EXTRACT,
            McpKind::Whatsapp => &WHATSAPP,
        }
    }
}
