// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// One category of build output.
///
/// Every kind owns a fixed entry in the PathSet and writes into its own
/// destination subtree, so kinds can run side by side without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Html,
    Styles,
    Scripts,
    Images,
    Svg,
    Fonts,
}

impl TaskKind {
    /// All build tasks, in the order they are listed in the default pipeline.
    pub const ALL: [TaskKind; 6] = [
        TaskKind::Html,
        TaskKind::Styles,
        TaskKind::Scripts,
        TaskKind::Images,
        TaskKind::Svg,
        TaskKind::Fonts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Html => "html",
            TaskKind::Styles => "styles",
            TaskKind::Scripts => "scripts",
            TaskKind::Images => "images",
            TaskKind::Svg => "svg",
            TaskKind::Fonts => "fonts",
        }
    }

    /// What connected browsers should do once this task has written output.
    ///
    /// Stylesheets can be swapped in place; everything else needs a full
    /// page reload.
    pub fn reload(self) -> Reload {
        match self {
            TaskKind::Styles => Reload::Styles,
            _ => Reload::Page,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(TaskKind::Html),
            "styles" => Ok(TaskKind::Styles),
            "scripts" => Ok(TaskKind::Scripts),
            "images" => Ok(TaskKind::Images),
            "svg" => Ok(TaskKind::Svg),
            "fonts" => Ok(TaskKind::Fonts),
            other => Err(format!(
                "unknown task: {other} (expected one of html, styles, scripts, images, svg, fonts)"
            )),
        }
    }
}

/// Live-reload notification pushed to connected browser clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// Reload the whole page.
    Page,
    /// Re-fetch stylesheets without reloading the page.
    Styles,
}

impl Reload {
    /// Event name used on the live-reload stream.
    pub fn event_name(self) -> &'static str {
        match self {
            Reload::Page => "page",
            Reload::Styles => "styles",
        }
    }
}
