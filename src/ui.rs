// ============================================================================
// src/ui.rs – console output: status lines and the partition overview box
// ============================================================================

use console::{measure_text_width, Style, Term};

use crate::state::{PartitionInfo, SystemInfo};

pub const OVERVIEW_TITLE: &str = "reMarkable OS Version Switcher";
const BOX_WIDTH: usize = 50;

/// Terminal output with consistent styling. `styled` is off when stdout is
/// not a terminal.
pub struct UX {
    styled: bool,
}

impl Default for UX {
    fn default() -> Self {
        Self::new()
    }
}

impl UX {
    pub fn new() -> Self {
        Self {
            styled: Term::stdout().features().colors_supported(),
        }
    }

    pub fn plain() -> Self {
        Self { styled: false }
    }

    fn paint(&self, style: Style, msg: &str) -> String {
        if self.styled {
            style.apply_to(msg).to_string()
        } else {
            msg.to_string()
        }
    }

    pub fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    pub fn note(&self, msg: &str) {
        println!("{}", self.paint(Style::new().dim(), msg));
    }

    pub fn success(&self, msg: &str) {
        println!("{}", self.paint(Style::new().green().bold(), msg));
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("{}", self.paint(Style::new().yellow().bold(), msg));
    }

    pub fn overview(&self, info: &SystemInfo) {
        println!("{}", render_overview(info, self.styled));
    }
}

fn slot_label(p: &PartitionInfo) -> String {
    format!("Partition  {}: {}", p.number.slot(), p.version)
}

/// Two boxes: the title, then one line per slot (A first) with the
/// `[ACTIVE]` / `[NEXT BOOT]` tags starting in a shared column.
pub fn render_overview(info: &SystemInfo, styled: bool) -> String {
    let paint = |style: Style, text: &str| {
        if styled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    };
    let active_style = Style::new().green().bold();
    let fallback_style = Style::new().cyan();
    let pending_style = Style::new().yellow().bold();

    let slots = info.slots();
    let column = slots
        .iter()
        .map(|p| slot_label(p).len())
        .max()
        .unwrap_or(0);

    let lines: Vec<String> = slots
        .iter()
        .map(|p| {
            let plain = slot_label(p);
            let version_style = if p.is_active {
                active_style.clone()
            } else {
                fallback_style.clone()
            };
            let mut line = format!(
                "Partition  {}: {}{}",
                p.number.slot(),
                paint(version_style, &p.version),
                " ".repeat(column - plain.len())
            );
            if p.is_active {
                line.push_str(&paint(active_style.clone(), " [ACTIVE]"));
            }
            if p.is_next_boot {
                // Green when the running partition boots again, yellow when it changes.
                let style = if p.is_active {
                    active_style.clone()
                } else {
                    pending_style.clone()
                };
                line.push_str(&paint(style, " [NEXT BOOT]"));
            }
            line
        })
        .collect();

    let title = paint(Style::new().bold(), OVERVIEW_TITLE);
    let mut out = framed(&[title], true);
    out.push('\n');
    out.push_str(&framed(&lines, false));
    out
}

fn framed(lines: &[String], centered: bool) -> String {
    let inner = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0)
        .max(BOX_WIDTH - 4);
    let rule = "─".repeat(inner + 2);

    let mut out = format!("┌{}┐\n", rule);
    for line in lines {
        let gap = inner - measure_text_width(line);
        let (left, right) = if centered {
            (gap / 2, gap - gap / 2)
        } else {
            (0, gap)
        };
        out.push_str(&format!(
            "│ {}{}{} │\n",
            " ".repeat(left),
            line,
            " ".repeat(right)
        ));
    }
    out.push_str(&format!("└{}┘", rule));
    out
}
