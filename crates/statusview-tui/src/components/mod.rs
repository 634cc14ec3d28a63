pub mod detail_tabs;
pub mod project_table;

use ratatui::prelude::*;
use statusview_core::metrics::Progress;
use statusview_core::normalize::PLACEHOLDER;
use statusview_core::view::{HealthBadge, Tone};
use statusview_core::HealthClass;

pub(crate) fn health_style(class: HealthClass) -> Style {
    match class {
        HealthClass::Green => Style::default().fg(Color::Green),
        HealthClass::Yellow => Style::default().fg(Color::Yellow),
        HealthClass::Red => Style::default().fg(Color::Red).bold(),
        HealthClass::Blue => Style::default().fg(Color::Blue),
    }
}

pub(crate) fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Neutral => Style::default(),
        Tone::Good => Style::default().fg(Color::Green),
        Tone::Bad => Style::default().fg(Color::Red).bold(),
    }
}

pub(crate) fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Colored dot plus label, or a "no status" mark.
pub(crate) fn badge_line(badge: Option<&HealthBadge>) -> Line<'static> {
    match badge {
        Some(badge) => Line::from(vec![
            Span::styled("● ", health_style(badge.class)),
            Span::raw(badge.label.clone()),
        ]),
        None => Line::from(Span::styled("⊘", dim())),
    }
}

/// Text progress bar of `cells` characters followed by the label.
pub(crate) fn progress_line(progress: Option<&Progress>, cells: usize) -> Line<'static> {
    let Some(progress) = progress else {
        return Line::from(Span::styled(PLACEHOLDER, dim()));
    };
    let filled = ((progress.width / 100.0) * cells as f64).round() as usize;
    let filled = filled.min(cells);
    let color = if progress.over { Color::Red } else { Color::Cyan };
    Line::from(vec![
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled("░".repeat(cells - filled), dim()),
        Span::raw(format!(" {}", progress.label)),
    ])
}
