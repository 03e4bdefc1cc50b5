use std::fmt;
use std::time::Duration;

use derive_more::with_trait::Display;

use crate::modules::panel::{Controls, LogPane, PanelState};
use crate::modules::types::{Notice, RankTier, RunStatus, Tone};

/// Delay between the reveal of consecutive keyword rows.
pub const ROW_STAGGER: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub status: StatusView,
    pub controls: Controls,
    pub logs: LogView,
    pub run_message: Option<Notice>,
    pub keywords: KeywordsView,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("[{label}] ({tone})")]
pub struct StatusView {
    pub label: &'static str,
    pub tone: Tone,
    pub pid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogView {
    pub text: String,
    pub failed: bool,
    pub scroll_to_bottom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordsView {
    pub selected_date: Option<String>,
    pub loading: bool,
    pub message: Option<Notice>,
    /// `None` while the table is hidden.
    pub table: Option<Vec<RowView>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub rank: u32,
    pub keyword: String,
    pub tier: RankTier,
    pub tone: Tone,
    pub reveal_delay: Duration,
}

pub fn render(state: &PanelState) -> View {
    View {
        status: status_view(state.status),
        controls: state.controls,
        logs: LogView {
            text: state.logs.text().to_string(),
            failed: state.logs == LogPane::Failed,
            scroll_to_bottom: true,
        },
        run_message: state.run_message.clone(),
        keywords: KeywordsView {
            selected_date: state.selected_date.clone(),
            loading: state.keywords.loading,
            message: state.keywords.message.clone(),
            table: state.keywords.table_visible.then(|| {
                state
                    .keywords
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| RowView {
                        rank: entry.rank,
                        keyword: entry.keyword.clone(),
                        tier: entry.tier(),
                        tone: entry.tier().tone(),
                        reveal_delay: ROW_STAGGER * index as u32,
                    })
                    .collect()
            }),
        },
    }
}

pub fn status_view(status: RunStatus) -> StatusView {
    match status {
        RunStatus::Running { pid } => StatusView {
            label: "Running",
            tone: Tone::Success,
            pid,
        },
        RunStatus::Idle => StatusView {
            label: "Idle",
            tone: Tone::Warning,
            pid: None,
        },
        RunStatus::Unknown => StatusView {
            label: "Status unavailable",
            tone: Tone::Danger,
            pid: None,
        },
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Scrape job ==")?;
        write!(f, "status:   {}", self.status)?;
        if let Some(pid) = self.status.pid {
            write!(f, " pid {pid}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "controls: run={} stop={}",
            on_off(self.controls.run_enabled),
            on_off(self.controls.stop_enabled)
        )?;
        if let Some(message) = &self.run_message {
            writeln!(f, "message:  {message}")?;
        }

        writeln!(f, "== Logs ==")?;
        f.write_str(&self.logs.text)?;
        if !self.logs.text.is_empty() && !self.logs.text.ends_with('\n') {
            writeln!(f)?;
        }

        writeln!(f, "== Keywords ==")?;
        writeln!(
            f,
            "date:     {}",
            self.keywords.selected_date.as_deref().unwrap_or("-")
        )?;
        if self.keywords.loading {
            writeln!(f, "loading...")?;
        }
        if let Some(message) = &self.keywords.message {
            writeln!(f, "{message}")?;
        }
        if let Some(rows) = &self.keywords.table {
            for row in rows {
                writeln!(f, "{:>4} {:<6} {}", row.rank, row.tier.to_string(), row.keyword)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::panel::Ticket;
    use crate::modules::types::KeywordEntry;

    #[test]
    fn status_maps_to_badge_and_controls() {
        let mut state = PanelState::default();
        state.apply_status(Ticket::default(), RunStatus::Running { pid: Some(9) });
        let view = render(&state);
        assert_eq!(view.status.tone, Tone::Success);
        assert_eq!(view.status.pid, Some(9));
        assert!(!view.controls.run_enabled);
        assert!(view.controls.stop_enabled);

        state.apply_status(Ticket::default(), RunStatus::Idle);
        let view = render(&state);
        assert_eq!(view.status.tone, Tone::Warning);
        assert!(view.controls.run_enabled);
        assert!(!view.controls.stop_enabled);

        state.apply_status(Ticket::default(), RunStatus::Unknown);
        let view = render(&state);
        assert_eq!(view.status.tone, Tone::Danger);
        assert!(!view.controls.run_enabled);
        assert!(!view.controls.stop_enabled);
    }

    #[test]
    fn rows_carry_tier_and_stagger() {
        let mut state = PanelState::default();
        state.begin_keywords(Ticket::default());
        state.finish_keywords(
            Ticket::default(),
            "2024-06-01",
            Ok(vec![KeywordEntry::new(1, "foo"), KeywordEntry::new(11, "bar")]),
            Notice::secondary("none"),
        );
        let rows = render(&state).keywords.table.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tier, RankTier::Top3);
        assert_eq!(rows[0].reveal_delay, Duration::ZERO);
        assert_eq!(rows[1].tier, RankTier::Other);
        assert_eq!(rows[1].reveal_delay, ROW_STAGGER);
        assert_ne!(rows[0].tone, rows[1].tone);
    }

    #[test]
    fn hidden_table_renders_as_none() {
        let view = render(&PanelState::default());
        assert!(view.keywords.table.is_none());
        assert!(!view.keywords.loading);
    }

    #[test]
    fn log_text_is_printed_verbatim() {
        let mut state = PanelState::default();
        let text = "<b>line 1</b>\n  line & 2\n";
        state.apply_logs(Ticket::default(), LogPane::Text(text.to_string()));
        let view = render(&state);
        assert_eq!(view.logs.text, text);
        assert!(view.logs.scroll_to_bottom);
        assert!(view.to_string().contains(text));
    }

    #[test]
    fn text_output_lists_status_and_rows() {
        let mut state = PanelState::default();
        state.apply_status(Ticket::default(), RunStatus::Idle);
        state.selected_date = Some("2024-06-01".to_string());
        state.begin_keywords(Ticket::default());
        state.finish_keywords(
            Ticket::default(),
            "2024-06-01",
            Ok(vec![KeywordEntry::new(2, "foo")]),
            Notice::secondary("none"),
        );
        let out = render(&state).to_string();
        assert!(out.contains("status:   [Idle] (warning)"));
        assert!(out.contains("controls: run=on stop=off"));
        assert!(out.contains("date:     2024-06-01"));
        assert!(out.contains("   2 top3   foo"));
    }
}
