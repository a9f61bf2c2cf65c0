//! Run summaries and the score board model
//!
//! The HTTP leaderboard service is an external collaborator. This module
//! owns its input contract ([`RunSummary`], the terminal event of a run),
//! the ranking and pagination rules both sides agree on, and a local board
//! used as the degraded-mode fallback when the service is unreachable.

use serde::{Deserialize, Serialize};

/// Everything the persistence API needs about a finished run.
///
/// `defeated_boss` is authoritative for time-board eligibility; no
/// score-based completion inference happens anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub coins: u64,
    /// Active-play time in whole seconds
    pub time_secs: u64,
    /// True only if the final boss went down this run
    pub defeated_boss: bool,
}

impl RunSummary {
    /// JSON body for the submission endpoint
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Which ranking a board query uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankKind {
    /// Highest score first
    Score,
    /// Fastest completed run first; restricted to runs that beat the boss
    Time,
}

/// One page of ranked results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub entries: Vec<RunSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Local score board; mirrors the remote service's filtering rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<RunSummary>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record a run. Zero-score runs are dropped, matching the service's
    /// `score > 0` filter. Returns the 1-indexed score rank when stored.
    pub fn add(&mut self, summary: RunSummary) -> Option<usize> {
        if summary.score == 0 {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .filter(|e| e.score > summary.score)
            .count()
            + 1;
        self.entries.push(summary);
        Some(rank)
    }

    /// Rank a prospective score would earn, 1-indexed
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        Some(self.entries.iter().filter(|e| e.score > score).count() + 1)
    }

    /// Ranked, paginated query. `page` is 1-indexed; an out-of-range page
    /// returns an empty entry list with correct totals.
    pub fn page(&self, kind: RankKind, page: usize, per_page: usize) -> Page {
        let mut filtered: Vec<&RunSummary> = self
            .entries
            .iter()
            .filter(|e| e.score > 0)
            .filter(|e| kind != RankKind::Time || e.defeated_boss)
            .collect();

        match kind {
            RankKind::Score => filtered.sort_by(|a, b| b.score.cmp(&a.score)),
            RankKind::Time => filtered.sort_by(|a, b| a.time_secs.cmp(&b.time_secs)),
        }

        let total_items = filtered.len();
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.max(1);
        let start = (page - 1) * per_page;
        let entries = filtered
            .into_iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Page {
            entries,
            page,
            total_pages,
            total_items,
        }
    }
}

/// A board query result tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub enum BoardView {
    /// Fresh from the remote service
    Live(Page),
    /// Service unreachable; serving the local board instead
    Degraded(Page),
}

impl BoardView {
    /// Fold a remote fetch result into a view, falling back to the local
    /// board when the collaborator failed. A failure never propagates.
    pub fn from_remote(
        remote: Option<Page>,
        local: &Leaderboard,
        kind: RankKind,
        page: usize,
        per_page: usize,
    ) -> Self {
        match remote {
            Some(page) => BoardView::Live(page),
            None => {
                log::warn!("leaderboard service unreachable, serving local board");
                BoardView::Degraded(local.page(kind, page, per_page))
            }
        }
    }

    pub fn page(&self) -> &Page {
        match self {
            BoardView::Live(p) | BoardView::Degraded(p) => p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BoardView::Degraded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, score: u64, time_secs: u64, defeated: bool) -> RunSummary {
        RunSummary {
            name: name.to_string(),
            score,
            level: if defeated { 6 } else { 3 },
            coins: score / 10,
            time_secs,
            defeated_boss: defeated,
        }
    }

    #[test]
    fn score_board_ranks_descending() {
        let mut board = Leaderboard::new();
        board.add(run("a", 100, 300, false));
        board.add(run("b", 500, 200, true));
        board.add(run("c", 300, 100, false));
        let page = board.page(RankKind::Score, 1, 10);
        let names: Vec<_> = page.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn time_board_only_lists_completed_runs() {
        let mut board = Leaderboard::new();
        board.add(run("slow-winner", 900, 2000, true));
        board.add(run("fast-loser", 900, 100, false));
        board.add(run("fast-winner", 900, 500, true));
        let page = board.page(RankKind::Time, 1, 10);
        let names: Vec<_> = page.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["fast-winner", "slow-winner"]);
    }

    #[test]
    fn zero_score_runs_are_dropped() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(run("nobody", 0, 10, false)), None);
        assert!(board.is_empty());
    }

    #[test]
    fn add_reports_rank() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(run("a", 100, 0, false)), Some(1));
        assert_eq!(board.add(run("b", 500, 0, false)), Some(1));
        assert_eq!(board.add(run("c", 300, 0, false)), Some(2));
        assert_eq!(board.potential_rank(1000), Some(1));
        assert_eq!(board.potential_rank(0), None);
    }

    #[test]
    fn pagination_math() {
        let mut board = Leaderboard::new();
        for i in 1..=12 {
            board.add(run(&format!("p{i}"), i * 10, 0, false));
        }
        let page = board.page(RankKind::Score, 3, 5);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.entries.len(), 2);

        let beyond = board.page(RankKind::Score, 9, 5);
        assert!(beyond.entries.is_empty());
        assert_eq!(beyond.total_pages, 3);

        let empty = Leaderboard::new().page(RankKind::Time, 1, 5);
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.total_items, 0);
    }

    #[test]
    fn remote_failure_degrades_to_local() {
        let mut board = Leaderboard::new();
        board.add(run("local-hero", 700, 0, false));
        let view = BoardView::from_remote(None, &board, RankKind::Score, 1, 5);
        assert!(view.is_degraded());
        assert_eq!(view.page().entries[0].name, "local-hero");

        let live = BoardView::from_remote(
            Some(board.page(RankKind::Score, 1, 5)),
            &board,
            RankKind::Score,
            1,
            5,
        );
        assert!(!live.is_degraded());
    }

    #[test]
    fn payload_round_trips() {
        let summary = run("ace", 4200, 777, true);
        let json = summary.to_payload().unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
        assert!(json.contains("\"defeated_boss\":true"));
    }
}
