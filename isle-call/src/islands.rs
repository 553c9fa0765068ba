//! Gap-based merging of windows into islands.

use crate::models::{Island, Window};
use crate::windows::{ChromWindows, window_bounds};

///
/// Merges the non-empty windows of a chromosome into islands: two windows
/// belong to the same island when at most `gap_windows` empty windows
/// separate them.
///
#[derive(Debug, Clone, Copy)]
pub struct IslandBuilder {
    gap_windows: u64,
    window_size: u64,
}

struct OpenIsland {
    start_window: u64,
    end_window: u64,
    window_count: u32,
    read_count: u64,
}

impl OpenIsland {
    fn open(window: &Window) -> Self {
        OpenIsland {
            start_window: window.index,
            end_window: window.index,
            window_count: 1,
            read_count: window.count as u64,
        }
    }
}

impl IslandBuilder {
    pub fn new(gap_windows: u64, window_size: u64) -> Self {
        IslandBuilder {
            gap_windows,
            window_size,
        }
    }

    ///
    /// Single streaming pass over windows sorted by index. Closed islands are
    /// never revisited.
    ///
    pub fn build(&self, chrom: &ChromWindows) -> Vec<Island> {
        let mut islands = Vec::new();
        let mut current: Option<OpenIsland> = None;

        for window in &chrom.windows {
            current = Some(match current.take() {
                Some(mut open) if window.index - open.end_window <= self.gap_windows + 1 => {
                    open.end_window = window.index;
                    open.window_count += 1;
                    open.read_count += window.count as u64;
                    open
                }
                Some(closed) => {
                    islands.push(self.close(chrom, closed));
                    OpenIsland::open(window)
                }
                None => OpenIsland::open(window),
            });
        }

        if let Some(open) = current {
            islands.push(self.close(chrom, open));
        }

        islands
    }

    fn close(&self, chrom: &ChromWindows, open: OpenIsland) -> Island {
        let (start, _) = window_bounds(open.start_window, self.window_size, chrom.length);
        let (_, end) = window_bounds(open.end_window, self.window_size, chrom.length);

        Island {
            chr: chrom.chr.clone(),
            start_window: open.start_window,
            end_window: open.end_window,
            start,
            end,
            window_count: open.window_count,
            read_count: open.read_count,
        }
    }
}
