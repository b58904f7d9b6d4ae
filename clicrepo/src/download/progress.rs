//! Progress reporting for the download phase.

/// Progress callback invoked after every successful download.
pub type DownloadProgressFn<'a> = dyn Fn(&DownloadProgress) + Send + Sync + 'a;

/// Snapshot emitted after each completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Tasks completed so far.
    pub completed: usize,
    /// Total number of tasks in the run.
    pub total: usize,
    /// Archive name of the task that just completed.
    pub last_entry: String,
}

impl DownloadProgress {
    /// Progress as a whole percentage (0-100).
    pub fn percent(&self) -> u8 {
        percent(self.completed, self.total)
    }
}

/// Whole percentage of `done` over `total`, 100 when there is nothing to do.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(1, 3), 33);
    }

    #[test]
    fn test_percent_empty_and_overflow() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(7, 5), 100);
    }

    #[test]
    fn test_download_progress_percent() {
        let progress = DownloadProgress {
            completed: 5,
            total: 20,
            last_entry: "img1.png".to_string(),
        };
        assert_eq!(progress.percent(), 25);
    }
}
