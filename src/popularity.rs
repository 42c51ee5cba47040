//! Star ratings from download ranks.
//!
//! The collection, sorted by descending downloads, is cut into five bands by
//! position. A band boundary only takes effect where the download count
//! actually drops, so books with equal counts never land on different star
//! levels.

/// Number of star levels.
pub const NB_POPULARITY_STARS: usize = 5;

/// Minimum download count per star level; `limits[i]` gates star `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopularityThresholds {
    limits: [u64; NB_POPULARITY_STARS],
}

impl PopularityThresholds {
    /// Compute thresholds from download counts sorted in descending order.
    ///
    /// When every count is equal no boundary ever takes effect, all limits
    /// stay at zero and every book gets the top rating.
    pub fn compute(downloads_desc: &[u64]) -> Self {
        let mut limits = [0u64; NB_POPULARITY_STARS];
        let Some(&first) = downloads_desc.first() else {
            return Self { limits };
        };

        let total = downloads_desc.len() as f64;
        let nb_stars = NB_POPULARITY_STARS as f64;
        let mut stars = NB_POPULARITY_STARS;
        let mut previous = first;

        for (rank, &downloads) in downloads_desc.iter().enumerate() {
            let band_start = (nb_stars - stars as f64 + 1.0) / nb_stars * total;
            if stars > 1 && rank as f64 > band_start && downloads < previous {
                limits[stars - 1] = previous;
                stars -= 1;
            }
            previous = downloads;
        }

        Self { limits }
    }

    pub fn limits(&self) -> &[u64; NB_POPULARITY_STARS] {
        &self.limits
    }

    /// Number of thresholds `downloads` meets or exceeds (1..=5).
    pub fn stars_for(&self, downloads: u64) -> u8 {
        self.limits.iter().filter(|&&limit| downloads >= limit).count() as u8
    }
}
