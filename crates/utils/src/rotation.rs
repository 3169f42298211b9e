//! Time-bucketed seeded shuffling for directory listings.
//!
//! Public listings rotate their order periodically so every listed entry gets a
//! turn near the top. Within one time bucket the order is fixed, which keeps
//! "next page" navigation consistent while someone is browsing.
//!
//! The pipeline is `paginate(permute(ids, seed), page, page_size)` where the seed
//! comes from a [`RotationWindow`]. [`Rotation`] bundles a window with a page size
//! so each listing configures it once.

use chrono::DateTime;
use serde::Serialize;
use ts_rs::TS;

use crate::clock::Clock;

pub const FIVE_MINUTES_MS: i64 = 5 * 60 * 1000;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Quantize `now_ms` into a bucket index of `bucket_width_ms` milliseconds.
///
/// Uses floor division so instants before the epoch still land in a stable bucket.
pub fn derive_seed(bucket_width_ms: i64, now_ms: i64) -> i64 {
    debug_assert!(bucket_width_ms > 0, "bucket width must be positive");
    now_ms.div_euclid(bucket_width_ms.max(1))
}

/// Seed that changes once per UTC calendar day.
///
/// The `YYYY-MM-DD` date string is hashed, so any time of day maps to the same seed.
pub fn day_seed(now_ms: i64) -> i64 {
    i64::from(hash_date_key(&date_key(now_ms)))
}

/// ISO calendar date (UTC) for a millisecond timestamp.
pub fn date_key(now_ms: i64) -> String {
    DateTime::from_timestamp_millis(now_ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

/// 32-bit FNV-1a over the bytes of `key`.
pub fn hash_date_key(key: &str) -> u32 {
    key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Mulberry32 generator. Small, fast and fully reproducible from a 32-bit seed.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Any `i64` is accepted; it is wrapped into the unsigned 32-bit domain.
    pub fn new(seed: i64) -> Self {
        Self { state: seed as u32 }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }
}

/// Fisher-Yates shuffle of `ids` driven by [`Mulberry32`].
///
/// The result depends only on the input order and `seed`.
pub fn permute<T: Clone>(ids: &[T], seed: i64) -> Vec<T> {
    let mut out = ids.to_vec();
    if out.len() < 2 {
        return out;
    }

    let mut rng = Mulberry32::new(seed);
    for i in (1..out.len()).rev() {
        let j = (rng.next_f64() * (i + 1) as f64) as usize;
        out.swap(i, j);
    }
    out
}

/// One page of a rotated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct Page<T> {
    pub page_number: usize,
    pub page_size: usize,
    pub items: Vec<T>,
    pub has_next: bool,
}

/// Slice page `page_number` (1-based) out of an already permuted sequence.
///
/// Page numbers below 1 are clamped to 1. Pages past the end are empty with
/// `has_next == false`. A zero page size is a configuration bug and trips a
/// debug assertion; release builds treat it as 1.
pub fn paginate<T: Clone>(permuted: &[T], page_number: usize, page_size: usize) -> Page<T> {
    debug_assert!(page_size > 0, "page size must be positive");
    let page_size = page_size.max(1);
    let page_number = page_number.max(1);

    let offset = (page_number - 1).saturating_mul(page_size);
    let items = permuted
        .get(offset..)
        .map(|rest| rest.iter().take(page_size).cloned().collect())
        .unwrap_or_default();

    Page {
        page_number,
        page_size,
        items,
        has_next: permuted.len() > page_number.saturating_mul(page_size),
    }
}

/// Parse a 1-based page number from untrusted query-string input.
///
/// Missing, unparsable and non-positive values all fall back to page 1.
pub fn parse_page_number(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// How often a listing reshuffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationWindow {
    /// Fixed-width buckets of wall-clock time.
    Bucket { width_ms: i64 },
    /// Once per UTC calendar day.
    CalendarDay,
}

impl RotationWindow {
    pub fn seed(&self, now_ms: i64) -> i64 {
        match self {
            Self::Bucket { width_ms } => derive_seed(*width_ms, now_ms),
            Self::CalendarDay => day_seed(now_ms),
        }
    }
}

/// Rotation settings for one listing: when to reshuffle and how many per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub window: RotationWindow,
    pub page_size: usize,
}

impl Rotation {
    /// Consultant directory: reshuffles every five minutes, 15 per page.
    pub const CONSULTANTS: Rotation = Rotation::new(
        RotationWindow::Bucket {
            width_ms: FIVE_MINUTES_MS,
        },
        15,
    );

    /// Talent hub: reshuffles once a day, 12 per page.
    pub const TALENT_HUB: Rotation = Rotation::new(RotationWindow::CalendarDay, 12);

    pub const fn new(window: RotationWindow, page_size: usize) -> Self {
        Self { window, page_size }
    }

    pub fn seed(&self, clock: &dyn Clock) -> i64 {
        self.window.seed(clock.now_ms())
    }

    /// Shuffle `ids` with `seed` and cut out the requested page.
    pub fn page_at<T: Clone>(&self, ids: &[T], page_number: usize, seed: i64) -> Page<T> {
        paginate(&permute(ids, seed), page_number, self.page_size)
    }

    pub fn page<T: Clone>(&self, ids: &[T], page_number: usize, clock: &dyn Clock) -> Page<T> {
        self.page_at(ids, page_number, self.seed(clock))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::clock::FixedClock;

    const JUNE_1_2024_MS: i64 = 1_717_200_000_000;
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn letters() -> Vec<char> {
        vec!['A', 'B', 'C', 'D', 'E']
    }

    #[test]
    fn test_permute_reference_output() {
        assert_eq!(permute(&letters(), 42), vec!['A', 'E', 'C', 'B', 'D']);
        assert_eq!(permute(&letters(), 43), vec!['C', 'A', 'D', 'B', 'E']);
    }

    #[test]
    fn test_reference_pages() {
        let permuted = permute(&letters(), 42);

        let first = paginate(&permuted, 1, 2);
        assert_eq!(first.items, vec!['A', 'E']);
        assert!(first.has_next);

        let last = paginate(&permuted, 3, 2);
        assert_eq!(last.items, vec!['D']);
        assert!(!last.has_next);
    }

    #[test]
    fn test_permute_is_deterministic() {
        let ids: Vec<u32> = (0..50).collect();
        for seed in [0, 1, 42, 300_000, i64::from(u32::MAX), -7] {
            assert_eq!(permute(&ids, seed), permute(&ids, seed));
        }
    }

    #[test]
    fn test_permute_preserves_elements() {
        let ids: Vec<String> = (0..37).map(|n| format!("consultant-{n}")).collect();
        for seed in 0..64 {
            let shuffled = permute(&ids, seed);
            assert_eq!(shuffled.len(), ids.len());
            let unique: HashSet<&String> = shuffled.iter().collect();
            assert_eq!(unique.len(), ids.len());
            assert!(ids.iter().all(|id| unique.contains(id)));
        }
    }

    #[test]
    fn test_permute_is_seed_sensitive() {
        let ids: Vec<u32> = (0..8).collect();
        let same = (0..500i64)
            .filter(|seed| permute(&ids, *seed) == permute(&ids, seed * 7_919 + 13))
            .count();
        assert!(same <= 5, "{same} of 500 seed pairs produced identical orders");

        let adjacent = (0..500i64)
            .filter(|seed| permute(&ids, *seed) == permute(&ids, seed + 1))
            .count();
        assert!(adjacent <= 5, "{adjacent} of 500 adjacent seeds collided");
    }

    #[test]
    fn test_permute_negative_seed_wraps() {
        assert_eq!(permute(&letters(), -1), permute(&letters(), i64::from(u32::MAX)));
        assert_eq!(permute(&letters(), -1), vec!['D', 'B', 'C', 'A', 'E']);
    }

    #[test]
    fn test_permute_empty_and_singleton() {
        let empty: Vec<u8> = Vec::new();
        assert!(permute(&empty, 99).is_empty());
        for seed in [-3, 0, 12_345] {
            assert_eq!(permute(&["only"], seed), vec!["only"]);
        }
    }

    #[test]
    fn test_derive_seed_bucket_stability() {
        let start = 5_000 * FIVE_MINUTES_MS;
        assert_eq!(
            derive_seed(FIVE_MINUTES_MS, start),
            derive_seed(FIVE_MINUTES_MS, start + FIVE_MINUTES_MS - 1)
        );
        assert_ne!(
            derive_seed(FIVE_MINUTES_MS, start - 1),
            derive_seed(FIVE_MINUTES_MS, start)
        );
        assert_eq!(derive_seed(FIVE_MINUTES_MS, start), 5_000);
    }

    #[test]
    fn test_derive_seed_floors_before_epoch() {
        assert_eq!(derive_seed(FIVE_MINUTES_MS, -1), -1);
        assert_eq!(derive_seed(FIVE_MINUTES_MS, -FIVE_MINUTES_MS), -1);
        assert_eq!(derive_seed(FIVE_MINUTES_MS, -FIVE_MINUTES_MS - 1), -2);
    }

    #[test]
    fn test_day_seed_ignores_time_of_day() {
        let morning = JUNE_1_2024_MS + 60_000;
        let night = JUNE_1_2024_MS + DAY_MS - 1;
        assert_eq!(date_key(morning), "2024-06-01");
        assert_eq!(day_seed(morning), day_seed(night));
        assert_eq!(day_seed(morning), 1_279_870_326);
        assert_ne!(day_seed(night), day_seed(night + 1));
    }

    #[test]
    fn test_pages_cover_permutation_without_overlap() {
        let ids: Vec<u32> = (0..47).collect();
        let permuted = permute(&ids, 2024);
        let page_size = 15;
        let pages = permuted.len().div_ceil(page_size);

        let mut joined = Vec::new();
        for page_number in 1..=pages {
            let page = paginate(&permuted, page_number, page_size);
            assert!(page.items.len() <= page_size);
            assert_eq!(page.has_next, page_number < pages);
            joined.extend(page.items);
        }
        assert_eq!(joined, permuted);
    }

    #[test]
    fn test_has_next_on_exact_boundary() {
        let ids: Vec<u32> = (0..30).collect();
        assert!(paginate(&ids, 1, 15).has_next);
        assert!(!paginate(&ids, 2, 15).has_next);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = paginate(&letters(), 9, 2);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.page_number, 9);
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let page = paginate(&letters(), 0, 2);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.items, vec!['A', 'B']);
    }

    #[test]
    #[should_panic(expected = "page size must be positive")]
    fn test_zero_page_size_panics_in_debug() {
        let _ = paginate(&letters(), 1, 0);
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("3")), 3);
        assert_eq!(parse_page_number(Some(" 4 ")), 4);
        assert_eq!(parse_page_number(Some("0")), 1);
        assert_eq!(parse_page_number(Some("-2")), 1);
        assert_eq!(parse_page_number(Some("two")), 1);
        assert_eq!(parse_page_number(Some("")), 1);
    }

    #[test]
    fn test_rotation_stable_within_bucket() {
        let ids: Vec<u32> = (0..40).collect();
        let rotation = Rotation::CONSULTANTS;
        let clock = FixedClock::new(7_000 * FIVE_MINUTES_MS);

        let first = rotation.page(&ids, 1, &clock);
        clock.advance(FIVE_MINUTES_MS - 1);
        assert_eq!(rotation.page(&ids, 1, &clock), first);

        clock.advance(1);
        assert_ne!(rotation.page(&ids, 1, &clock).items, first.items);
        assert_eq!(first.items.len(), 15);
    }

    #[test]
    fn test_talent_hub_rotates_daily() {
        let ids: Vec<u32> = (0..40).collect();
        let rotation = Rotation::TALENT_HUB;
        let clock = FixedClock::new(JUNE_1_2024_MS);

        let seed = rotation.seed(&clock);
        clock.advance(DAY_MS - 1);
        assert_eq!(rotation.seed(&clock), seed);
        clock.advance(1);
        assert_ne!(rotation.seed(&clock), seed);
        assert_eq!(rotation.page(&ids, 1, &clock).items.len(), 12);
    }
}
