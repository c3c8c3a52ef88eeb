//! Display formatting helpers

/// Humanizes a star count for table output: 950, 1.2K, 34K, 1.5M.
///
/// Rounds half-up at each magnitude, matching what readers expect from
/// GitHub's own badges.
pub fn format_stars(stars: u32) -> String {
    if stars < 1_000 {
        stars.to_string()
    } else if stars < 10_000 {
        let tenths = (stars + 50) / 100;
        if tenths % 10 == 0 {
            format!("{}K", tenths / 10)
        } else {
            format!("{}.{}K", tenths / 10, tenths % 10)
        }
    } else if stars < 1_000_000 {
        format!("{}K", (stars + 500) / 1_000)
    } else {
        let tenths = (stars + 50_000) / 100_000;
        if tenths % 10 == 0 {
            format!("{}M", tenths / 10)
        } else {
            format!("{}.{}M", tenths / 10, tenths % 10)
        }
    }
}
