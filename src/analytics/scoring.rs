//! Heuristic scan quality score

use crate::analytics::models::{Browser, DeviceInfo, DeviceType};

const BASE_SCORE: i32 = 50;
const MOBILE_BONUS: i32 = 20;
const TABLET_BONUS: i32 = 10;
const MODERN_BROWSER_BONUS: i32 = 10;
const DIRECT_BONUS: i32 = 15;
const FAST_BONUS: i32 = 5;
const SLOW_PENALTY: i32 = 10;

const FAST_LATENCY_MS: u64 = 100;
const SLOW_LATENCY_MS: u64 = 500;

/// Compute a quality score in `[0, 100]`.
///
/// A latency of `Some(0)` counts as absent, matching how the redirect
/// handler reports sub-millisecond handling.
pub fn calculate_quality_score(
    device: &DeviceInfo,
    browser: Browser,
    referrer: &str,
    latency_ms: Option<u64>,
) -> u8 {
    let mut score = BASE_SCORE;

    match device.device_type {
        DeviceType::Mobile => score += MOBILE_BONUS,
        DeviceType::Tablet => score += TABLET_BONUS,
        DeviceType::Desktop | DeviceType::Unknown => {}
    }

    if matches!(browser, Browser::Chrome | Browser::Safari | Browser::Edge) {
        score += MODERN_BROWSER_BONUS;
    }

    if referrer == "none" || referrer == "direct" {
        score += DIRECT_BONUS;
    }

    if let Some(latency) = latency_ms.filter(|&l| l > 0) {
        if latency < FAST_LATENCY_MS {
            score += FAST_BONUS;
        }
        if latency > SLOW_LATENCY_MS {
            score -= SLOW_PENALTY;
        }
    }

    score.clamp(0, 100) as u8
}
