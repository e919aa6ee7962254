//! User-agent classification
//!
//! Device detection is an ordered table of keyword rules evaluated
//! first-match-wins against the lower-cased user-agent. The order is a
//! policy: the legacy order checks mobile keywords before tablet keywords,
//! so an iPad user-agent carrying "Mobile" is reported as an iOS phone.

use serde::{Deserialize, Serialize};

use crate::analytics::models::{Browser, DeviceInfo, DeviceType};

/// A single device rule: matches when any keyword occurs in the user-agent
#[derive(Debug, Clone, Copy)]
pub struct DeviceRule {
    pub keywords: &'static [&'static str],
    resolve: fn(&str) -> DeviceInfo,
}

impl DeviceRule {
    pub const fn new(keywords: &'static [&'static str], resolve: fn(&str) -> DeviceInfo) -> Self {
        Self { keywords, resolve }
    }

    /// Resolve against an already lower-cased user-agent
    fn apply(&self, ua: &str) -> Option<DeviceInfo> {
        if self.keywords.iter().any(|k| ua.contains(k)) {
            Some((self.resolve)(ua))
        } else {
            None
        }
    }
}

fn resolve_mobile(ua: &str) -> DeviceInfo {
    if ["iphone", "ipad", "ipod"].iter().any(|k| ua.contains(k)) {
        DeviceInfo::new(DeviceType::Mobile, "iOS", "Apple")
    } else if ua.contains("android") {
        DeviceInfo::new(DeviceType::Mobile, "Android", "Google")
    } else {
        DeviceInfo::new(DeviceType::Mobile, "other", "unknown")
    }
}

fn resolve_tablet(_ua: &str) -> DeviceInfo {
    DeviceInfo::new(DeviceType::Tablet, "unknown", "unknown")
}

fn resolve_windows(_ua: &str) -> DeviceInfo {
    DeviceInfo::new(DeviceType::Desktop, "Windows", "Microsoft")
}

fn resolve_mac(_ua: &str) -> DeviceInfo {
    DeviceInfo::new(DeviceType::Desktop, "macOS", "Apple")
}

fn resolve_linux(_ua: &str) -> DeviceInfo {
    DeviceInfo::new(DeviceType::Desktop, "Linux", "Open")
}

pub const MOBILE_RULE: DeviceRule = DeviceRule::new(
    &["mobile", "android", "iphone", "ipod", "blackberry", "windows phone"],
    resolve_mobile,
);
pub const TABLET_RULE: DeviceRule = DeviceRule::new(&["tablet", "ipad"], resolve_tablet);
pub const WINDOWS_RULE: DeviceRule = DeviceRule::new(&["windows"], resolve_windows);
pub const MAC_RULE: DeviceRule = DeviceRule::new(&["mac"], resolve_mac);
pub const LINUX_RULE: DeviceRule = DeviceRule::new(&["linux"], resolve_linux);

/// Browser rules in priority order. Safari is reached only when no
/// Chrome token was present because Chrome is checked first.
const BROWSER_RULES: &[(&[&str], Browser)] = &[
    (&["edg"], Browser::Edge),
    (&["chrome"], Browser::Chrome),
    (&["safari"], Browser::Safari),
    (&["firefox"], Browser::Firefox),
    (&["opera", "opr"], Browser::Opera),
];

/// Evaluation order for the mobile and tablet rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePolicy {
    /// Mobile keywords first; iPads that say "Mobile" classify as iOS phones
    #[default]
    MobileFirst,
    /// Tablet keywords first; every iPad classifies as a tablet
    TabletFirst,
}

impl DevicePolicy {
    pub fn rules(&self) -> Vec<DeviceRule> {
        match self {
            DevicePolicy::MobileFirst => {
                vec![MOBILE_RULE, TABLET_RULE, WINDOWS_RULE, MAC_RULE, LINUX_RULE]
            }
            DevicePolicy::TabletFirst => {
                vec![TABLET_RULE, MOBILE_RULE, WINDOWS_RULE, MAC_RULE, LINUX_RULE]
            }
        }
    }
}

/// Classifies user-agents into device and browser families
#[derive(Debug, Clone)]
pub struct UaClassifier {
    rules: Vec<DeviceRule>,
}

impl UaClassifier {
    pub fn new(policy: DevicePolicy) -> Self {
        Self::with_rules(policy.rules())
    }

    pub fn with_rules(rules: Vec<DeviceRule>) -> Self {
        Self { rules }
    }

    /// Detect the device for a user-agent. Never fails; unmatched input
    /// yields an all-"unknown" device.
    pub fn detect_device(&self, user_agent: &str) -> DeviceInfo {
        let ua = user_agent.to_lowercase();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(&ua))
            .unwrap_or_else(DeviceInfo::unknown)
    }

    pub fn detect_browser(&self, user_agent: &str) -> Browser {
        let ua = user_agent.to_lowercase();
        BROWSER_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| ua.contains(k)))
            .map(|(_, browser)| *browser)
            .unwrap_or(Browser::Other)
    }
}

impl Default for UaClassifier {
    fn default() -> Self {
        Self::new(DevicePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const WINDOWS_EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";

    #[test]
    fn test_iphone_is_ios_mobile() {
        let device = UaClassifier::default().detect_device(IPHONE_UA);
        assert_eq!(device, DeviceInfo::new(DeviceType::Mobile, "iOS", "Apple"));
    }

    #[test]
    fn test_iphone_with_tablet_token_stays_mobile() {
        let device = UaClassifier::default().detect_device("Some iPhone Tablet Browser");
        assert_eq!(device.device_type, DeviceType::Mobile);
        assert_eq!(device.os, "iOS");
    }

    #[test]
    fn test_ipad_quirk_under_mobile_first_policy() {
        let device = UaClassifier::new(DevicePolicy::MobileFirst).detect_device(IPAD_UA);
        assert_eq!(device.device_type, DeviceType::Mobile);
        assert_eq!(device.os, "iOS");
    }

    #[test]
    fn test_ipad_is_tablet_under_tablet_first_policy() {
        let device = UaClassifier::new(DevicePolicy::TabletFirst).detect_device(IPAD_UA);
        assert_eq!(device.device_type, DeviceType::Tablet);
    }

    #[test]
    fn test_ipad_without_mobile_token_is_tablet() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 12_0) AppleWebKit/605.1.15";
        let device = UaClassifier::default().detect_device(ua);
        assert_eq!(device.device_type, DeviceType::Tablet);
    }

    #[test]
    fn test_android_and_desktop_families() {
        let classifier = UaClassifier::default();
        assert_eq!(classifier.detect_device(ANDROID_UA).os, "Android");
        assert_eq!(
            classifier.detect_device(WINDOWS_EDGE_UA),
            DeviceInfo::new(DeviceType::Desktop, "Windows", "Microsoft")
        );
        assert_eq!(
            classifier.detect_device("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)").os,
            "macOS"
        );
        assert_eq!(
            classifier.detect_device("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0").os,
            "Linux"
        );
        assert_eq!(classifier.detect_device("BlackBerry9700/5.0").os, "other");
    }

    #[test]
    fn test_windows_phone_is_mobile() {
        let device = UaClassifier::default().detect_device("Windows Phone 10.0");
        assert_eq!(device.device_type, DeviceType::Mobile);
    }

    #[test]
    fn test_unknown_device() {
        let classifier = UaClassifier::default();
        assert_eq!(classifier.detect_device("unknown"), DeviceInfo::unknown());
        assert_eq!(classifier.detect_device(""), DeviceInfo::unknown());
    }

    #[test]
    fn test_browser_priority() {
        let classifier = UaClassifier::default();
        assert_eq!(classifier.detect_browser(WINDOWS_EDGE_UA), Browser::Edge);
        assert_eq!(classifier.detect_browser(ANDROID_UA), Browser::Chrome);
        assert_eq!(classifier.detect_browser(IPHONE_UA), Browser::Safari);
        let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        assert_eq!(classifier.detect_browser(firefox), Browser::Firefox);
        assert_eq!(classifier.detect_browser("Opera/9.80 (Windows NT 6.1)"), Browser::Opera);
        assert_eq!(classifier.detect_browser("curl/8.4.0"), Browser::Other);
    }

    #[test]
    fn test_custom_rule_table_overrides_order() {
        let classifier = UaClassifier::with_rules(vec![LINUX_RULE, MOBILE_RULE]);
        let device = classifier.detect_device(ANDROID_UA);
        assert_eq!(device.os, "Linux");
    }
}
