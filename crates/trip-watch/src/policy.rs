//! Two-tier location sampling policy.
//!
//! Poor connectivity samples more often so that a usable last-known position
//! still gets through; a good connection samples less often to save battery.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStrength {
    Weak,
    Strong,
}

/// Connection details reported by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Effective connection type, e.g. `"4g"`, `"2g"`, `"slow-2g"`.
    pub effective_type: Option<String>,
    /// Estimated downlink bandwidth in Mbps.
    pub downlink_mbps: Option<f64>,
    #[serde(default)]
    pub cellular: bool,
    #[serde(default = "online_default")]
    pub online: bool,
}

fn online_default() -> bool {
    true
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self {
            effective_type: None,
            downlink_mbps: None,
            cellular: false,
            online: true,
        }
    }
}

impl NetworkInfo {
    pub fn strength(&self) -> SignalStrength {
        if !self.online {
            return SignalStrength::Weak;
        }
        if matches!(self.effective_type.as_deref(), Some("slow-2g" | "2g")) {
            return SignalStrength::Weak;
        }
        match self.downlink_mbps {
            Some(mbps) if mbps < 1.0 => SignalStrength::Weak,
            Some(mbps) if self.cellular && mbps < 2.0 => SignalStrength::Weak,
            _ => SignalStrength::Strong,
        }
    }
}

/// Sampling interval per signal tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPolicy {
    pub weak: Duration,
    pub strong: Duration,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self {
            weak: Duration::from_secs(60),
            strong: Duration::from_secs(300),
        }
    }
}

impl IntervalPolicy {
    pub fn interval_for(&self, strength: SignalStrength) -> Duration {
        match strength {
            SignalStrength::Weak => self.weak,
            SignalStrength::Strong => self.strong,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(effective_type: Option<&str>, downlink: Option<f64>, cellular: bool) -> NetworkInfo {
        NetworkInfo {
            effective_type: effective_type.map(str::to_string),
            downlink_mbps: downlink,
            cellular,
            online: true,
        }
    }

    #[test]
    fn test_offline_is_weak() {
        let mut n = info(Some("4g"), Some(50.0), false);
        n.online = false;
        assert_eq!(n.strength(), SignalStrength::Weak);
    }

    #[test]
    fn test_2g_is_weak() {
        assert_eq!(info(Some("2g"), None, false).strength(), SignalStrength::Weak);
        assert_eq!(info(Some("slow-2g"), Some(10.0), false).strength(), SignalStrength::Weak);
        assert_eq!(info(Some("3g"), None, false).strength(), SignalStrength::Strong);
    }

    #[test]
    fn test_downlink_thresholds() {
        assert_eq!(info(None, Some(0.5), false).strength(), SignalStrength::Weak);
        assert_eq!(info(None, Some(1.5), false).strength(), SignalStrength::Strong);
        assert_eq!(info(None, Some(1.5), true).strength(), SignalStrength::Weak);
        assert_eq!(info(None, Some(2.0), true).strength(), SignalStrength::Strong);
    }

    #[test]
    fn test_unknown_network_is_strong() {
        assert_eq!(NetworkInfo::default().strength(), SignalStrength::Strong);
    }

    #[test]
    fn test_deserialize_defaults_online() {
        let n: NetworkInfo = serde_json::from_str(r#"{"effectiveType":"4g"}"#).unwrap();
        assert!(n.online);
        assert!(!n.cellular);
    }

    #[test]
    fn test_interval_for() {
        let policy = IntervalPolicy::default();
        assert_eq!(policy.interval_for(SignalStrength::Weak), Duration::from_secs(60));
        assert_eq!(policy.interval_for(SignalStrength::Strong), Duration::from_secs(300));
    }
}
