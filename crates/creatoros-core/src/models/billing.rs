use serde::{Deserialize, Serialize};

/// Reply of `GET /usage/current`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    #[serde(default)]
    pub success: bool,
    /// Plan-dependent counters, passed through as returned
    #[serde(default)]
    pub usage: serde_json::Value,
}

/// Reply of `GET /usage/can-process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingAllowance {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "canProcess", default)]
    pub can_process: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end: Option<String>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active") || self.status.eq_ignore_ascii_case("trialing")
    }
}

/// Body of `POST /billing/create-checkout-session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_url: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    pub portal_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_can_process_denied() {
        let json = r#"{"success": false, "canProcess": false, "message": "Monthly limit reached"}"#;
        let allowance: ProcessingAllowance = serde_json::from_str(json).unwrap();
        assert!(!allowance.can_process);
        assert_eq!(allowance.message.as_deref(), Some("Monthly limit reached"));
        assert!(allowance.usage.is_none());
    }

    #[test]
    fn test_subscription_active() {
        let json = r#"{"id": "s1", "user_id": "u1", "status": "ACTIVE"}"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert!(sub.is_active());
    }
}
