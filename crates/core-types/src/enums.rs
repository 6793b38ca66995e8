use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfillment status of a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

/// The calendar granularity a report is bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Weekly,
    Monthly,
    Annually,
    #[default]
    Default,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Annually => "annually",
            Granularity::Default => "default",
        }
    }

    /// `Annually` is the only granularity whose buckets are whole months.
    pub fn is_monthly_buckets(&self) -> bool {
        matches!(self, Granularity::Annually)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "annually" => Ok(Granularity::Annually),
            "default" | "custom" => Ok(Granularity::Default),
            other => Err(CoreError::InvalidInput(
                "granularity".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Who a report is computed for. Decides which line items the data-access
/// layer hands to the analytics core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReportScope {
    /// Unscoped: every order in the range.
    Admin,
    /// Only line items for products owned by this seller.
    Seller(i64),
    /// Only line items for this product.
    Product(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_granularity_case_insensitively() {
        assert_eq!("Weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!(" annually ".parse::<Granularity>().unwrap(), Granularity::Annually);
        assert_eq!("custom".parse::<Granularity>().unwrap(), Granularity::Default);
        assert!("hourly".parse::<Granularity>().is_err());
    }

    #[test]
    fn approval_status_uses_lowercase_wire_names() {
        let status: ApprovalStatus = serde_json::from_str("\"approved\"").unwrap();
        assert!(status.is_approved());
        assert_eq!(serde_json::to_string(&ApprovalStatus::Rejected).unwrap(), "\"rejected\"");
    }
}
